//! In-memory tree generation for the benchmark workload.

use rand::Rng;
use uuid::Uuid;

/// Maximum children per non-leaf node.
pub const MAX_BRANCHING: usize = 7;

/// A node in the in-memory benchmark tree.
///
/// Children are owned exclusively by their parent; the root is owned by the
/// generation call site. Identifiers are opaque UUIDv4 strings with no
/// ordering relation to tree position.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf with a fresh identifier.
    pub fn leaf() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            children: Vec::new(),
        }
    }

    /// Create a node owning the given children.
    pub fn with_children(children: Vec<TreeNode>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            children,
        }
    }

    /// Maximum root-to-leaf hop count.
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Flatten into node ids and direct parent-child edges.
    ///
    /// Iterative explicit-stack traversal so deep or wide trees cannot blow
    /// the call stack. LIFO order: a parent is emitted before its children
    /// are expanded, and the most recently discovered child comes first.
    pub fn flatten(&self) -> (Vec<&str>, Vec<(&str, &str)>) {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut stack: Vec<(&TreeNode, Option<&str>)> = vec![(self, None)];

        while let Some((node, parent)) = stack.pop() {
            nodes.push(node.id.as_str());
            if let Some(parent) = parent {
                edges.push((parent, node.id.as_str()));
            }
            for child in &node.children {
                stack.push((child, Some(node.id.as_str())));
            }
        }

        (nodes, edges)
    }
}

/// Generate a random tree whose deepest leaf is exactly `depth` hops from
/// the root.
///
/// Depth 0 yields a single leaf; otherwise every node gets between 1 and
/// [`MAX_BRANCHING`] children, chosen uniformly, each generated at
/// `depth - 1`. Pure aside from the random source; seed the rng for a
/// reproducible shape (identifiers stay fresh either way).
pub fn generate_tree(depth: u32, rng: &mut impl Rng) -> TreeNode {
    if depth == 0 {
        return TreeNode::leaf();
    }

    let child_count = rng.gen_range(1..=MAX_BRANCHING);
    let children = (0..child_count)
        .map(|_| generate_tree(depth - 1, rng))
        .collect();
    TreeNode::with_children(children)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn assert_branching(node: &TreeNode) {
        if !node.children.is_empty() {
            assert!(
                (1..=MAX_BRANCHING).contains(&node.children.len()),
                "non-leaf node has {} children",
                node.children.len()
            );
        }
        for child in &node.children {
            assert_branching(child);
        }
    }

    /// Per-node child counts in pre-order, enough to compare shapes.
    fn shape(node: &TreeNode) -> Vec<usize> {
        let mut out = vec![node.children.len()];
        for child in &node.children {
            out.extend(shape(child));
        }
        out
    }

    #[test]
    fn test_generated_depth_is_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        for depth in 0..=4 {
            let tree = generate_tree(depth, &mut rng);
            assert_eq!(tree.depth(), depth);
        }
    }

    #[test]
    fn test_branching_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let tree = generate_tree(3, &mut rng);
        assert_branching(&tree);
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut rng = StdRng::seed_from_u64(13);
        let tree = generate_tree(3, &mut rng);
        let (nodes, _) = tree.flatten();
        let unique: HashSet<&str> = nodes.iter().copied().collect();
        assert_eq!(unique.len(), nodes.len());
    }

    #[test]
    fn test_seeded_shape_is_reproducible() {
        let a = generate_tree(3, &mut StdRng::seed_from_u64(42));
        let b = generate_tree(3, &mut StdRng::seed_from_u64(42));
        assert_eq!(shape(&a), shape(&b));
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let tree = generate_tree(0, &mut StdRng::seed_from_u64(1));
        assert!(tree.children.is_empty());
        let (nodes, edges) = tree.flatten();
        assert_eq!(nodes.len(), 1);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_fixed_branching_two_three() {
        // Depth 2, branching [2, 3]: the root has two children, the first
        // of which has three leaves.
        let tree = TreeNode::with_children(vec![
            TreeNode::with_children(vec![TreeNode::leaf(), TreeNode::leaf(), TreeNode::leaf()]),
            TreeNode::leaf(),
        ]);

        assert_eq!(tree.depth(), 2);
        let (nodes, edges) = tree.flatten();
        assert_eq!(nodes.len(), 6);
        assert_eq!(edges.len(), 5);

        // Every edge endpoint is a known node and the root is nobody's child.
        let ids: HashSet<&str> = nodes.iter().copied().collect();
        for (parent, child) in &edges {
            assert!(ids.contains(parent));
            assert!(ids.contains(child));
            assert_ne!(*child, tree.id.as_str());
        }
    }

    #[test]
    fn test_flatten_parent_before_expansion() {
        let tree = TreeNode::with_children(vec![TreeNode::leaf(), TreeNode::leaf()]);
        let (nodes, _) = tree.flatten();
        assert_eq!(nodes[0], tree.id.as_str());
    }
}
