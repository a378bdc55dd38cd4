//! Graph adapter: Neo4j over Bolt with native `CHILD` relationships.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use neo4rs::{query, ConfigBuilder, Graph, Txn};

use crate::config::Neo4jConfig;
use crate::error::{BenchError, Result};
use crate::tree::TreeNode;

use super::StorageAdapter;

/// Neo4j adapter. Schema-free: nodes and relationships are created on
/// demand during insertion.
pub struct Neo4jAdapter {
    config: Neo4jConfig,
    graph: Option<Graph>,
}

impl Neo4jAdapter {
    pub fn new(config: Neo4jConfig) -> Self {
        Self {
            config,
            graph: None,
        }
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph
            .as_ref()
            .ok_or_else(|| BenchError::Connection("neo4j adapter not initialized".into()))
    }

    /// Recursive descent over the tree, one CREATE per node inside the
    /// caller's transaction. Children attach to their already-created
    /// parent via MATCH so no node is ever duplicated.
    fn insert_node<'a>(
        node: &'a TreeNode,
        parent_id: Option<&'a str>,
        txn: &'a mut Txn,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let q = match parent_id {
                Some(parent) => {
                    query("MATCH (p:Node {id: $parent}) CREATE (p)-[:CHILD]->(n:Node {id: $id})")
                        .param("parent", parent)
                        .param("id", node.id.as_str())
                }
                None => query("CREATE (n:Node {id: $id})").param("id", node.id.as_str()),
            };
            txn.run(q).await.map_err(BenchError::write)?;

            for child in &node.children {
                Self::insert_node(child, Some(&node.id), txn).await?;
            }
            Ok(())
        }
        .boxed()
    }

    /// Fetch all descendants exactly `depth` hops below `root_id`.
    pub async fn fetch_descendants(&self, root_id: &str, depth: u32) -> Result<Vec<String>> {
        let graph = self.graph()?;
        let q = query(&descendant_query(depth)).param("root", root_id);

        let mut stream = graph.execute(q).await.map_err(BenchError::query)?;
        let mut ids = Vec::new();
        while let Some(row) = stream.next().await.map_err(BenchError::query)? {
            ids.push(row.get::<String>("id").map_err(BenchError::query)?);
        }
        Ok(ids)
    }

    /// Read back every stored node id. Test support.
    pub async fn fetch_nodes(&self) -> Result<Vec<String>> {
        let graph = self.graph()?;
        let mut stream = graph
            .execute(query("MATCH (n:Node) RETURN n.id AS id"))
            .await
            .map_err(BenchError::query)?;
        let mut ids = Vec::new();
        while let Some(row) = stream.next().await.map_err(BenchError::query)? {
            ids.push(row.get::<String>("id").map_err(BenchError::query)?);
        }
        Ok(ids)
    }

    /// Read back every stored (parent, child) pair. Test support.
    pub async fn fetch_edges(&self) -> Result<Vec<(String, String)>> {
        let graph = self.graph()?;
        let mut stream = graph
            .execute(query(
                "MATCH (p:Node)-[:CHILD]->(c:Node) RETURN p.id AS parent, c.id AS child",
            ))
            .await
            .map_err(BenchError::query)?;
        let mut edges = Vec::new();
        while let Some(row) = stream.next().await.map_err(BenchError::query)? {
            let parent = row.get::<String>("parent").map_err(BenchError::query)?;
            let child = row.get::<String>("child").map_err(BenchError::query)?;
            edges.push((parent, child));
        }
        Ok(edges)
    }
}

#[async_trait]
impl StorageAdapter for Neo4jAdapter {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn init(&mut self) -> Result<()> {
        if self.graph.is_none() {
            let config = ConfigBuilder::default()
                .uri(&self.config.uri)
                .user(&self.config.user)
                .password(&self.config.password)
                .build()
                .map_err(BenchError::connection)?;
            let graph = Graph::connect(config)
                .await
                .map_err(BenchError::connection)?;
            self.graph = Some(graph);
        }
        Ok(())
    }

    async fn insert_data(&mut self, tree: &TreeNode) -> Result<()> {
        let graph = self.graph()?;
        let mut txn = graph.start_txn().await.map_err(BenchError::write)?;

        match Self::insert_node(tree, None, &mut txn).await {
            Ok(()) => txn.commit().await.map_err(BenchError::write),
            Err(err) => {
                // A failed rollback surfaces instead of the insert error.
                txn.rollback().await.map_err(BenchError::write)?;
                Err(err)
            }
        }
    }

    async fn delete_all(&mut self) -> Result<()> {
        let graph = self.graph()?;
        graph
            .run(query("MATCH (n) DETACH DELETE n"))
            .await
            .map_err(BenchError::write)
    }

    async fn execute(&mut self, root_id: &str, depth: u32) -> Result<Duration> {
        let start = Instant::now();

        let graph = self.graph()?;
        let mut root = graph
            .execute(query("MATCH (n:Node {id: $root}) RETURN n.id AS id").param("root", root_id))
            .await
            .map_err(BenchError::query)?;
        if root.next().await.map_err(BenchError::query)?.is_none() {
            return Err(BenchError::Query(format!("root node {root_id} not found")));
        }

        let ids = self.fetch_descendants(root_id, depth).await?;

        let elapsed = start.elapsed();
        tracing::debug!(backend = "neo4j", rows = ids.len(), "depth query returned");
        Ok(elapsed)
    }
}

/// Fixed-length path pattern for the depth query. Cypher cannot bind a
/// path length, so the depth is formatted into the pattern; the root id
/// stays a parameter. Depth 0 degenerates to matching the root itself.
fn descendant_query(depth: u32) -> String {
    if depth == 0 {
        return "MATCH (n:Node {id: $root}) RETURN n.id AS id".to_string();
    }
    format!("MATCH (root:Node {{id: $root}})-[:CHILD*{depth}]->(leaf:Node) RETURN leaf.id AS id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hop_query_matches_root() {
        assert_eq!(
            descendant_query(0),
            "MATCH (n:Node {id: $root}) RETURN n.id AS id"
        );
    }

    #[test]
    fn test_descendant_pattern() {
        assert_eq!(
            descendant_query(2),
            "MATCH (root:Node {id: $root})-[:CHILD*2]->(leaf:Node) RETURN leaf.id AS id"
        );
    }

    #[test]
    fn test_depth_is_formatted_not_bound() {
        let q = descendant_query(4);
        assert!(q.contains("[:CHILD*4]"));
        assert!(q.contains("$root"));
    }
}
