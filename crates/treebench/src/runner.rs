//! Benchmark orchestration.

use std::time::Duration;

use rand::Rng;

use crate::backends::StorageAdapter;
use crate::error::Result;
use crate::tree::generate_tree;

/// Timing for one backend.
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub backend: &'static str,
    pub elapsed: Duration,
}

/// Drives the delete / generate / insert / query phases strictly
/// sequentially over a fixed adapter order.
///
/// One backend fully completes a phase before the next begins, so there is
/// never cross-backend contention. The first error aborts the run; later
/// phases do not execute.
pub struct BenchmarkRunner {
    adapters: Vec<Box<dyn StorageAdapter>>,
    depth: u32,
}

impl BenchmarkRunner {
    /// Adapters are reported in the order given here.
    pub fn new(adapters: Vec<Box<dyn StorageAdapter>>, depth: u32) -> Self {
        Self { adapters, depth }
    }

    /// Execute one full benchmark run against already-initialized adapters:
    /// clear all backends, generate one shared tree, insert it everywhere,
    /// then time the depth query on each backend.
    pub async fn run(&mut self, rng: &mut (impl Rng + Send)) -> Result<Vec<BenchResult>> {
        // Previous run's data goes first; a run starts from empty stores.
        for adapter in &mut self.adapters {
            tracing::info!(backend = adapter.name(), "clearing previous data");
            adapter.delete_all().await?;
        }

        let tree = generate_tree(self.depth, rng);
        let (node_count, edge_count) = {
            let (nodes, edges) = tree.flatten();
            (nodes.len(), edges.len())
        };
        tracing::info!(
            depth = self.depth,
            nodes = node_count,
            edges = edge_count,
            "tree generated"
        );
        let root_id = tree.id.clone();

        for adapter in &mut self.adapters {
            tracing::info!(backend = adapter.name(), "inserting tree");
            adapter.insert_data(&tree).await?;
        }

        let mut results = Vec::with_capacity(self.adapters.len());
        for adapter in &mut self.adapters {
            tracing::info!(backend = adapter.name(), "running depth query");
            let elapsed = adapter.execute(&root_id, self.depth).await?;
            tracing::info!(
                backend = adapter.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "depth query timed"
            );
            results.push(BenchResult {
                backend: adapter.name(),
                elapsed,
            });
        }

        Ok(results)
    }
}
