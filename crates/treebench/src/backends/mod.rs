//! Storage adapters for the backends under comparison.
//!
//! Each adapter maps the same logical tree onto a different physical
//! encoding and answers the same depth-bounded descendant query, so the
//! timings are comparable across paradigms.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::tree::TreeNode;

pub mod arango;
pub mod mysql;
pub mod neo4j;

pub use arango::ArangoAdapter;
pub use mysql::MySqlAdapter;
pub use neo4j::Neo4jAdapter;

/// Common contract implemented by every backend.
///
/// The runner drives these four operations strictly sequentially; no
/// adapter operation ever overlaps another.
#[async_trait]
pub trait StorageAdapter: Send {
    /// Short backend name used in progress logs and the report.
    fn name(&self) -> &'static str;

    /// Connect and ensure the required schema objects exist. Idempotent;
    /// safe to call when the schema is already in place.
    async fn init(&mut self) -> Result<()>;

    /// Persist every node and every direct parent-child edge of `tree`
    /// using the backend's bulk or transactional mechanism.
    async fn insert_data(&mut self, tree: &TreeNode) -> Result<()>;

    /// Remove all previously inserted nodes and edges, leaving schema
    /// objects intact. Idempotent.
    async fn delete_all(&mut self) -> Result<()>;

    /// Run the canonical benchmark query: all nodes exactly `depth` hops
    /// below `root_id`. Returns the wall-clock time from immediately before
    /// the root lookup to full materialization of the result set;
    /// connection setup is excluded. A missing root (e.g. an empty backend)
    /// is a query error, not a duration.
    async fn execute(&mut self, root_id: &str, depth: u32) -> Result<Duration>;
}
