//! Cross-database tree traversal benchmark.
//!
//! One logical tree, three physical encodings:
//!
//! - **MySQL**: a closure table holding the direct parent-child pairs,
//!   queried with one self-join per hop
//! - **Neo4j**: native `CHILD` relationships, queried with a fixed-length
//!   path pattern
//! - **ArangoDB**: a document collection plus an edge collection, queried
//!   with a bounded-depth OUTBOUND traversal
//!
//! Each backend implements [`StorageAdapter`]; the [`BenchmarkRunner`]
//! clears all three stores, inserts the same randomly generated tree into
//! each, and times the "all nodes exactly `depth` hops below the root"
//! query per backend.

pub mod backends;
pub mod config;
pub mod error;
pub mod runner;
pub mod tree;

pub use backends::{ArangoAdapter, MySqlAdapter, Neo4jAdapter, StorageAdapter};
pub use config::{ArangoConfig, MySqlConfig, Neo4jConfig};
pub use error::{BenchError, Result};
pub use runner::{BenchResult, BenchmarkRunner};
pub use tree::{generate_tree, TreeNode, MAX_BRANCHING};
