//! Benchmark error types.

use thiserror::Error;

/// Errors surfaced by the storage adapters and the runner.
///
/// There is no local recovery anywhere: every error propagates out of the
/// adapter call and terminates the run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Backend unreachable or credentials rejected during init.
    #[error("connection error: {0}")]
    Connection(String),

    /// Table or collection creation failed.
    #[error("schema error: {0}")]
    Schema(String),

    /// Insert or delete rejected by the backend, including a failed
    /// transaction rollback.
    #[error("write error: {0}")]
    Write(String),

    /// Benchmark query failed, or there was no root node to start from.
    #[error("query error: {0}")]
    Query(String),
}

impl BenchError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    pub fn schema(err: impl std::fmt::Display) -> Self {
        Self::Schema(err.to_string())
    }

    pub fn write(err: impl std::fmt::Display) -> Self {
        Self::Write(err.to_string())
    }

    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::Query(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BenchError>;
