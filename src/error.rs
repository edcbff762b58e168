//! Error types for the DDL benchmark.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    /// Opening the admin session or a database-scoped client failed.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// One of the per-worker connections could not be acquired.
    #[error("failed to acquire connection {index} for database {database}: {source}")]
    Acquire {
        database: String,
        index: usize,
        #[source]
        source: sqlx::Error,
    },

    /// A single statement was rejected by the server.
    #[error("{source}")]
    Statement {
        sql: String,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
