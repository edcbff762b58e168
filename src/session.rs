//! Backend traits the provisioner, driver and workers are written against.
//!
//! The MySQL-wire implementation lives in [`crate::mysql`]; tests plug in an
//! in-memory server instead.

use async_trait::async_trait;

use crate::error::Result;

/// A single dedicated connection that can run DDL over the text protocol.
#[async_trait]
pub trait DdlSession: Send + 'static {
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Closes the underlying connection. Close errors are logged, not returned.
    async fn close(self)
    where
        Self: Sized;
}

/// A client scoped to one database, handing out dedicated connections.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    type Session: DdlSession;

    async fn acquire(&self) -> Result<Self::Session, sqlx::Error>;

    async fn close(self)
    where
        Self: Sized;
}

/// Entry point to the server under test.
#[async_trait]
pub trait Cluster: Send + Sync {
    type Session: DdlSession;
    type Client: DatabaseClient<Session = Self::Session>;

    /// Server-level session used for provisioning and cleanup.
    async fn admin_session(&self) -> Result<Self::Session, sqlx::Error>;

    /// Client for `database` able to hold `pool_size` connections at once.
    async fn open_database(
        &self,
        database: &str,
        pool_size: usize,
    ) -> Result<Self::Client, sqlx::Error>;

    /// Human-readable address used in log lines and errors.
    fn endpoint(&self) -> String;
}
