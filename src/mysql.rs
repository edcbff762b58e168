//! sqlx-backed implementation of the backend traits for TiDB / MySQL.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::{debug, warn};

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::session::{Cluster, DatabaseClient, DdlSession};

#[derive(Clone, Debug)]
pub struct MySqlCluster {
    host: String,
    port: u16,
    username: String,
    admin_username: String,
}

impl MySqlCluster {
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            admin_username: config.admin_username.clone(),
        }
    }

    fn connect_options(&self, username: &str, database: Option<&str>) -> MySqlConnectOptions {
        let opts = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(username)
            .charset("utf8mb4")
            // one log line per CREATE TABLE would drown the report
            .disable_statement_logging();

        match database {
            Some(db) => opts.database(db),
            None => opts,
        }
    }
}

#[async_trait]
impl Cluster for MySqlCluster {
    type Session = MySqlSession;
    type Client = MySqlClient;

    async fn admin_session(&self) -> Result<MySqlSession, sqlx::Error> {
        let opts = self.connect_options(&self.admin_username, None);
        let conn = MySqlConnection::connect_with(&opts).await?;
        Ok(MySqlSession { conn })
    }

    async fn open_database(
        &self,
        database: &str,
        pool_size: usize,
    ) -> Result<MySqlClient, sqlx::Error> {
        let opts = self.connect_options(&self.username, Some(database));
        let pool = MySqlPoolOptions::new()
            .max_connections(pool_size.max(1) as u32)
            .connect_with(opts)
            .await?;
        debug!(database, pool_size, "opened database client");
        Ok(MySqlClient {
            database: database.to_string(),
            pool,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub struct MySqlClient {
    database: String,
    pool: MySqlPool,
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    type Session = MySqlSession;

    async fn acquire(&self) -> Result<MySqlSession, sqlx::Error> {
        // Detached so the worker owns the connection outright and the pool can
        // open the next one.
        let conn = self.pool.acquire().await?.detach();
        Ok(MySqlSession { conn })
    }

    async fn close(self) {
        self.pool.close().await;
        debug!(database = %self.database, "closed database client");
    }
}

pub struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl DdlSession for MySqlSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        // &str goes over the text protocol; DDL does not need a prepare round trip.
        self.conn
            .execute(sql)
            .await
            .map(|_| ())
            .map_err(|source| BenchError::Statement {
                sql: sql.to_string(),
                source,
            })
    }

    async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!("failed to close connection: {}", e);
        }
    }
}
