//! In-memory stand-in for a MySQL-wire server, used by unit tests.
//!
//! Understands just enough SQL to track databases and the tables inside them,
//! and can be told to fail connections or statements.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{BenchError, Result};
use crate::schema::ENABLE_FAST_CREATE_SQL;
use crate::session::{Cluster, DatabaseClient, DdlSession};

#[derive(Default)]
struct ServerState {
    databases: BTreeMap<String, Vec<String>>,
    statements: Vec<String>,
    fast_create: bool,
    fail_patterns: Vec<String>,
    panic_patterns: Vec<String>,
    fail_admin: bool,
    fail_open: Vec<String>,
    fail_acquire: Option<(String, usize)>,
    sessions_opened: usize,
    sessions_closed: usize,
    clients_opened: usize,
    clients_closed: usize,
    opened_databases: Vec<String>,
}

fn injected(what: &str) -> sqlx::Error {
    sqlx::Error::Protocol(format!("injected failure: {}", what))
}

#[derive(Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().expect("fake server state poisoned")
    }

    pub fn add_database(&self, name: &str) {
        self.lock().databases.entry(name.to_string()).or_default();
    }

    pub fn add_table(&self, database: &str, table: &str) {
        self.lock()
            .databases
            .entry(database.to_string())
            .or_default()
            .push(table.to_string());
    }

    pub fn fail_statements_containing(&self, pattern: &str) {
        self.lock().fail_patterns.push(pattern.to_string());
    }

    /// Makes the session executing a matching statement panic, taking its
    /// worker task down with it.
    pub fn panic_statements_containing(&self, pattern: &str) {
        self.lock().panic_patterns.push(pattern.to_string());
    }

    pub fn fail_admin_connect(&self) {
        self.lock().fail_admin = true;
    }

    pub fn fail_open_database(&self, database: &str) {
        self.lock().fail_open.push(database.to_string());
    }

    /// Fails the `index`-th acquire (0-based) on the client for `database`.
    pub fn fail_acquire(&self, database: &str, index: usize) {
        self.lock().fail_acquire = Some((database.to_string(), index));
    }

    /// Session bound to `database` without going through a client.
    pub fn session_for(&self, database: &str) -> FakeSession {
        self.lock().sessions_opened += 1;
        FakeSession {
            database: Some(database.to_string()),
            state: self.state.clone(),
        }
    }

    pub fn database_names(&self) -> Vec<String> {
        self.lock().databases.keys().cloned().collect()
    }

    pub fn tables(&self, database: &str) -> Vec<String> {
        self.lock()
            .databases
            .get(database)
            .cloned()
            .unwrap_or_default()
    }

    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    pub fn statement_count(&self) -> usize {
        self.lock().statements.len()
    }

    pub fn fast_create_enabled(&self) -> bool {
        self.lock().fast_create
    }

    pub fn opened_databases(&self) -> Vec<String> {
        self.lock().opened_databases.clone()
    }

    /// (opened, closed) counts for sessions and for clients.
    pub fn session_counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.sessions_opened, state.sessions_closed)
    }

    pub fn client_counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.clients_opened, state.clients_closed)
    }
}

#[async_trait]
impl Cluster for FakeServer {
    type Session = FakeSession;
    type Client = FakeClient;

    async fn admin_session(&self) -> Result<FakeSession, sqlx::Error> {
        let mut state = self.lock();
        if state.fail_admin {
            return Err(injected("admin connect"));
        }
        state.sessions_opened += 1;
        Ok(FakeSession {
            database: None,
            state: self.state.clone(),
        })
    }

    async fn open_database(
        &self,
        database: &str,
        _pool_size: usize,
    ) -> Result<FakeClient, sqlx::Error> {
        let mut state = self.lock();
        state.opened_databases.push(database.to_string());
        if state.fail_open.iter().any(|db| db == database) {
            return Err(injected("open database"));
        }
        if !state.databases.contains_key(database) {
            return Err(sqlx::Error::Protocol(format!("Unknown database '{}'", database)));
        }
        state.clients_opened += 1;
        Ok(FakeClient {
            database: database.to_string(),
            acquired: Mutex::new(0),
            state: self.state.clone(),
        })
    }

    fn endpoint(&self) -> String {
        "fake:4000".to_string()
    }
}

pub struct FakeClient {
    database: String,
    acquired: Mutex<usize>,
    state: Arc<Mutex<ServerState>>,
}

#[async_trait]
impl DatabaseClient for FakeClient {
    type Session = FakeSession;

    async fn acquire(&self) -> Result<FakeSession, sqlx::Error> {
        let index = {
            let mut acquired = self.acquired.lock().expect("acquire counter poisoned");
            let index = *acquired;
            *acquired += 1;
            index
        };
        let mut state = self.state.lock().expect("fake server state poisoned");
        if state.fail_acquire.as_ref() == Some(&(self.database.clone(), index)) {
            return Err(injected("acquire"));
        }
        state.sessions_opened += 1;
        Ok(FakeSession {
            database: Some(self.database.clone()),
            state: self.state.clone(),
        })
    }

    async fn close(self) {
        self.state.lock().expect("fake server state poisoned").clients_closed += 1;
    }
}

pub struct FakeSession {
    database: Option<String>,
    state: Arc<Mutex<ServerState>>,
}

impl FakeSession {
    fn apply(&self, state: &mut ServerState, sql: &str) -> std::result::Result<(), String> {
        if let Some(name) = sql.strip_prefix("DROP DATABASE IF EXISTS ") {
            state.databases.remove(name.trim());
            return Ok(());
        }
        if let Some(name) = sql.strip_prefix("CREATE DATABASE ") {
            let name = name.trim();
            if state.databases.contains_key(name) {
                return Err(format!("database {} exists", name));
            }
            state.databases.insert(name.to_string(), Vec::new());
            return Ok(());
        }
        if sql == ENABLE_FAST_CREATE_SQL {
            state.fast_create = true;
            return Ok(());
        }
        if sql.starts_with("CREATE TABLE `") {
            let name = sql.split('`').nth(1).unwrap_or_default().to_string();
            let database = self.database.as_ref().ok_or("No database selected")?;
            let tables = state
                .databases
                .get_mut(database)
                .ok_or_else(|| format!("Unknown database '{}'", database))?;
            if tables.contains(&name) {
                return Err(format!("Table '{}' already exists", name));
            }
            tables.push(name);
            return Ok(());
        }
        Err(format!("unsupported statement: {}", sql))
    }
}

#[async_trait]
impl DdlSession for FakeSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        // Let other workers interleave like they would against a real server.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().expect("fake server state poisoned");
        state.statements.push(sql.to_string());

        if state.panic_patterns.iter().any(|p| sql.contains(p.as_str())) {
            // release the lock first so the panic does not poison it
            drop(state);
            panic!("session crashed on: {}", sql);
        }

        let outcome = if state.fail_patterns.iter().any(|p| sql.contains(p.as_str())) {
            Err("injected failure".to_string())
        } else {
            self.apply(&mut state, sql)
        };

        outcome.map_err(|msg| BenchError::Statement {
            sql: sql.to_string(),
            source: sqlx::Error::Protocol(msg),
        })
    }

    async fn close(self) {
        self.state.lock().expect("fake server state poisoned").sessions_closed += 1;
    }
}
