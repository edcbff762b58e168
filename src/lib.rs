//! Concurrent CREATE TABLE benchmark for TiDB and other MySQL-wire servers.
//!
//! A run provisions `D` empty databases, then for each one opens `T`
//! connections and has `T` workers create `C` tables apiece, timing every
//! database and the whole run.

pub mod config;
pub mod driver;
pub mod error;
pub mod mysql;
pub mod provision;
pub mod schema;
pub mod session;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::BenchConfig;
pub use driver::{run_workload, DatabaseReport, RunReport};
pub use error::{BenchError, Result};
pub use mysql::MySqlCluster;
pub use provision::{cleanup, prepare, ProvisionReport};
