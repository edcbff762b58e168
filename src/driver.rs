//! Workload driver: per database, fan out one worker per connection and join.

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::session::{Cluster, DatabaseClient, DdlSession};
use crate::worker::{create_tables, WorkerReport};

#[derive(Clone, Debug)]
pub struct DatabaseReport {
    pub database: String,
    pub workers: Vec<WorkerReport>,
    pub elapsed: Duration,
}

impl DatabaseReport {
    pub fn created(&self) -> usize {
        self.workers.iter().map(|w| w.created).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }

    /// Tables created per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.created() as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub databases: Vec<DatabaseReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.databases.iter().map(DatabaseReport::created).sum()
    }

    pub fn failed(&self) -> usize {
        self.databases.iter().map(DatabaseReport::failed).sum()
    }
}

/// Runs the timed part of the benchmark.
///
/// Databases are processed one at a time. Inside a database every worker gets
/// its own connection, acquired up front; the phase ends once all worker
/// tasks have been joined. A connect or acquire failure aborts the whole run.
pub async fn run_workload<C: Cluster>(cluster: &C, config: &BenchConfig) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::default();

    for i in 0..config.databases {
        let db_report = run_database(cluster, config, i).await?;
        report.databases.push(db_report);
    }

    report.elapsed = start.elapsed();
    info!("Total execution time: {:.2?}", report.elapsed);
    Ok(report)
}

async fn run_database<C: Cluster>(
    cluster: &C,
    config: &BenchConfig,
    index: usize,
) -> Result<DatabaseReport> {
    let database = config.schema.database_name(index);
    let start = Instant::now();

    let client = cluster
        .open_database(&database, config.threads)
        .await
        .map_err(|source| BenchError::Connect {
            target: format!("{}/{}", cluster.endpoint(), database),
            source,
        })?;

    let sessions = match acquire_all(&client, &database, config.threads).await {
        Ok(sessions) => sessions,
        Err(e) => {
            client.close().await;
            return Err(e);
        }
    };

    let mut handles = Vec::with_capacity(sessions.len());
    for (worker, session) in sessions.into_iter().enumerate() {
        let template = config.schema.table_template.clone();
        let tables = config.tables;
        let handle = tokio::spawn(async move {
            create_tables(session, worker, tables, &template).await
        });
        handles.push(handle);
    }

    // Join barrier: every handle is awaited exactly once, in any completion order.
    let mut workers = Vec::with_capacity(handles.len());
    let mut finished = Vec::with_capacity(handles.len());
    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok((session, worker_report)) => {
                finished.push(session);
                workers.push(worker_report);
            }
            Err(e) => {
                error!("worker {} in database {} aborted: {}", worker, database, e);
                // Nothing it issued can be trusted, so all of its tables count as failed.
                workers.push(WorkerReport {
                    worker,
                    created: 0,
                    failed: config.tables,
                });
            }
        }
    }
    let elapsed = start.elapsed();

    let db_report = DatabaseReport {
        database,
        workers,
        elapsed,
    };
    info!(
        "Created {} tables in database {}, time {:.2?} ({} failed)",
        config.tables_per_database(),
        db_report.database,
        elapsed,
        db_report.failed()
    );

    for session in finished {
        session.close().await;
    }
    client.close().await;

    Ok(db_report)
}

/// Opens `count` connections before any work starts. On failure the ones
/// already open are closed; the caller still owns the client.
async fn acquire_all<D: DatabaseClient>(
    client: &D,
    database: &str,
    count: usize,
) -> Result<Vec<D::Session>> {
    let mut sessions = Vec::with_capacity(count);
    for index in 0..count {
        match client.acquire().await {
            Ok(session) => sessions.push(session),
            Err(source) => {
                for session in sessions {
                    session.close().await;
                }
                return Err(BenchError::Acquire {
                    database: database.to_string(),
                    index,
                    source,
                });
            }
        }
    }
    Ok(sessions)
}
