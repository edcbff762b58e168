//! Database setup and teardown around a benchmark run.
//!
//! Both operations are best effort per database: a failed DROP or CREATE is
//! logged and the loop moves on. Only failing to reach the server at all is
//! returned to the caller.

use tracing::{info, warn};

use crate::error::{BenchError, Result};
use crate::schema::{SchemaConfig, ENABLE_FAST_CREATE_SQL};
use crate::session::{Cluster, DdlSession};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Drops and recreates `{prefix}_0 .. {prefix}_{count-1}`.
pub async fn prepare<C: Cluster>(
    cluster: &C,
    schema: &SchemaConfig,
    database_count: usize,
    fast_create: bool,
) -> Result<ProvisionReport> {
    let mut session = admin_session(cluster).await?;
    let mut report = ProvisionReport::default();

    for i in 0..database_count {
        let name = schema.database_name(i);

        match session.execute(&schema.drop_database_sql(i)).await {
            Ok(()) => info!("Dropped database {}", name),
            Err(e) => warn!("Failed to drop database {}: {}", name, e),
        }

        match session.execute(&schema.create_database_sql(i)).await {
            Ok(()) => {
                info!("Created database {}", name);
                report.succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to create database {}: {}", name, e);
                report.failed += 1;
            }
        }

        // A global switch, so repeating it per database is harmless.
        if fast_create {
            if let Err(e) = session.execute(ENABLE_FAST_CREATE_SQL).await {
                warn!("Failed to set fast create table: {}", e);
            }
        }
    }

    session.close().await;
    Ok(report)
}

/// Drops every benchmark database. Not part of a normal run.
pub async fn cleanup<C: Cluster>(
    cluster: &C,
    schema: &SchemaConfig,
    database_count: usize,
) -> Result<ProvisionReport> {
    let mut session = admin_session(cluster).await?;
    let mut report = ProvisionReport::default();

    for i in 0..database_count {
        let name = schema.database_name(i);
        match session.execute(&schema.drop_database_sql(i)).await {
            Ok(()) => {
                info!("Dropped database {}", name);
                report.succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to drop database {}: {}", name, e);
                report.failed += 1;
            }
        }
    }

    session.close().await;
    Ok(report)
}

async fn admin_session<C: Cluster>(cluster: &C) -> Result<C::Session> {
    cluster
        .admin_session()
        .await
        .map_err(|source| BenchError::Connect {
            target: cluster.endpoint(),
            source,
        })
}
