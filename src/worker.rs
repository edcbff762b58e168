//! Table creator worker: one connection, one private run of CREATE TABLEs.

use tracing::{debug, warn};

use crate::schema::{table_name, TableTemplate};
use crate::session::DdlSession;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub created: usize,
    pub failed: usize,
}

/// Creates `table_count` tables named `tb_{worker}_{seq}` one after another.
///
/// A failed statement is logged and skipped, never retried. The session is
/// handed back so the driver can close it after the join.
pub async fn create_tables<S: DdlSession>(
    mut session: S,
    worker: usize,
    table_count: usize,
    template: &TableTemplate,
) -> (S, WorkerReport) {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };

    for seq in 0..table_count {
        let name = table_name(worker, seq);
        let sql = template.render(&name);
        match session.execute(&sql).await {
            Ok(()) => report.created += 1,
            Err(e) => {
                warn!("Error creating table {}: {}", name, e);
                report.failed += 1;
            }
        }
    }

    debug!(worker, created = report.created, failed = report.failed, "worker done");
    (session, report)
}
