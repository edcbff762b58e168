use std::path::PathBuf;

use anyhow::{ensure, Context};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ddl_bench::config::{
    BenchConfig, DEFAULT_DATABASES, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TABLES, DEFAULT_THREADS,
    DEFAULT_USER,
};
use ddl_bench::schema::{SchemaConfig, TableTemplate, DEFAULT_DATABASE_PREFIX, TABLE_PLACEHOLDER};
use ddl_bench::{cleanup, prepare, run_workload, MySqlCluster, RunReport};

#[derive(Parser, Debug)]
#[command(author, version, about = "TiDB DDL benchmark: concurrent CREATE TABLE across databases")]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Workers (and connections) per database
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    thread: usize,

    /// Number of databases to create tables in
    #[arg(long, default_value_t = DEFAULT_DATABASES)]
    database: usize,

    /// Tables created by each worker
    #[arg(long, default_value_t = DEFAULT_TABLES)]
    table: usize,

    /// User for the benchmark connections
    #[arg(long, default_value = DEFAULT_USER)]
    username: String,

    /// User for dropping/creating databases and SET GLOBAL
    #[arg(long, default_value = DEFAULT_USER)]
    admin_username: String,

    /// Databases are named <prefix>_<index>
    #[arg(long, default_value = DEFAULT_DATABASE_PREFIX)]
    database_prefix: String,

    /// File with a CREATE TABLE statement; `{table}` is replaced by the table name
    #[arg(long)]
    table_ddl: Option<PathBuf>,

    /// Do not turn on tidb_enable_fast_create_table
    #[arg(long, default_value_t = false)]
    no_fast_create: bool,

    /// Reuse the existing databases instead of dropping and recreating them
    #[arg(long, default_value_t = false)]
    skip_prepare: bool,

    /// Drop the benchmark databases and exit
    #[arg(long, default_value_t = false)]
    cleanup: bool,
}

impl Args {
    fn to_config(&self) -> anyhow::Result<BenchConfig> {
        let table_template = match &self.table_ddl {
            Some(path) => {
                let ddl = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read DDL template {}", path.display()))?;
                ensure!(
                    ddl.contains(TABLE_PLACEHOLDER),
                    "DDL template {} has no {} placeholder",
                    path.display(),
                    TABLE_PLACEHOLDER
                );
                TableTemplate::new(ddl.trim().to_string())
            }
            None => TableTemplate::default(),
        };

        Ok(BenchConfig {
            host: self.host.clone(),
            port: self.port,
            threads: self.thread,
            databases: self.database,
            tables: self.table,
            username: self.username.clone(),
            admin_username: self.admin_username.clone(),
            fast_create: !self.no_fast_create,
            schema: SchemaConfig {
                database_prefix: self.database_prefix.clone(),
                table_template,
            },
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.to_config()?;

    println!("--- TiDB DDL benchmark ---");
    println!("started  : {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("host     : {}", config.host);
    println!("port     : {}", config.port);
    println!("thread   : {}", config.threads);
    println!("database : {}", config.databases);
    println!("table    : {}", config.tables);
    println!("username : {}", config.username);

    let cluster = MySqlCluster::new(&config);

    if args.cleanup {
        match cleanup(&cluster, &config.schema, config.databases).await {
            Ok(report) => info!("Dropped {} of {} databases", report.succeeded, config.databases),
            Err(e) => error!("{}", e),
        }
        return Ok(());
    }

    // An unreachable admin endpoint is reported but does not stop the run;
    // the workload phase decides on its own whether it can connect.
    if !args.skip_prepare {
        let prepared =
            prepare(&cluster, &config.schema, config.databases, config.fast_create).await;
        if let Err(e) = prepared {
            error!("{}", e);
        }
    }

    match run_workload(&cluster, &config).await {
        Ok(report) => print_summary(&config, &report),
        Err(e) => error!("{}", e),
    }

    Ok(())
}

fn print_summary(config: &BenchConfig, report: &RunReport) {
    println!();
    println!("=== Summary ===");
    for db in &report.databases {
        println!(
            "{:<12} tables={} failed={} elapsed={:.2?} tables/s={:.2}",
            db.database,
            db.created(),
            db.failed(),
            db.elapsed,
            db.throughput()
        );
    }
    let secs = report.elapsed.as_secs_f64();
    let overall = if secs > 0.0 {
        report.created() as f64 / secs
    } else {
        0.0
    };
    println!("Databases      : {}", report.databases.len());
    let attempted = config
        .tables_per_database()
        .saturating_mul(report.databases.len());
    println!("Attempted      : {}", attempted);
    println!("Created        : {}", report.created());
    println!("Errors         : {}", report.failed());
    println!("Elapsed        : {:.2?}", report.elapsed);
    println!("Tables/s       : {:.2}", overall);
}
