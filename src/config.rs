use crate::schema::SchemaConfig;

pub const DEFAULT_HOST: &str = "10.2.6.51";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_THREADS: usize = 8;
pub const DEFAULT_DATABASES: usize = 1;
pub const DEFAULT_TABLES: usize = 1;

/// Immutable settings for one benchmark run.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub host: String,
    pub port: u16,
    /// Workers (and connections) per database.
    pub threads: usize,
    pub databases: usize,
    /// Tables created by each worker.
    pub tables: usize,
    pub username: String,
    /// Account used for DROP/CREATE DATABASE and SET GLOBAL.
    pub admin_username: String,
    pub fast_create: bool,
    pub schema: SchemaConfig,
}

impl BenchConfig {
    pub fn tables_per_database(&self) -> usize {
        self.threads.saturating_mul(self.tables)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            threads: DEFAULT_THREADS,
            databases: DEFAULT_DATABASES,
            tables: DEFAULT_TABLES,
            username: DEFAULT_USER.to_string(),
            admin_username: DEFAULT_USER.to_string(),
            fast_create: true,
            schema: SchemaConfig::default(),
        }
    }
}
