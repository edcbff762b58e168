//! Naming rules and DDL text for the benchmark objects.

use std::sync::Arc;

pub const DEFAULT_DATABASE_PREFIX: &str = "db";

/// Placeholder substituted with the table name in a [`TableTemplate`].
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// sysbench-shaped table as TiDB prints it from `SHOW CREATE TABLE`.
/// Keep this byte-for-byte stable so results stay comparable across runs.
pub const SYSBENCH_TABLE_DDL: &str = concat!(
    "CREATE TABLE `{table}` (",
    "  `id` int(11) NOT NULL AUTO_INCREMENT,",
    "  `k` int(11) NOT NULL DEFAULT '0',",
    "  `c` char(120) COLLATE utf8mb4_general_ci NOT NULL DEFAULT '',",
    "  `pad` char(60) COLLATE utf8mb4_general_ci NOT NULL DEFAULT '',",
    "  PRIMARY KEY (`id`) /*T![clustered_index] CLUSTERED */,",
    "  KEY `k_613` (`k`)",
    ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_general_ci",
    " /*T![auto_id_cache] AUTO_ID_CACHE=1 */"
);

pub const ENABLE_FAST_CREATE_SQL: &str = "SET GLOBAL tidb_enable_fast_create_table=ON";

/// CREATE TABLE text parameterized only by the table name.
#[derive(Clone, Debug)]
pub struct TableTemplate {
    ddl: Arc<str>,
}

impl TableTemplate {
    pub fn new(ddl: impl Into<Arc<str>>) -> Self {
        Self { ddl: ddl.into() }
    }

    pub fn render(&self, table_name: &str) -> String {
        self.ddl.replace(TABLE_PLACEHOLDER, table_name)
    }
}

impl Default for TableTemplate {
    fn default() -> Self {
        Self::new(SYSBENCH_TABLE_DDL)
    }
}

#[derive(Clone, Debug)]
pub struct SchemaConfig {
    pub database_prefix: String,
    pub table_template: TableTemplate,
}

impl SchemaConfig {
    pub fn database_name(&self, index: usize) -> String {
        format!("{}_{}", self.database_prefix, index)
    }

    pub fn drop_database_sql(&self, index: usize) -> String {
        format!("DROP DATABASE IF EXISTS {}", self.database_name(index))
    }

    pub fn create_database_sql(&self, index: usize) -> String {
        format!("CREATE DATABASE {}", self.database_name(index))
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            database_prefix: DEFAULT_DATABASE_PREFIX.to_string(),
            table_template: TableTemplate::default(),
        }
    }
}

/// Worker indices are unique within a database and sequence numbers are unique
/// within a worker, so the pair never collides.
pub fn table_name(worker: usize, seq: usize) -> String {
    format!("tb_{}_{}", worker, seq)
}
