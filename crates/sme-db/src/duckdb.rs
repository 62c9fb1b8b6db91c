//! DuckDB catalog implementation

use crate::catalog::Catalog;
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use duckdb::{params, AccessMode, Config, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

const TABLE_EXISTS_SQL: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE lower(table_schema) = lower(?) AND lower(table_name) = lower(?)";

const TABLE_COLUMNS_SQL: &str = "SELECT column_name FROM information_schema.columns \
     WHERE lower(table_schema) = lower(?) AND lower(table_name) = lower(?) \
     ORDER BY ordinal_position";

/// DuckDB-backed column catalog
///
/// Lookups run on the blocking thread pool so a slow query never stalls the
/// async caller and can be abandoned by a timeout. Each lookup queries its own
/// clone of the base connection; the mutex is only held while cloning.
#[derive(Clone)]
pub struct DuckDbCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbCatalog {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Open an existing database file without write access
    pub fn open_read_only(path: &Path) -> DbResult<Self> {
        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let conn = Connection::open_with_flags(path, config)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::open_read_only(Path::new(path))
        }
    }

    /// Wrap a connection the caller already holds
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// A fresh connection to the same database
    fn connection(&self) -> DbResult<Connection> {
        let base = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        base.try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Run setup SQL against the database (tests and in-memory catalogs)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.connection()?
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn table_columns_sync(
        conn: Connection,
        schema: &str,
        table: &str,
    ) -> DbResult<Option<Vec<String>>> {
        let count: i64 = conn.query_row(TABLE_EXISTS_SQL, params![schema, table], |row| {
            row.get(0)
        })?;
        if count == 0 {
            return Ok(None);
        }

        let mut stmt = conn.prepare(TABLE_COLUMNS_SQL)?;
        let columns = stmt
            .query_map(params![schema, table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(columns))
    }
}

#[async_trait]
impl Catalog for DuckDbCatalog {
    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Option<Vec<String>>> {
        let conn = self.connection()?;
        let schema = schema.to_string();
        let table = table.to_string();
        tokio::task::spawn_blocking(move || Self::table_columns_sync(conn, &schema, &table))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    fn catalog_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
