//! Read-only column catalog trait

use crate::error::DbResult;
use async_trait::async_trait;

/// Table and column existence lookups against a live schema
///
/// Implementations must be Send + Sync so lookups can run concurrently.
/// Names are matched case-insensitively.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Columns of `schema.table` in declaration order, or `None` when the
    /// table does not exist
    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Option<Vec<String>>>;

    /// Check if a table or view exists
    async fn table_exists(&self, schema: &str, table: &str) -> DbResult<bool> {
        Ok(self.table_columns(schema, table).await?.is_some())
    }

    /// Catalog type identifier for logging
    fn catalog_type(&self) -> &'static str;
}
