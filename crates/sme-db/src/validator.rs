//! Asynchronous column-existence checks
//!
//! One catalog lookup is issued per distinct table and the result is shared by
//! every column on that table. Lookups run concurrently, each under its own
//! timeout, and a failed lookup never discards its siblings: the report is
//! always returned, flagged `incomplete` when anything could not be checked.

use crate::catalog::Catalog;
use crate::error::DbError;
use crate::targets::{TableRef, TargetSet};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sme_core::path::FieldPath;
use sme_core::suggest::suggestion_for;
use sme_core::validation::{ErrorCode, ValidationError, ValidationOptions};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one existence lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    Exists,
    Missing,
    /// The lookup failed or timed out
    Unknown,
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStatus::Exists => write!(f, "exists"),
            LookupStatus::Missing => write!(f, "missing"),
            LookupStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub schema: String,
    pub table: String,
    pub status: LookupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStatus {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub location: String,
    pub status: LookupStatus,
}

/// Result of one database validation request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseReport {
    pub valid: bool,
    pub incomplete: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub tables: Vec<TableStatus>,
    pub columns: Vec<ColumnStatus>,
}

impl DatabaseReport {
    /// A report for a catalog that could not be opened at all
    pub fn unavailable(message: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.push(ValidationError::warning(
            ErrorCode::DatabaseUnavailable,
            message,
            &FieldPath::root(),
        ));
        report.incomplete = true;
        report.valid = true;
        report
    }

    fn push(&mut self, issue: ValidationError) {
        if issue.is_error() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Whether any finding carries this code
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|e| e.code == code)
    }
}

/// Result of one table lookup, shared by every column on the table
enum TableLookup {
    Found(Vec<String>),
    Missing,
    Failed { code: ErrorCode, message: String },
}

/// Checks column targets against a [`Catalog`]
#[derive(Clone)]
pub struct DatabaseValidator {
    catalog: Arc<dyn Catalog>,
    timeout: Duration,
    options: ValidationOptions,
}

impl DatabaseValidator {
    pub fn new(catalog: Arc<dyn Catalog>, timeout: Duration) -> Self {
        Self {
            catalog,
            timeout,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn lookup(&self, table: &TableRef) -> TableLookup {
        let lookup = self.catalog.table_columns(&table.schema, &table.table);
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Some(columns))) => TableLookup::Found(columns),
            Ok(Ok(None)) => TableLookup::Missing,
            Ok(Err(e)) => {
                log::warn!("Catalog lookup for {} failed: {}", table, e);
                let code = if e.is_unavailable() {
                    ErrorCode::DatabaseUnavailable
                } else {
                    ErrorCode::ColumnCheckFailed
                };
                TableLookup::Failed {
                    code,
                    message: format!("Could not check table '{}': {}", table, e),
                }
            }
            Err(_) => {
                log::warn!(
                    "Catalog lookup for {} timed out after {}ms",
                    table,
                    self.timeout.as_millis()
                );
                TableLookup::Failed {
                    code: ErrorCode::DatabaseUnavailable,
                    message: format!(
                        "Database did not answer for table '{}' within {}ms",
                        table,
                        self.timeout.as_millis()
                    ),
                }
            }
        }
    }

    /// Check every target, returning once all lookups have finished or failed
    pub async fn validate(&self, targets: &TargetSet) -> DatabaseReport {
        let tables = targets.tables();
        log::debug!(
            "Checking {} column(s) across {} table(s) against {}",
            targets.len(),
            tables.len(),
            self.catalog.catalog_type()
        );

        let lookups = join_all(tables.iter().map(|table| self.lookup(table))).await;

        let mut report = DatabaseReport::default();
        for issue in &targets.skipped {
            report.push(issue.clone());
        }

        let mut results: HashMap<(String, String), TableLookup> = HashMap::new();
        for (table, lookup) in tables.iter().zip(lookups) {
            let status = match &lookup {
                TableLookup::Found(_) => LookupStatus::Exists,
                TableLookup::Missing => LookupStatus::Missing,
                TableLookup::Failed { .. } => LookupStatus::Unknown,
            };
            report.tables.push(TableStatus {
                schema: table.schema.clone(),
                table: table.table.clone(),
                status,
            });
            results.insert(table.key(), lookup);
        }

        // One TABLE_NOT_FOUND per model, one lookup failure per table
        let mut missing_reported = HashSet::new();
        let mut failures_reported = HashSet::new();
        for target in &targets.targets {
            let key = target.table.key();
            let Some(lookup) = results.get(&key) else {
                continue;
            };
            let status = match lookup {
                TableLookup::Found(columns) => {
                    let exists = columns
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(&target.column));
                    if exists {
                        LookupStatus::Exists
                    } else {
                        let mut issue = ValidationError::error(
                            ErrorCode::ColumnNotFound,
                            format!(
                                "Column '{}' not found in table '{}'",
                                target.column, target.table
                            ),
                            &target.location,
                        );
                        if let Some(hint) = suggestion_for(
                            &target.column,
                            columns.iter().map(String::as_str),
                            &self.options,
                        ) {
                            issue = issue.with_suggestion(hint);
                        }
                        report.push(issue);
                        LookupStatus::Missing
                    }
                }
                TableLookup::Missing => {
                    if missing_reported.insert(target.model.clone()) {
                        report.push(ValidationError::error(
                            ErrorCode::TableNotFound,
                            format!(
                                "Table '{}' for semantic model '{}' not found",
                                target.table, target.model
                            ),
                            &target.relation_location,
                        ));
                    }
                    LookupStatus::Missing
                }
                TableLookup::Failed { code, message } => {
                    if failures_reported.insert(key) {
                        report.push(ValidationError::warning(
                            *code,
                            message.clone(),
                            &target.relation_location,
                        ));
                        report.incomplete = true;
                    }
                    LookupStatus::Unknown
                }
            };
            report.columns.push(ColumnStatus {
                schema: target.table.schema.clone(),
                table: target.table.table.clone(),
                column: target.column.clone(),
                location: target.location.to_string(),
                status,
            });
        }

        report.valid = report.errors.is_empty();
        report
    }
}

impl From<DbError> for DatabaseReport {
    fn from(err: DbError) -> Self {
        DatabaseReport::unavailable(err.to_string())
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
