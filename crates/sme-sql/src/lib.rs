//! sme-sql - SQL expression layer for the semantic manifest editor
//!
//! Parses the SQL snippets held in entity, dimension and measure `expr`
//! fields with sqlparser-rs (DuckDB dialect) and extracts the column
//! identifiers they reference, for checking against a database catalog.

pub mod columns;
pub mod dialect;
pub mod error;
pub mod parser;

pub use columns::{extract_columns, extract_columns_from_sql, ColumnRef};
pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use parser::ExprParser;
