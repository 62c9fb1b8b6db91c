//! sme-db - Database checks for the semantic manifest editor
//!
//! This crate provides the read-only `Catalog` trait with a DuckDB
//! implementation, derivation of (schema, table, column) targets from
//! semantic model expressions, the asynchronous `DatabaseValidator`, and a
//! last-request-wins `ValidationRunner`.

pub mod catalog;
pub mod duckdb;
pub mod error;
pub mod runner;
pub mod targets;
pub mod validator;

pub use catalog::Catalog;
pub use duckdb::DuckDbCatalog;
pub use error::{DbError, DbResult};
pub use runner::{RunResult, ValidationRunner};
pub use targets::{ColumnTarget, TableRef, TargetSet};
pub use validator::{ColumnStatus, DatabaseReport, DatabaseValidator, LookupStatus, TableStatus};
