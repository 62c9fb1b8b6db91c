//! Error types for sme-sql

use thiserror::Error;

/// Expression parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Expression parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty expression (S002)
    #[error("[S002] SQL expression is empty")]
    EmptyExpression,

    /// Input continues after a complete expression (S003)
    #[error("[S003] Unexpected input after expression: '{0}'")]
    TrailingInput(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
