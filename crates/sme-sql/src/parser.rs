//! Expression parser wrapper

use crate::dialect::{DuckDbDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Expr;

/// Parser for the SQL snippets stored in entity, dimension and measure
/// `expr` fields
pub struct ExprParser {
    dialect: Box<dyn SqlDialect>,
}

impl ExprParser {
    /// Create a new parser with DuckDB dialect
    pub fn duckdb() -> Self {
        Self {
            dialect: Box::new(DuckDbDialect::new()),
        }
    }

    /// Parse one scalar expression
    pub fn parse_expr(&self, sql: &str) -> SqlResult<Expr> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptyExpression);
        }
        self.dialect.parse_expr(sql)
    }

    /// Get the dialect name
    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }
}

impl Default for ExprParser {
    fn default() -> Self {
        Self::duckdb()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
