//! Column-reference extraction from expression ASTs

use serde::{Deserialize, Serialize};
use sqlparser::ast::{visit_expressions, Expr, Ident};
use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::error::SqlResult;
use crate::parser::ExprParser;

/// A column named by an expression, with its qualifier when written as
/// `qualifier.column`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }

    fn from_idents(idents: &[Ident]) -> Option<Self> {
        let (last, rest) = idents.split_last()?;
        if rest.is_empty() {
            return Some(Self::simple(&last.value));
        }
        let qualifier = rest
            .iter()
            .map(|i| i.value.as_str())
            .collect::<Vec<_>>()
            .join(".");
        Some(Self::qualified(qualifier, &last.value))
    }
}

/// Collect every column identifier in `expr`, first occurrence order, no
/// duplicates
///
/// Walks nested function arguments, CASE branches, casts and subexpressions.
/// Function names and literals are not columns.
pub fn extract_columns(expr: &Expr) -> Vec<ColumnRef> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    let flow = visit_expressions(expr, |e| {
        let column = match e {
            Expr::Identifier(ident) => Some(ColumnRef::simple(&ident.value)),
            Expr::CompoundIdentifier(idents) => ColumnRef::from_idents(idents),
            _ => None,
        };
        if let Some(column) = column {
            if seen.insert(column.clone()) {
                columns.push(column);
            }
        }
        ControlFlow::<()>::Continue(())
    });
    debug_assert!(flow.is_continue(), "column collection never breaks");

    columns
}

/// Parse `sql` with the DuckDB dialect and return its column references
pub fn extract_columns_from_sql(sql: &str) -> SqlResult<Vec<ColumnRef>> {
    let expr = ExprParser::duckdb().parse_expr(sql)?;
    Ok(extract_columns(&expr))
}

#[cfg(test)]
#[path = "columns_test.rs"]
mod tests;
