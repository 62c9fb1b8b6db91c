//! Derive database column targets from semantic models
//!
//! Each entity, dimension and measure expression is parsed with the DuckDB
//! dialect; every column it names becomes one target on the model's
//! `node_relation` table.

use sme_core::manifest::{Manifest, SemanticModel};
use sme_core::path::FieldPath;
use sme_core::validation::{ErrorCode, ValidationError};
use sme_sql::extract_columns_from_sql;
use std::collections::HashSet;

/// Default schema when a node relation leaves it blank
const DEFAULT_SCHEMA: &str = "main";

/// A schema-qualified table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Case-folded identity, matching how the catalog compares names
    pub fn key(&self) -> (String, String) {
        (self.schema.to_lowercase(), self.table.to_lowercase())
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// One (schema, table, column) triple to check, with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTarget {
    pub table: TableRef,
    pub column: String,
    /// Owning semantic model
    pub model: String,
    /// The expression (or name) the column was read from
    pub location: FieldPath,
    /// The model's `node_relation`
    pub relation_location: FieldPath,
}

/// Targets for one validation request, plus expressions that could not be
/// checked
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    pub targets: Vec<ColumnTarget>,
    pub skipped: Vec<ValidationError>,
    seen: HashSet<(String, String, String)>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets for every semantic model of a manifest
    pub fn for_manifest(manifest: &Manifest) -> Self {
        Self::for_models(manifest, |_| true)
    }

    /// Targets for the semantic models accepted by `filter`, located by
    /// their index in the manifest
    pub fn for_models<F>(manifest: &Manifest, filter: F) -> Self
    where
        F: Fn(&SemanticModel) -> bool,
    {
        let mut set = Self::new();
        for (i, model) in manifest.semantic_models.iter().enumerate() {
            if filter(model) {
                set.add_model(model, &FieldPath::root().index("semantic_models", i));
            }
        }
        set
    }

    /// Add every column referenced by `model`; models without a usable
    /// node relation contribute nothing
    pub fn add_model(&mut self, model: &SemanticModel, base: &FieldPath) {
        let Some(relation) = model.node_relation.as_ref() else {
            log::debug!("Semantic model '{}' has no node_relation, skipping", model.name);
            return;
        };
        if relation.alias.trim().is_empty() {
            return;
        }
        let schema = if relation.schema_name.trim().is_empty() {
            DEFAULT_SCHEMA
        } else {
            relation.schema_name.as_str()
        };
        let table = TableRef::new(schema, &relation.alias);
        let relation_location = base.field("node_relation");

        let entities = model.entities.iter().enumerate().map(|(i, e)| {
            (base.index("entities", i), e.expr.is_some(), e.column_expr())
        });
        let dimensions = model.dimensions.iter().enumerate().map(|(i, d)| {
            (base.index("dimensions", i), d.expr.is_some(), d.column_expr())
        });
        let measures = model.measures.iter().enumerate().map(|(i, m)| {
            (base.index("measures", i), m.expr.is_some(), m.column_expr())
        });

        for (item, has_expr, sql) in entities.chain(dimensions).chain(measures) {
            let location = item.field(if has_expr { "expr" } else { "name" });
            if sql.trim().is_empty() {
                continue;
            }
            match extract_columns_from_sql(sql) {
                Ok(columns) => {
                    for column in columns {
                        self.push(ColumnTarget {
                            table: table.clone(),
                            column: column.name,
                            model: model.name.clone(),
                            location: location.clone(),
                            relation_location: relation_location.clone(),
                        });
                    }
                }
                Err(e) => {
                    log::debug!("Not checking expression '{}': {}", sql, e);
                    self.skipped.push(
                        ValidationError::info(
                            ErrorCode::ExpressionNotChecked,
                            format!(
                                "Expression '{}' could not be parsed, its columns were not checked",
                                sql
                            ),
                            &location,
                        )
                        .with_suggestion(e.to_string()),
                    );
                }
            }
        }
    }

    /// Add one target unless the same triple is already present
    pub fn push(&mut self, target: ColumnTarget) {
        let (schema, table) = target.table.key();
        if self.seen.insert((schema, table, target.column.to_lowercase())) {
            self.targets.push(target);
        }
    }

    /// Distinct tables in first-reference order
    pub fn tables(&self) -> Vec<&TableRef> {
        let mut seen = HashSet::new();
        self.targets
            .iter()
            .map(|t| &t.table)
            .filter(|t| seen.insert(t.key()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
