//! Editor session: the single owner of the manifest being edited
//!
//! All CRUD goes through [`EditorSession`], which hands out shared borrows to
//! the validators. Edits never wait on validation; findings are cached on the
//! items as editor-only metadata and stripped again at export.

use crate::cross_reference::MeasureIndex;
use crate::error::{CoreError, CoreResult};
use crate::manifest::{
    measure_full_name, Dimension, EditorMeta, Entity, Manifest, Measure, Metric, SemanticModel,
};
use crate::path::FieldPath;
use crate::structural::{validate_metric_at, validate_semantic_model_at};
use crate::validation::{validate_manifest_with, ValidationError, ValidationOptions, ValidationReport};
use std::collections::HashSet;
use uuid::Uuid;

const SEMANTIC_MODEL: &str = "semantic model";
const METRIC: &str = "metric";

fn assign_id(meta: &mut EditorMeta) -> Uuid {
    *meta.id.get_or_insert_with(Uuid::new_v4)
}

fn assign_model_ids(model: &mut SemanticModel) -> Uuid {
    for entity in &mut model.entities {
        assign_id(&mut entity.editor);
    }
    for dimension in &mut model.dimensions {
        assign_id(&mut dimension.editor);
    }
    for measure in &mut model.measures {
        assign_id(&mut measure.editor);
    }
    assign_id(&mut model.editor)
}

fn require_name(name: &str, context: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::EmptyName {
            context: context.to_string(),
        });
    }
    Ok(())
}

/// Whether `location` is `prefix` itself or a path below it
fn is_under(location: &str, prefix: &str) -> bool {
    location
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// One editing session over one manifest
#[derive(Debug, Default)]
pub struct EditorSession {
    manifest: Manifest,
    options: ValidationOptions,
}

impl EditorSession {
    /// Start with an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an imported manifest, giving every item an id
    pub fn from_manifest(mut manifest: Manifest) -> Self {
        for model in &mut manifest.semantic_models {
            assign_model_ids(model);
        }
        for metric in &mut manifest.metrics {
            assign_id(&mut metric.editor);
        }
        Self {
            manifest,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> Manifest {
        self.manifest
    }

    fn model_index(&self, name: &str) -> CoreResult<usize> {
        self.manifest
            .find_semantic_model(name)
            .map(|(i, _)| i)
            .ok_or_else(|| CoreError::NotFound {
                kind: SEMANTIC_MODEL,
                name: name.to_string(),
            })
    }

    fn metric_index(&self, name: &str) -> CoreResult<usize> {
        self.manifest
            .find_metric(name)
            .map(|(i, _)| i)
            .ok_or_else(|| CoreError::NotFound {
                kind: METRIC,
                name: name.to_string(),
            })
    }

    // Semantic models

    pub fn semantic_models(&self) -> &[SemanticModel] {
        &self.manifest.semantic_models
    }

    pub fn semantic_model(&self, name: &str) -> CoreResult<&SemanticModel> {
        let idx = self.model_index(name)?;
        Ok(&self.manifest.semantic_models[idx])
    }

    /// Append a new semantic model; its name must not be taken
    pub fn create_semantic_model(&mut self, mut model: SemanticModel) -> CoreResult<Uuid> {
        require_name(&model.name, SEMANTIC_MODEL)?;
        if self.manifest.find_semantic_model(&model.name).is_some() {
            return Err(CoreError::AlreadyExists {
                kind: SEMANTIC_MODEL,
                name: model.name,
            });
        }
        let id = assign_model_ids(&mut model);
        log::debug!("Created semantic model '{}'", model.name);
        self.manifest.semantic_models.push(model);
        Ok(id)
    }

    /// Replace a semantic model in place; renaming is allowed when the new
    /// name is free
    pub fn update_semantic_model(&mut self, name: &str, mut model: SemanticModel) -> CoreResult<()> {
        let idx = self.model_index(name)?;
        require_name(&model.name, SEMANTIC_MODEL)?;
        if model.name != name && self.manifest.find_semantic_model(&model.name).is_some() {
            return Err(CoreError::AlreadyExists {
                kind: SEMANTIC_MODEL,
                name: model.name,
            });
        }
        let existing = &self.manifest.semantic_models[idx];
        model.editor.id = existing.editor.id;
        model.editor.expanded = existing.editor.expanded;
        model.editor.validation.clear();
        assign_model_ids(&mut model);
        self.manifest.semantic_models[idx] = model;
        Ok(())
    }

    /// Remove a semantic model, returning the names of metrics whose measure
    /// references no longer resolve because of it
    pub fn delete_semantic_model(&mut self, name: &str) -> CoreResult<Vec<String>> {
        let idx = self.model_index(name)?;
        let removed = self.manifest.semantic_models.remove(idx);
        let removed_measures: HashSet<String> = removed
            .measures
            .iter()
            .map(|m| measure_full_name(&removed.name, &m.name))
            .collect();

        let index = MeasureIndex::build(&self.manifest);
        let dangling: Vec<String> = self
            .manifest
            .metrics
            .iter()
            .filter(|metric| {
                metric.measure_references().iter().any(|(_, reference)| {
                    removed_measures.contains(*reference) && !index.contains(reference)
                })
            })
            .map(|metric| metric.name.clone())
            .collect();

        if !dangling.is_empty() {
            log::warn!(
                "Deleting semantic model '{}' leaves {} metric(s) with unresolved measures: {}",
                name,
                dangling.len(),
                dangling.join(", ")
            );
        }
        Ok(dangling)
    }

    pub fn set_model_expanded(&mut self, name: &str, expanded: bool) -> CoreResult<()> {
        let idx = self.model_index(name)?;
        self.manifest.semantic_models[idx].editor.expanded = expanded;
        Ok(())
    }

    pub fn add_entity(&mut self, model: &str, mut entity: Entity) -> CoreResult<Uuid> {
        let idx = self.model_index(model)?;
        require_name(&entity.name, "entity")?;
        let target = &mut self.manifest.semantic_models[idx];
        if target.entities.iter().any(|e| e.name == entity.name) {
            return Err(CoreError::AlreadyExists {
                kind: "entity",
                name: entity.name,
            });
        }
        let id = assign_id(&mut entity.editor);
        target.entities.push(entity);
        Ok(id)
    }

    pub fn add_dimension(&mut self, model: &str, mut dimension: Dimension) -> CoreResult<Uuid> {
        let idx = self.model_index(model)?;
        require_name(&dimension.name, "dimension")?;
        let target = &mut self.manifest.semantic_models[idx];
        if target.dimensions.iter().any(|d| d.name == dimension.name) {
            return Err(CoreError::AlreadyExists {
                kind: "dimension",
                name: dimension.name,
            });
        }
        let id = assign_id(&mut dimension.editor);
        target.dimensions.push(dimension);
        Ok(id)
    }

    pub fn add_measure(&mut self, model: &str, mut measure: Measure) -> CoreResult<Uuid> {
        let idx = self.model_index(model)?;
        require_name(&measure.name, "measure")?;
        let target = &mut self.manifest.semantic_models[idx];
        if target.measures.iter().any(|m| m.name == measure.name) {
            return Err(CoreError::AlreadyExists {
                kind: "measure",
                name: measure.name,
            });
        }
        let id = assign_id(&mut measure.editor);
        target.measures.push(measure);
        Ok(id)
    }

    // Metrics

    pub fn metrics(&self) -> &[Metric] {
        &self.manifest.metrics
    }

    pub fn metric(&self, name: &str) -> CoreResult<&Metric> {
        let idx = self.metric_index(name)?;
        Ok(&self.manifest.metrics[idx])
    }

    pub fn create_metric(&mut self, mut metric: Metric) -> CoreResult<Uuid> {
        require_name(&metric.name, METRIC)?;
        if self.manifest.find_metric(&metric.name).is_some() {
            return Err(CoreError::AlreadyExists {
                kind: METRIC,
                name: metric.name,
            });
        }
        let id = assign_id(&mut metric.editor);
        self.manifest.metrics.push(metric);
        Ok(id)
    }

    pub fn update_metric(&mut self, name: &str, mut metric: Metric) -> CoreResult<()> {
        let idx = self.metric_index(name)?;
        require_name(&metric.name, METRIC)?;
        if metric.name != name && self.manifest.find_metric(&metric.name).is_some() {
            return Err(CoreError::AlreadyExists {
                kind: METRIC,
                name: metric.name,
            });
        }
        metric.editor = EditorMeta {
            id: self.manifest.metrics[idx].editor.id,
            ..EditorMeta::default()
        };
        assign_id(&mut metric.editor);
        self.manifest.metrics[idx] = metric;
        Ok(())
    }

    pub fn delete_metric(&mut self, name: &str) -> CoreResult<Metric> {
        let idx = self.metric_index(name)?;
        Ok(self.manifest.metrics.remove(idx))
    }

    // Validation

    /// Structural check of one model, locations relative to the model
    pub fn validate_model(&mut self, name: &str) -> CoreResult<ValidationReport> {
        let idx = self.model_index(name)?;
        let model = &mut self.manifest.semantic_models[idx];
        let issues = validate_semantic_model_at(model, &FieldPath::root(), &self.options);
        model.editor.validation = issues.clone();
        Ok(ValidationReport::from_issues(issues))
    }

    /// Structural check of one metric, resolving its measures against the
    /// current models
    pub fn validate_metric(&mut self, name: &str) -> CoreResult<ValidationReport> {
        let idx = self.metric_index(name)?;
        let index = MeasureIndex::build(&self.manifest);
        let metric = &mut self.manifest.metrics[idx];
        let issues = validate_metric_at(metric, Some(&index), &FieldPath::root(), &self.options);
        metric.editor.validation = issues.clone();
        Ok(ValidationReport::from_issues(issues))
    }

    /// Full structural and cross-reference validation
    ///
    /// Each finding is also cached on the model or metric its location
    /// points into.
    pub fn validate_all(&mut self) -> ValidationReport {
        let report = validate_manifest_with(&self.manifest, &self.options);
        let findings: Vec<&ValidationError> =
            report.errors.iter().chain(report.warnings.iter()).collect();

        for (i, model) in self.manifest.semantic_models.iter_mut().enumerate() {
            let prefix = FieldPath::root().index("semantic_models", i).to_string();
            model.editor.validation = findings
                .iter()
                .filter(|f| is_under(&f.location, &prefix))
                .map(|f| (*f).clone())
                .collect();
        }
        for (i, metric) in self.manifest.metrics.iter_mut().enumerate() {
            let prefix = FieldPath::root().index("metrics", i).to_string();
            metric.editor.validation = findings
                .iter()
                .filter(|f| is_under(&f.location, &prefix))
                .map(|f| (*f).clone())
                .collect();
        }
        report
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
