//! Manifest import
//!
//! Reads a `semantic_manifest.json` document into a [`Manifest`]. Only a
//! document that cannot be read as the expected shape at all is an error;
//! everything else the editor can load is reported as import warnings.

use crate::builder::VALIDATION_STATUS_KEY;
use crate::error::{CoreError, CoreResult};
use crate::manifest::{DimensionKind, ExtraFields, Manifest, MetricKind};
use crate::path::FieldPath;
use crate::schema::SUPPORTED_MAJOR_VERSION;
use crate::validation::{ErrorCode, ValidationError};
use serde_json::Value;
use std::path::Path;

const TYPE_PARAMS: &str = "type_params";

/// A loaded manifest and the warnings raised while loading it
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub manifest: Manifest,
    pub warnings: Vec<ValidationError>,
}

/// Import a manifest from a JSON file
pub fn import_manifest_file(path: &Path) -> CoreResult<ImportOutcome> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    import_manifest_str(&content)
}

/// Import a manifest from JSON text
pub fn import_manifest_str(input: &str) -> CoreResult<ImportOutcome> {
    let value: Value = serde_json::from_str(input).map_err(|e| CoreError::InvalidDocument {
        message: format!("not valid JSON: {}", e),
    })?;
    import_manifest_value(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Import a manifest from an already-parsed JSON value
pub fn import_manifest_value(value: Value) -> CoreResult<ImportOutcome> {
    let mut root = match value {
        Value::Object(map) => map,
        other => {
            return Err(CoreError::InvalidDocument {
                message: format!("top-level value must be an object, found {}", json_kind(&other)),
            })
        }
    };

    // Written by export; recomputed on demand, never imported.
    root.remove(VALIDATION_STATUS_KEY);

    let mut warnings = Vec::new();
    let top = FieldPath::root();
    for (key, code) in [
        ("semantic_models", ErrorCode::MissingSemanticModels),
        ("metrics", ErrorCode::MissingMetricsArray),
    ] {
        if matches!(root.get(key), None | Some(Value::Null)) {
            root.remove(key);
            warnings.push(
                ValidationError::warning(
                    code,
                    format!("Manifest has no '{}' array; starting with an empty list", key),
                    &top.field(key),
                )
                .with_suggestion(format!("Add a '{}' array to the document", key)),
            );
        }
    }

    let manifest: Manifest =
        serde_json::from_value(Value::Object(root)).map_err(|e| CoreError::InvalidDocument {
            message: e.to_string(),
        })?;

    collect_unknown_fields(&manifest, &mut warnings);
    check_schema_version(&manifest, &mut warnings);

    log::debug!(
        "Imported {} semantic models and {} metrics with {} warnings",
        manifest.semantic_models.len(),
        manifest.metrics.len(),
        warnings.len()
    );

    Ok(ImportOutcome { manifest, warnings })
}

fn report_extra(extra: &ExtraFields, base: &FieldPath, warnings: &mut Vec<ValidationError>) {
    report_extra_except(extra, base, None, warnings);
}

fn report_extra_except(
    extra: &ExtraFields,
    base: &FieldPath,
    kept: Option<&str>,
    warnings: &mut Vec<ValidationError>,
) {
    for key in extra.keys().filter(|k| Some(k.as_str()) != kept) {
        warnings.push(ValidationError::warning(
            ErrorCode::UnknownField,
            format!("Unknown field '{}' is kept as-is", key),
            &base.field(key),
        ));
    }
}

fn collect_unknown_fields(manifest: &Manifest, warnings: &mut Vec<ValidationError>) {
    let root = FieldPath::root();
    report_extra(&manifest.extra, &root, warnings);

    if let Some(config) = &manifest.project_configuration {
        report_extra(&config.extra, &root.field("project_configuration"), warnings);
    }

    for (i, model) in manifest.semantic_models.iter().enumerate() {
        let base = root.index("semantic_models", i);
        report_extra(&model.extra, &base, warnings);
        if let Some(relation) = &model.node_relation {
            report_extra(&relation.extra, &base.field("node_relation"), warnings);
        }
        for (j, entity) in model.entities.iter().enumerate() {
            report_extra(&entity.extra, &base.index("entities", j), warnings);
        }
        for (j, dimension) in model.dimensions.iter().enumerate() {
            let path = base.index("dimensions", j);
            match &dimension.kind {
                Some(DimensionKind::Time(params)) => {
                    report_extra(&dimension.extra, &path, warnings);
                    if let Some(params) = params {
                        report_extra(&params.extra, &path.field("type_params"), warnings);
                    }
                }
                Some(DimensionKind::Categorical) => {
                    report_extra(&dimension.extra, &path, warnings)
                }
                // Parameters of an unknown kind are kept verbatim under their own key
                Some(DimensionKind::Unrecognized(_)) | None => {
                    report_extra_except(&dimension.extra, &path, Some(TYPE_PARAMS), warnings)
                }
            }
        }
        for (j, measure) in model.measures.iter().enumerate() {
            report_extra(&measure.extra, &base.index("measures", j), warnings);
        }
    }

    for (i, metric) in manifest.metrics.iter().enumerate() {
        let base = root.index("metrics", i);
        let params = base.field(TYPE_PARAMS);
        let params_extra = match &metric.kind {
            Some(MetricKind::Simple(p)) => &p.extra,
            Some(MetricKind::Ratio(p)) => &p.extra,
            Some(MetricKind::Derived(p)) => &p.extra,
            Some(MetricKind::Unrecognized(_)) | None => {
                report_extra_except(&metric.extra, &base, Some(TYPE_PARAMS), warnings);
                continue;
            }
        };
        report_extra(&metric.extra, &base, warnings);
        report_extra(params_extra, &params, warnings);
    }
}

fn check_schema_version(manifest: &Manifest, warnings: &mut Vec<ValidationError>) {
    let Some(version) = manifest
        .project_configuration
        .as_ref()
        .and_then(|c| c.dsi_package_version.as_ref())
    else {
        return;
    };
    if version.major_version == SUPPORTED_MAJOR_VERSION {
        return;
    }
    warnings.push(
        ValidationError::warning(
            ErrorCode::UnsupportedSchemaVersion,
            format!(
                "Manifest was written by package version {}; this editor supports major version {}",
                version, SUPPORTED_MAJOR_VERSION
            ),
            &FieldPath::root()
                .field("project_configuration")
                .field("dsi_package_version")
                .field("major_version"),
        )
        .with_suggestion("Confirm before editing: the document is loaded as-is, no migration is applied"),
    );
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
