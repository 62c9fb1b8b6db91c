use super::*;
use serde_json::json;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("../tests/fixtures/us_employment.json");

fn codes(issues: &[ValidationError]) -> Vec<ErrorCode> {
    issues.iter().map(|i| i.code).collect()
}

#[test]
fn test_import_fixture() {
    let outcome = import_manifest_str(FIXTURE).unwrap();
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.manifest.semantic_models.len(), 2);
    assert_eq!(outcome.manifest.metrics.len(), 4);
}

#[test]
fn test_non_object_root_is_hard_failure() {
    let err = import_manifest_str("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, CoreError::InvalidDocument { .. }));
    assert!(err.to_string().contains("found an array"));
}

#[test]
fn test_unparseable_json_is_hard_failure() {
    let err = import_manifest_str("{\"semantic_models\": [").unwrap_err();
    assert!(err.to_string().starts_with("[E004]"));
}

#[test]
fn test_wrong_typed_known_field_is_hard_failure() {
    let result = import_manifest_value(json!({
        "semantic_models": [{"name": "m", "entities": "state_fips"}],
        "metrics": []
    }));
    assert!(matches!(result, Err(CoreError::InvalidDocument { .. })));
}

#[test]
fn test_missing_arrays_warn() {
    let outcome = import_manifest_value(json!({})).unwrap();
    assert_eq!(
        codes(&outcome.warnings),
        vec![
            ErrorCode::MissingSemanticModels,
            ErrorCode::MissingMetricsArray
        ]
    );
    assert!(outcome.manifest.semantic_models.is_empty());

    let outcome = import_manifest_value(json!({"semantic_models": [], "metrics": null})).unwrap();
    assert_eq!(codes(&outcome.warnings), vec![ErrorCode::MissingMetricsArray]);
}

#[test]
fn test_unknown_fields_warn_with_location() {
    let outcome = import_manifest_value(json!({
        "semantic_models": [{
            "name": "m",
            "node_relation": {"alias": "t", "schema_name": "main", "database": "db"},
            "entities": [{"name": "id", "type": "primary", "meta": {"owner": "x"}}],
            "defaults": {"agg_time_dimension": "ds"}
        }],
        "metrics": [{
            "name": "m1",
            "type": "simple",
            "type_params": {"measure": "m.x", "fill_nulls_with": 0}
        }],
        "saved_queries": []
    }))
    .unwrap();

    let got: Vec<&str> = outcome
        .warnings
        .iter()
        .map(|w| w.location.as_str())
        .collect();
    assert_eq!(
        got,
        vec![
            "saved_queries",
            "semantic_models[0].defaults",
            "semantic_models[0].entities[0].meta",
            "metrics[0].type_params.fill_nulls_with",
        ]
    );
    assert!(outcome
        .warnings
        .iter()
        .all(|w| w.code == ErrorCode::UnknownField && !w.is_error()));
}

#[test]
fn test_validation_status_ignored() {
    let outcome = import_manifest_value(json!({
        "semantic_models": [],
        "metrics": [],
        "validation_status": {"valid": true, "error_count": 0, "warning_count": 0}
    }))
    .unwrap();
    assert!(outcome.warnings.is_empty());
    assert!(!outcome.manifest.extra.contains_key("validation_status"));
}

#[test]
fn test_unsupported_schema_version_warns() {
    let outcome = import_manifest_value(json!({
        "semantic_models": [],
        "metrics": [],
        "project_configuration": {
            "time_spine_table_configurations": [],
            "dsi_package_version": {"major_version": "1", "minor_version": "0", "patch_version": "0"}
        }
    }))
    .unwrap();
    assert_eq!(
        codes(&outcome.warnings),
        vec![ErrorCode::UnsupportedSchemaVersion]
    );
    let warning = &outcome.warnings[0];
    assert!(warning.message.contains("1.0.0"));
    assert!(warning
        .suggestion
        .as_deref()
        .unwrap_or_default()
        .starts_with("Confirm"));
}

#[test]
fn test_unrecognized_enum_values_load() {
    let outcome = import_manifest_value(json!({
        "semantic_models": [{
            "name": "m",
            "entities": [{"name": "id", "type": "natural"}],
            "measures": [{"name": "x", "agg": "median"}]
        }],
        "metrics": [{"name": "c", "type": "cumulative", "type_params": {"window": "7 days"}}]
    }))
    .unwrap();
    assert!(outcome.warnings.is_empty());

    let report = crate::validation::validate_manifest(&outcome.manifest);
    assert!(report.has_code(ErrorCode::InvalidType));
    assert!(report.has_code(ErrorCode::InvalidAgg));
}

#[test]
fn test_type_params_only_kept_silently_for_unknown_kinds() {
    let outcome = import_manifest_value(json!({
        "semantic_models": [{
            "name": "m",
            "node_relation": {"alias": "t", "schema_name": "main", "database": "db"},
            "type_params": {},
            "entities": [{"name": "id", "type": "primary", "type_params": {}}],
            "dimensions": [
                {"name": "geo", "type": "spatial", "expr": "geo", "type_params": {"srid": 4326}}
            ],
            "measures": [{"name": "x", "agg": "sum", "type_params": {}}]
        }],
        "metrics": [{"name": "c", "type": "cumulative", "type_params": {"window": "7 days"}}],
        "type_params": {}
    }))
    .unwrap();

    let got: Vec<&str> = outcome
        .warnings
        .iter()
        .map(|w| w.location.as_str())
        .collect();
    assert_eq!(
        got,
        vec![
            "type_params",
            "semantic_models[0].type_params",
            "semantic_models[0].entities[0].type_params",
            "semantic_models[0].measures[0].type_params",
        ]
    );
}

#[test]
fn test_import_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("semantic_manifest.json");
    std::fs::write(&path, FIXTURE).unwrap();

    let outcome = import_manifest_file(&path).unwrap();
    assert_eq!(outcome.manifest.metrics.len(), 4);

    let missing = import_manifest_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, CoreError::IoWithPath { .. }));
}
