use super::*;
use crate::schema::{AggregationType, DimensionType, EntityType, MetricType, TimeGranularity};
use serde_json::json;

fn us_employment_json() -> Value {
    json!({
        "name": "us_employment",
        "node_relation": {
            "alias": "us_employment",
            "schema_name": "main",
            "database": "warehouse"
        },
        "entities": [{"name": "state_fips", "type": "primary"}],
        "dimensions": [{
            "name": "year",
            "type": "time",
            "expr": "year",
            "type_params": {"time_granularity": "year"}
        }],
        "measures": [{"name": "employed_total", "agg": "sum"}]
    })
}

#[test]
fn test_parse_semantic_model() {
    let model: SemanticModel = serde_json::from_value(us_employment_json()).unwrap();
    assert_eq!(model.name, "us_employment");
    assert_eq!(model.entities[0].entity_type(), Some(EntityType::Primary));
    assert_eq!(model.dimensions[0].dimension_type(), Some(DimensionType::Time));
    assert_eq!(
        model.dimensions[0].time_granularity().and_then(|g| g.known()),
        Some(TimeGranularity::Year)
    );
    assert_eq!(
        model.measures[0].agg.as_ref().and_then(|a| a.known()),
        Some(AggregationType::Sum)
    );
    assert_eq!(model.measures[0].column_expr(), "employed_total");
}

#[test]
fn test_time_dimension_without_type_params() {
    let dim: Dimension =
        serde_json::from_value(json!({"name": "year", "type": "time", "expr": "year"})).unwrap();
    assert_eq!(dim.kind, Some(DimensionKind::Time(None)));
    assert!(dim.time_granularity().is_none());
}

#[test]
fn test_categorical_type_params_kept_as_extra() {
    let dim: Dimension = serde_json::from_value(json!({
        "name": "state",
        "type": "categorical",
        "expr": "state",
        "type_params": {"time_granularity": "day"}
    }))
    .unwrap();
    assert_eq!(dim.kind, Some(DimensionKind::Categorical));
    assert!(dim.extra.contains_key("type_params"));

    let out = serde_json::to_value(&dim).unwrap();
    assert_eq!(out["type_params"], json!({"time_granularity": "day"}));
}

#[test]
fn test_unrecognized_dimension_type() {
    let dim: Dimension =
        serde_json::from_value(json!({"name": "d", "type": "spatial", "expr": "d"})).unwrap();
    assert_eq!(dim.kind, Some(DimensionKind::Unrecognized("spatial".into())));
    assert_eq!(serde_json::to_value(&dim).unwrap()["type"], json!("spatial"));
}

#[test]
fn test_metric_kinds() {
    let simple: Metric = serde_json::from_value(json!({
        "name": "employed",
        "type": "simple",
        "type_params": {"measure": "us_employment.employed_total"}
    }))
    .unwrap();
    assert_eq!(simple.metric_type(), Some(MetricType::Simple));
    assert_eq!(
        simple.measure_references(),
        vec![("measure", "us_employment.employed_total")]
    );

    let ratio: Metric = serde_json::from_value(json!({
        "name": "unemployment_rate",
        "type": "ratio",
        "type_params": {
            "numerator": "us_employment.unemployed",
            "denominator": "us_employment.labor_force"
        }
    }))
    .unwrap();
    assert_eq!(ratio.measure_references().len(), 2);

    let derived: Metric = serde_json::from_value(json!({
        "name": "a",
        "type": "derived",
        "type_params": {"expr": "b * 2", "metrics": ["b"]}
    }))
    .unwrap();
    assert_eq!(derived.metric_references(), &["b".to_string()]);
    assert!(derived.measure_references().is_empty());
}

#[test]
fn test_metric_params_keep_unmodelled_keys() {
    let metric: Metric = serde_json::from_value(json!({
        "name": "m",
        "type": "simple",
        "type_params": {"measure": "x.y", "fill_nulls_with": 0}
    }))
    .unwrap();
    let out = serde_json::to_value(&metric).unwrap();
    assert_eq!(out["type_params"]["fill_nulls_with"], json!(0));
}

#[test]
fn test_metric_without_params_omits_type_params() {
    let metric: Metric = serde_json::from_value(json!({"name": "m", "type": "derived"})).unwrap();
    let out = serde_json::to_value(&metric).unwrap();
    // derived params always carry the metrics list
    assert_eq!(out["type_params"], json!({"metrics": []}));

    let simple: Metric = serde_json::from_value(json!({"name": "m", "type": "simple"})).unwrap();
    assert!(serde_json::to_value(&simple).unwrap().get("type_params").is_none());
}

#[test]
fn test_wrong_typed_params_fail() {
    let result: Result<Metric, _> = serde_json::from_value(json!({
        "name": "m",
        "type": "derived",
        "type_params": {"metrics": "b"}
    }));
    assert!(result.is_err());
}

#[test]
fn test_unknown_fields_round_trip() {
    let value = json!({
        "semantic_models": [us_employment_json()],
        "metrics": [],
        "saved_queries": [],
        "dashboards": [{"name": "overview"}]
    });
    let manifest: Manifest = serde_json::from_value(value.clone()).unwrap();
    assert!(manifest.extra.contains_key("saved_queries"));
    assert!(manifest.extra.contains_key("dashboards"));

    let out = serde_json::to_value(&manifest).unwrap();
    assert_eq!(out["dashboards"], value["dashboards"]);
    let again: Manifest = serde_json::from_value(out).unwrap();
    assert_eq!(again, manifest);
}

#[test]
fn test_strip_editor_metadata() {
    let mut manifest = Manifest::new();
    let mut model = SemanticModel::new("m", NodeRelation::new("t", "main", "db"))
        .with_entity(Entity::new("id", EntityType::Primary));
    model.editor.id = Some(Uuid::new_v4());
    model.editor.expanded = true;
    model.entities[0].editor.id = Some(Uuid::new_v4());
    manifest.semantic_models.push(model);
    let mut metric = Metric::simple("count", "m.rows");
    metric.editor.id = Some(Uuid::new_v4());
    manifest.metrics.push(metric);

    let before = serde_json::to_string(&manifest).unwrap();
    assert!(before.contains("_editor"));

    manifest.strip_editor_metadata();
    let after = serde_json::to_string(&manifest).unwrap();
    assert!(!after.contains("_editor"));
}

#[test]
fn test_find_by_name() {
    let mut manifest = Manifest::new();
    manifest
        .semantic_models
        .push(SemanticModel::new("a", NodeRelation::new("a", "main", "db")));
    manifest
        .semantic_models
        .push(SemanticModel::new("b", NodeRelation::new("b", "main", "db")));
    manifest.metrics.push(Metric::simple("m", "b.x"));

    assert_eq!(manifest.find_semantic_model("b").map(|(i, _)| i), Some(1));
    assert!(manifest.find_semantic_model("c").is_none());
    assert_eq!(manifest.find_metric("m").map(|(i, _)| i), Some(0));
}

#[test]
fn test_package_version_display() {
    let version = PackageVersion {
        major_version: "0".into(),
        minor_version: "7".into(),
        patch_version: "1".into(),
    };
    assert_eq!(version.to_string(), "0.7.1");
}
