//! Structural validation of a single semantic model or metric
//!
//! Checks run in a fixed order so output is deterministic:
//!
//! 1. required-field presence
//! 2. enumerated-value membership
//! 3. name uniqueness within the model
//! 4. at least one primary entity
//! 5. time dimensions carry a granularity
//! 6. `agg_time_dimension` names a time dimension of the model
//! 7. a declared `primary_entity` names an entity of the model
//!
//! Each rule walks every item before the next rule starts. Locations are
//! reported relative to the base path the caller passes in.

use crate::cross_reference::MeasureIndex;
use crate::manifest::{Dimension, DimensionKind, Metric, MetricKind, SemanticModel};
use crate::path::FieldPath;
use crate::schema::{
    AggregationType, DimensionType, EntityType, EnumValue, Enumeration, ItemKind, MetricType,
    TimeGranularity,
};
use crate::suggest::suggestion_for;
use crate::validation::{ErrorCode, ValidationContext, ValidationError, ValidationOptions};
use std::collections::HashMap;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_blank_opt(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, is_blank)
}

/// Report every required field of `kind` for which `present` returns false
fn check_required(
    kind: ItemKind,
    present: impl Fn(&str) -> bool,
    base: &FieldPath,
    ctx: &mut ValidationContext,
) {
    for field in kind.required_fields() {
        if !present(field.name) {
            ctx.error(
                field.code,
                format!("{} is missing required field '{}'", kind.label(), field.name),
                &base.field(field.name),
            );
        }
    }
}

fn invalid_value<T: Enumeration>(code: ErrorCode, raw: &str, location: &FieldPath) -> ValidationError {
    ValidationError::error(code, format!("Invalid {} '{}'", T::FIELD, raw), location)
        .with_suggestion(format!("Allowed values: {}", T::allowed_values()))
}

fn check_enum<T: Enumeration>(
    value: Option<&EnumValue<T>>,
    code: ErrorCode,
    location: &FieldPath,
    ctx: &mut ValidationContext,
) {
    if let Some(EnumValue::Unrecognized(raw)) = value {
        ctx.push(invalid_value::<T>(code, raw, location));
    }
}

/// Validate one semantic model with locations relative to the model itself
pub fn validate_semantic_model(model: &SemanticModel) -> Vec<ValidationError> {
    validate_semantic_model_at(model, &FieldPath::root(), &ValidationOptions::default())
}

/// Validate one semantic model, reporting locations under `base`
pub fn validate_semantic_model_at(
    model: &SemanticModel,
    base: &FieldPath,
    options: &ValidationOptions,
) -> Vec<ValidationError> {
    let mut ctx = ValidationContext::new();

    check_model_required_fields(model, base, &mut ctx);
    check_model_enums(model, base, &mut ctx);
    check_unique_names(model, base, &mut ctx);
    check_has_primary_entity(model, base, &mut ctx);
    check_time_granularity(model, base, &mut ctx);
    check_agg_time_dimensions(model, base, options, &mut ctx);
    check_declared_primary_entity(model, base, options, &mut ctx);

    ctx.into_issues()
}

fn check_model_required_fields(model: &SemanticModel, base: &FieldPath, ctx: &mut ValidationContext) {
    check_required(
        ItemKind::SemanticModel,
        |field| match field {
            "name" => !is_blank(&model.name),
            "node_relation" => model.node_relation.is_some(),
            "entities" => !model.entities.is_empty(),
            _ => true,
        },
        base,
        ctx,
    );

    if let Some(relation) = &model.node_relation {
        check_required(
            ItemKind::NodeRelation,
            |field| match field {
                "alias" => !is_blank(&relation.alias),
                "schema_name" => !is_blank(&relation.schema_name),
                "database" => !is_blank(&relation.database),
                _ => true,
            },
            &base.field("node_relation"),
            ctx,
        );
    }

    for (i, entity) in model.entities.iter().enumerate() {
        check_required(
            ItemKind::Entity,
            |field| match field {
                "name" => !is_blank(&entity.name),
                "type" => entity.kind.is_some(),
                _ => true,
            },
            &base.index("entities", i),
            ctx,
        );
    }

    for (i, dimension) in model.dimensions.iter().enumerate() {
        check_required(
            ItemKind::Dimension,
            |field| match field {
                "name" => !is_blank(&dimension.name),
                "type" => dimension.kind.is_some(),
                "expr" => !is_blank_opt(&dimension.expr),
                _ => true,
            },
            &base.index("dimensions", i),
            ctx,
        );
    }

    for (i, measure) in model.measures.iter().enumerate() {
        check_required(
            ItemKind::Measure,
            |field| match field {
                "name" => !is_blank(&measure.name),
                "agg" => measure.agg.is_some(),
                _ => true,
            },
            &base.index("measures", i),
            ctx,
        );
    }
}

fn check_model_enums(model: &SemanticModel, base: &FieldPath, ctx: &mut ValidationContext) {
    for (i, entity) in model.entities.iter().enumerate() {
        check_enum::<EntityType>(
            entity.kind.as_ref(),
            ErrorCode::InvalidType,
            &base.index("entities", i).field("type"),
            ctx,
        );
    }

    for (i, dimension) in model.dimensions.iter().enumerate() {
        let path = base.index("dimensions", i);
        if let Some(DimensionKind::Unrecognized(raw)) = &dimension.kind {
            ctx.push(invalid_value::<DimensionType>(
                ErrorCode::InvalidType,
                raw,
                &path.field("type"),
            ));
        }
        check_enum::<TimeGranularity>(
            dimension.time_granularity(),
            ErrorCode::InvalidTimeGranularity,
            &path.field("type_params").field("time_granularity"),
            ctx,
        );
    }

    for (i, measure) in model.measures.iter().enumerate() {
        check_enum::<AggregationType>(
            measure.agg.as_ref(),
            ErrorCode::InvalidAgg,
            &base.index("measures", i).field("agg"),
            ctx,
        );
    }
}

/// Report each repeat of a name after its first occurrence
fn check_unique<'a>(
    names: impl Iterator<Item = &'a str>,
    array: &str,
    label: &str,
    code: ErrorCode,
    base: &FieldPath,
    ctx: &mut ValidationContext,
) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (i, name) in names.enumerate() {
        if is_blank(name) {
            continue;
        }
        match first_seen.get(name) {
            Some(first) => ctx.error(
                code,
                format!(
                    "Duplicate {} name '{}' (first defined at {})",
                    label,
                    name,
                    base.index(array, *first)
                ),
                &base.index(array, i).field("name"),
            ),
            None => {
                first_seen.insert(name, i);
            }
        }
    }
}

fn check_unique_names(model: &SemanticModel, base: &FieldPath, ctx: &mut ValidationContext) {
    check_unique(
        model.entities.iter().map(|e| e.name.as_str()),
        "entities",
        "entity",
        ErrorCode::DuplicateEntityName,
        base,
        ctx,
    );
    check_unique(
        model.dimensions.iter().map(|d| d.name.as_str()),
        "dimensions",
        "dimension",
        ErrorCode::DuplicateDimensionName,
        base,
        ctx,
    );
    check_unique(
        model.measures.iter().map(|m| m.name.as_str()),
        "measures",
        "measure",
        ErrorCode::DuplicateMeasureName,
        base,
        ctx,
    );
}

fn check_has_primary_entity(model: &SemanticModel, base: &FieldPath, ctx: &mut ValidationContext) {
    // An empty list is already MISSING_ENTITIES.
    if model.entities.is_empty() {
        return;
    }
    let has_primary = model
        .entities
        .iter()
        .any(|e| e.entity_type() == Some(EntityType::Primary));
    if !has_primary {
        ctx.push(
            ValidationError::error(
                ErrorCode::MissingPrimaryEntity,
                format!(
                    "semantic model '{}' has no entity of type 'primary'",
                    model.name
                ),
                &base.field("entities"),
            )
            .with_suggestion("Set the type of the model's grain entity to 'primary'"),
        );
    }
}

fn check_time_granularity(model: &SemanticModel, base: &FieldPath, ctx: &mut ValidationContext) {
    for (i, dimension) in model.dimensions.iter().enumerate() {
        let missing = match &dimension.kind {
            Some(DimensionKind::Time(params)) => params
                .as_ref()
                .map_or(true, |p| p.time_granularity.is_none()),
            _ => false,
        };
        if missing {
            ctx.push(
                ValidationError::error(
                    ErrorCode::MissingTimeGranularity,
                    format!(
                        "time dimension '{}' requires a time_granularity",
                        dimension.name
                    ),
                    &base
                        .index("dimensions", i)
                        .field("type_params")
                        .field("time_granularity"),
                )
                .with_suggestion(format!(
                    "Allowed values: {}",
                    TimeGranularity::allowed_values()
                )),
            );
        }
    }
}

fn check_agg_time_dimensions(
    model: &SemanticModel,
    base: &FieldPath,
    options: &ValidationOptions,
    ctx: &mut ValidationContext,
) {
    for (i, measure) in model.measures.iter().enumerate() {
        let Some(target) = measure.agg_time_dimension.as_deref() else {
            continue;
        };
        if is_blank(target) {
            continue;
        }
        let location = base.index("measures", i).field("agg_time_dimension");
        match model.find_dimension(target) {
            None => {
                let mut issue = ValidationError::error(
                    ErrorCode::UnknownAggTimeDimension,
                    format!(
                        "measure '{}' uses unknown agg_time_dimension '{}'",
                        measure.name, target
                    ),
                    &location,
                );
                let time_dimensions = model
                    .dimensions
                    .iter()
                    .filter(|d| d.dimension_type() == Some(DimensionType::Time))
                    .map(|d| d.name.as_str());
                if let Some(hint) = suggestion_for(target, time_dimensions, options) {
                    issue = issue.with_suggestion(hint);
                }
                ctx.push(issue);
            }
            Some(dimension) if is_non_time(dimension) => {
                ctx.warning(
                    ErrorCode::AggTimeDimensionNotTime,
                    format!(
                        "measure '{}' uses '{}' as agg_time_dimension, which is not a time dimension",
                        measure.name, target
                    ),
                    &location,
                );
            }
            Some(_) => {}
        }
    }
}

fn is_non_time(dimension: &Dimension) -> bool {
    matches!(dimension.dimension_type(), Some(t) if t != DimensionType::Time)
}

fn check_declared_primary_entity(
    model: &SemanticModel,
    base: &FieldPath,
    options: &ValidationOptions,
    ctx: &mut ValidationContext,
) {
    let Some(primary) = model.primary_entity.as_deref() else {
        return;
    };
    if is_blank(primary) || model.entities.iter().any(|e| e.name == primary) {
        return;
    }
    let mut issue = ValidationError::warning(
        ErrorCode::UnknownPrimaryEntity,
        format!(
            "primary_entity '{}' does not name an entity of semantic model '{}'",
            primary, model.name
        ),
        &base.field("primary_entity"),
    );
    let names = model.entities.iter().map(|e| e.name.as_str());
    if let Some(hint) = suggestion_for(primary, names, options) {
        issue = issue.with_suggestion(hint);
    }
    ctx.push(issue);
}

/// Validate one metric with locations relative to the metric itself
///
/// When `known_measures` is given, measure references are resolved against it.
pub fn validate_metric(metric: &Metric, known_measures: Option<&MeasureIndex>) -> Vec<ValidationError> {
    validate_metric_at(
        metric,
        known_measures,
        &FieldPath::root(),
        &ValidationOptions::default(),
    )
}

/// Validate one metric, reporting locations under `base`
pub fn validate_metric_at(
    metric: &Metric,
    known_measures: Option<&MeasureIndex>,
    base: &FieldPath,
    options: &ValidationOptions,
) -> Vec<ValidationError> {
    let mut ctx = ValidationContext::new();

    check_required(
        ItemKind::Metric,
        |field| match field {
            "name" => !is_blank(&metric.name),
            "type" => metric.kind.is_some(),
            _ => true,
        },
        base,
        &mut ctx,
    );

    let params = base.field("type_params");
    match &metric.kind {
        Some(MetricKind::Unrecognized(raw)) => {
            ctx.push(invalid_value::<MetricType>(
                ErrorCode::InvalidType,
                raw,
                &base.field("type"),
            ));
        }
        Some(kind) => {
            if let Some(metric_type) = kind.metric_type() {
                for field in metric_type.required_params() {
                    if !has_param(kind, field.name) {
                        ctx.error(
                            field.code,
                            format!(
                                "{} metric '{}' is missing type_params.{}",
                                metric_type, metric.name, field.name
                            ),
                            &params.field(field.name),
                        );
                    }
                }
            }
        }
        None => {}
    }

    if let Some(index) = known_measures {
        for issue in index.check_metric(metric, &params, options) {
            ctx.push(issue);
        }
    }

    ctx.into_issues()
}

fn has_param(kind: &MetricKind, field: &str) -> bool {
    match (kind, field) {
        (MetricKind::Simple(p), "measure") => !is_blank_opt(&p.measure),
        (MetricKind::Ratio(p), "numerator") => !is_blank_opt(&p.numerator),
        (MetricKind::Ratio(p), "denominator") => !is_blank_opt(&p.denominator),
        (MetricKind::Derived(p), "expr") => !is_blank_opt(&p.expr),
        (MetricKind::Derived(p), "metrics") => !p.metrics.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
#[path = "structural_test.rs"]
mod tests;
