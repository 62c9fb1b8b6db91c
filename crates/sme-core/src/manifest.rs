//! In-memory semantic manifest
//!
//! Mirrors the `semantic_manifest.json` document: semantic models (entities,
//! dimensions, measures) plus metrics. The types are deliberately tolerant so
//! that a half-edited document still loads: names may be empty, enumerated
//! fields keep unrecognised strings, and unknown keys are retained in `extra`.
//! The structural validator is what turns those states into findings.

use crate::schema::{
    AggregationType, DimensionType, EntityType, EnumValue, MetricType, TimeGranularity,
};
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Keys present in the document that this editor does not model.
///
/// Kept sorted so that export is byte-stable.
pub type ExtraFields = BTreeMap<String, Value>;

/// Editor-only state attached to an item; never exported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorMeta {
    /// Session-internal identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Whether the item is expanded in the editor tree
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,

    /// Findings from the most recent validation of this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationError>,
}

impl EditorMeta {
    /// Whether nothing editor-specific is set
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && !self.expanded && self.validation.is_empty()
    }
}

/// The complete document: all semantic models plus all metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Semantic models in insertion order
    #[serde(default)]
    pub semantic_models: Vec<SemanticModel>,

    /// Metrics in insertion order
    #[serde(default)]
    pub metrics: Vec<Metric>,

    /// Project-level export configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_configuration: Option<ProjectConfiguration>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the first semantic model with this name, with its index
    pub fn find_semantic_model(&self, name: &str) -> Option<(usize, &SemanticModel)> {
        self.semantic_models
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name)
    }

    /// Find the first metric with this name, with its index
    pub fn find_metric(&self, name: &str) -> Option<(usize, &Metric)> {
        self.metrics.iter().enumerate().find(|(_, m)| m.name == name)
    }

    /// Remove identifiers, UI flags, and cached findings from every item
    pub fn strip_editor_metadata(&mut self) {
        for model in &mut self.semantic_models {
            model.editor = EditorMeta::default();
            for entity in &mut model.entities {
                entity.editor = EditorMeta::default();
            }
            for dimension in &mut model.dimensions {
                dimension.editor = EditorMeta::default();
            }
            for measure in &mut model.measures {
                measure.editor = EditorMeta::default();
            }
        }
        for metric in &mut self.metrics {
            metric.editor = EditorMeta::default();
        }
    }
}

/// Build the model-qualified full name of a measure (`model.measure`)
pub fn measure_full_name(model: &str, measure: &str) -> String {
    format!("{}.{}", model, measure)
}

/// Physical table a semantic model describes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeRelation {
    /// Table or view name
    #[serde(default)]
    pub alias: String,

    /// Database schema
    #[serde(default)]
    pub schema_name: String,

    /// Database name
    #[serde(default)]
    pub database: String,

    /// Fully-qualified relation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl NodeRelation {
    pub fn new(
        alias: impl Into<String>,
        schema_name: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            schema_name: schema_name.into(),
            database: database.into(),
            ..Default::default()
        }
    }
}

/// Metadata description of one physical table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticModel {
    /// Unique name within the manifest
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_relation: Option<NodeRelation>,

    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub dimensions: Vec<Dimension>,

    #[serde(default)]
    pub measures: Vec<Measure>,

    /// Name of the primary entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,

    #[serde(rename = "_editor", default, skip_serializing_if = "EditorMeta::is_empty")]
    pub editor: EditorMeta,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl SemanticModel {
    pub fn new(name: impl Into<String>, node_relation: NodeRelation) -> Self {
        Self {
            name: name.into(),
            node_relation: Some(node_relation),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn find_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// A named, typed join key within a semantic model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EnumValue<EntityType>>,

    /// SQL expression; defaults to the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "_editor", default, skip_serializing_if = "EditorMeta::is_empty")]
    pub editor: EditorMeta,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityType) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.kind.as_ref().and_then(EnumValue::known)
    }

    /// The SQL expression, falling back to the name
    pub fn column_expr(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }
}

/// Parameters carried by a time dimension
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_granularity: Option<EnumValue<TimeGranularity>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_params: Option<Value>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Dimension kind, with the parameters that kind carries
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionKind {
    /// `type_params` is `None` when the document omitted it
    Time(Option<TimeParams>),
    Categorical,
    Unrecognized(String),
}

impl DimensionKind {
    pub fn dimension_type(&self) -> Option<DimensionType> {
        match self {
            DimensionKind::Time(_) => Some(DimensionType::Time),
            DimensionKind::Categorical => Some(DimensionType::Categorical),
            DimensionKind::Unrecognized(_) => None,
        }
    }

    fn wire_type(&self) -> EnumValue<DimensionType> {
        match self {
            DimensionKind::Time(_) => EnumValue::Known(DimensionType::Time),
            DimensionKind::Categorical => EnumValue::Known(DimensionType::Categorical),
            DimensionKind::Unrecognized(s) => EnumValue::Unrecognized(s.clone()),
        }
    }
}

/// A named attribute usable for grouping or filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionWire", into = "DimensionWire")]
pub struct Dimension {
    pub name: String,
    pub kind: Option<DimensionKind>,
    pub expr: Option<String>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub is_partition: Option<bool>,
    pub editor: EditorMeta,
    pub extra: ExtraFields,
}

impl Dimension {
    fn with_kind(name: String, expr: String, kind: DimensionKind) -> Self {
        Self {
            name,
            kind: Some(kind),
            expr: Some(expr),
            description: None,
            label: None,
            is_partition: None,
            editor: EditorMeta::default(),
            extra: ExtraFields::new(),
        }
    }

    /// A time dimension with the given granularity
    pub fn time(
        name: impl Into<String>,
        expr: impl Into<String>,
        granularity: TimeGranularity,
    ) -> Self {
        let params = TimeParams {
            time_granularity: Some(granularity.into()),
            ..Default::default()
        };
        Self::with_kind(name.into(), expr.into(), DimensionKind::Time(Some(params)))
    }

    pub fn categorical(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::with_kind(name.into(), expr.into(), DimensionKind::Categorical)
    }

    pub fn dimension_type(&self) -> Option<DimensionType> {
        self.kind.as_ref().and_then(DimensionKind::dimension_type)
    }

    /// Granularity of a time dimension, as written
    pub fn time_granularity(&self) -> Option<&EnumValue<TimeGranularity>> {
        match &self.kind {
            Some(DimensionKind::Time(Some(params))) => params.time_granularity.as_ref(),
            _ => None,
        }
    }

    /// The SQL expression, falling back to the name
    pub fn column_expr(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Serialize, Deserialize)]
struct DimensionWire {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<EnumValue<DimensionType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_partition: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(rename = "_editor", default, skip_serializing_if = "EditorMeta::is_empty")]
    editor: EditorMeta,
    #[serde(flatten)]
    extra: ExtraFields,
}

impl TryFrom<DimensionWire> for Dimension {
    type Error = String;

    fn try_from(wire: DimensionWire) -> Result<Self, Self::Error> {
        let mut extra = wire.extra;
        let kind = match wire.kind {
            Some(EnumValue::Known(DimensionType::Time)) => {
                let params = match wire.type_params {
                    Some(value) => Some(
                        serde_json::from_value::<TimeParams>(value).map_err(|e| {
                            format!("dimension '{}': invalid type_params: {}", wire.name, e)
                        })?,
                    ),
                    None => None,
                };
                Some(DimensionKind::Time(params))
            }
            other => {
                // Only time dimensions carry parameters; anything else is kept verbatim.
                if let Some(value) = wire.type_params {
                    extra.insert("type_params".to_string(), value);
                }
                other.map(|k| match k {
                    EnumValue::Known(DimensionType::Categorical) => DimensionKind::Categorical,
                    EnumValue::Known(DimensionType::Time) => DimensionKind::Time(None),
                    EnumValue::Unrecognized(s) => DimensionKind::Unrecognized(s),
                })
            }
        };

        Ok(Dimension {
            name: wire.name,
            kind,
            expr: wire.expr,
            description: wire.description,
            label: wire.label,
            is_partition: wire.is_partition,
            editor: wire.editor,
            extra,
        })
    }
}

impl From<Dimension> for DimensionWire {
    fn from(dim: Dimension) -> Self {
        let type_params = match &dim.kind {
            Some(DimensionKind::Time(Some(params))) => serde_json::to_value(params).ok(),
            _ => None,
        };
        DimensionWire {
            name: dim.name,
            kind: dim.kind.as_ref().map(DimensionKind::wire_type),
            expr: dim.expr,
            description: dim.description,
            type_params,
            is_partition: dim.is_partition,
            label: dim.label,
            editor: dim.editor,
            extra: dim.extra,
        }
    }
}

/// A named, aggregatable expression within a semantic model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg: Option<EnumValue<AggregationType>>,

    /// SQL expression; defaults to the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_metric: Option<bool>,

    /// Dimension of the same model used as this measure's time axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_time_dimension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "_editor", default, skip_serializing_if = "EditorMeta::is_empty")]
    pub editor: EditorMeta,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Measure {
    pub fn new(name: impl Into<String>, agg: AggregationType) -> Self {
        Self {
            name: name.into(),
            agg: Some(agg.into()),
            ..Default::default()
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_agg_time_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.agg_time_dimension = Some(dimension.into());
        self
    }

    /// The SQL expression, falling back to the name
    pub fn column_expr(&self) -> &str {
        self.expr.as_deref().unwrap_or(&self.name)
    }
}

/// `type_params` of a simple metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimpleParams {
    /// Model-qualified measure name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `type_params` of a ratio metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RatioParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `type_params` of a derived metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,

    /// Names of the metrics the expression refers to
    #[serde(default)]
    pub metrics: Vec<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Metric kind, with the parameters that kind carries
#[derive(Debug, Clone, PartialEq)]
pub enum MetricKind {
    Simple(SimpleParams),
    Ratio(RatioParams),
    Derived(DerivedParams),
    Unrecognized(String),
}

impl MetricKind {
    pub fn metric_type(&self) -> Option<MetricType> {
        match self {
            MetricKind::Simple(_) => Some(MetricType::Simple),
            MetricKind::Ratio(_) => Some(MetricType::Ratio),
            MetricKind::Derived(_) => Some(MetricType::Derived),
            MetricKind::Unrecognized(_) => None,
        }
    }

    fn wire_type(&self) -> EnumValue<MetricType> {
        match self {
            MetricKind::Simple(_) => EnumValue::Known(MetricType::Simple),
            MetricKind::Ratio(_) => EnumValue::Known(MetricType::Ratio),
            MetricKind::Derived(_) => EnumValue::Known(MetricType::Derived),
            MetricKind::Unrecognized(s) => EnumValue::Unrecognized(s.clone()),
        }
    }
}

/// A named business calculation over measures or other metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetricWire", into = "MetricWire")]
pub struct Metric {
    pub name: String,
    pub kind: Option<MetricKind>,
    pub description: Option<String>,
    pub label: Option<String>,
    pub editor: EditorMeta,
    pub extra: ExtraFields,
}

impl Metric {
    fn with_kind(name: String, kind: MetricKind) -> Self {
        Self {
            name,
            kind: Some(kind),
            description: None,
            label: None,
            editor: EditorMeta::default(),
            extra: ExtraFields::new(),
        }
    }

    pub fn simple(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self::with_kind(
            name.into(),
            MetricKind::Simple(SimpleParams {
                measure: Some(measure.into()),
                ..Default::default()
            }),
        )
    }

    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name.into(),
            MetricKind::Ratio(RatioParams {
                numerator: Some(numerator.into()),
                denominator: Some(denominator.into()),
                ..Default::default()
            }),
        )
    }

    pub fn derived<I, S>(name: impl Into<String>, expr: impl Into<String>, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name.into(),
            MetricKind::Derived(DerivedParams {
                expr: Some(expr.into()),
                metrics: metrics.into_iter().map(Into::into).collect(),
                ..Default::default()
            }),
        )
    }

    pub fn metric_type(&self) -> Option<MetricType> {
        self.kind.as_ref().and_then(MetricKind::metric_type)
    }

    /// Declared measure references as `(type_params field, reference)` pairs
    pub fn measure_references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = Vec::new();
        match &self.kind {
            Some(MetricKind::Simple(params)) => {
                if let Some(measure) = non_empty(&params.measure) {
                    refs.push(("measure", measure));
                }
            }
            Some(MetricKind::Ratio(params)) => {
                if let Some(numerator) = non_empty(&params.numerator) {
                    refs.push(("numerator", numerator));
                }
                if let Some(denominator) = non_empty(&params.denominator) {
                    refs.push(("denominator", denominator));
                }
            }
            _ => {}
        }
        refs
    }

    /// Metric names a derived metric refers to
    pub fn metric_references(&self) -> &[String] {
        match &self.kind {
            Some(MetricKind::Derived(params)) => &params.metrics,
            _ => &[],
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[derive(Serialize, Deserialize)]
struct MetricWire {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<EnumValue<MetricType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(rename = "_editor", default, skip_serializing_if = "EditorMeta::is_empty")]
    editor: EditorMeta,
    #[serde(flatten)]
    extra: ExtraFields,
}

fn params_from_value<T>(metric: &str, value: Option<Value>) -> Result<T, String>
where
    T: Default + serde::de::DeserializeOwned,
{
    match value {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| format!("metric '{}': invalid type_params: {}", metric, e)),
        None => Ok(T::default()),
    }
}

impl TryFrom<MetricWire> for Metric {
    type Error = String;

    fn try_from(wire: MetricWire) -> Result<Self, Self::Error> {
        let mut extra = wire.extra;
        let name = wire.name;
        let kind = match wire.kind {
            Some(EnumValue::Known(MetricType::Simple)) => Some(MetricKind::Simple(
                params_from_value(&name, wire.type_params)?,
            )),
            Some(EnumValue::Known(MetricType::Ratio)) => Some(MetricKind::Ratio(
                params_from_value(&name, wire.type_params)?,
            )),
            Some(EnumValue::Known(MetricType::Derived)) => Some(MetricKind::Derived(
                params_from_value(&name, wire.type_params)?,
            )),
            other => {
                if let Some(value) = wire.type_params {
                    extra.insert("type_params".to_string(), value);
                }
                other.map(|k| MetricKind::Unrecognized(k.as_str().to_string()))
            }
        };

        Ok(Metric {
            name,
            kind,
            description: wire.description,
            label: wire.label,
            editor: wire.editor,
            extra,
        })
    }
}

impl From<Metric> for MetricWire {
    fn from(metric: Metric) -> Self {
        let type_params = match &metric.kind {
            Some(MetricKind::Simple(params)) => serde_json::to_value(params).ok(),
            Some(MetricKind::Ratio(params)) => serde_json::to_value(params).ok(),
            Some(MetricKind::Derived(params)) => serde_json::to_value(params).ok(),
            Some(MetricKind::Unrecognized(_)) | None => None,
        }
        .filter(|v| !matches!(v.as_object(), Some(o) if o.is_empty()));

        MetricWire {
            name: metric.name,
            description: metric.description,
            kind: metric.kind.as_ref().map(MetricKind::wire_type),
            type_params,
            label: metric.label,
            editor: metric.editor,
            extra: metric.extra,
        }
    }
}

/// Project-level configuration block of the exported document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    #[serde(default)]
    pub time_spine_table_configurations: Vec<TimeSpineTableConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsi_package_version: Option<PackageVersion>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Declares the table that provides one row per time grain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSpineTableConfiguration {
    /// `schema.table`
    pub location: String,
    pub column_name: String,
    pub grain: EnumValue<TimeGranularity>,
}

/// Version of the manifest package that wrote the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    pub major_version: String,
    #[serde(default)]
    pub minor_version: String,
    #[serde(default)]
    pub patch_version: String,
}

impl std::fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.major_version, self.minor_version, self.patch_version
        )
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
