//! Canonical schema for semantic manifests
//!
//! Supplies the allowed values for every enumerated field in the manifest and
//! the required-field lists per item kind. Validators consult this module
//! rather than hard-coding allowed values.

use crate::enumeration::define_enumeration;
use crate::validation::ErrorCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Major version of the semantic manifest package format this editor understands.
pub const SUPPORTED_MAJOR_VERSION: &str = "0";

/// A closed set of string values for one manifest field.
pub trait Enumeration: Sized + Copy + 'static {
    /// Human-readable field label used in diagnostics (e.g. "entity type")
    const FIELD: &'static str;

    /// Every allowed value, in canonical order
    const ALL: &'static [Self];

    /// The wire name of this value
    fn as_str(&self) -> &'static str;

    /// Parse a wire name, returning `None` for values outside the set
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    /// Comma-separated list of allowed wire names
    fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

define_enumeration! {
    /// Kind of join key an entity represents
    pub enum EntityType ("entity type") {
        /// One row per value in this model
        Primary => "primary",
        /// References a primary entity elsewhere
        Foreign => "foreign",
        /// Unique but not the model's grain
        Unique => "unique",
    }
}

define_enumeration! {
    /// Kind of dimension
    pub enum DimensionType ("dimension type") {
        /// Time dimension, requires a granularity
        Time => "time",
        /// Categorical attribute
        Categorical => "categorical",
    }
}

define_enumeration! {
    /// Granularity of a time dimension
    pub enum TimeGranularity ("time granularity") {
        Day => "day",
        Week => "week",
        Month => "month",
        Quarter => "quarter",
        Year => "year",
    }
}

define_enumeration! {
    /// Aggregation applied by a measure
    pub enum AggregationType ("aggregation type") {
        Sum => "sum",
        Average => "average",
        Count => "count",
        Min => "min",
        Max => "max",
        CountDistinct => "count_distinct",
    }
}

define_enumeration! {
    /// Kind of metric
    pub enum MetricType ("metric type") {
        /// One measure
        Simple => "simple",
        /// Numerator measure over denominator measure
        Ratio => "ratio",
        /// Expression over other metrics
        Derived => "derived",
    }
}

/// A value for an enumerated field as it appeared in the document.
///
/// Unrecognised strings are kept verbatim instead of failing the import, so
/// the structural validator can report them and export can write them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue<T> {
    /// One of the allowed values
    Known(T),
    /// Any other string
    Unrecognized(String),
}

impl<T: Enumeration> EnumValue<T> {
    /// Classify a raw wire string
    pub fn from_wire(value: impl Into<String>) -> Self {
        let value = value.into();
        match T::parse(&value) {
            Some(known) => EnumValue::Known(known),
            None => EnumValue::Unrecognized(value),
        }
    }

    /// The wire string
    pub fn as_str(&self) -> &str {
        match self {
            EnumValue::Known(v) => v.as_str(),
            EnumValue::Unrecognized(s) => s,
        }
    }

    /// The allowed value, if this is one
    pub fn known(&self) -> Option<T> {
        match self {
            EnumValue::Known(v) => Some(*v),
            EnumValue::Unrecognized(_) => None,
        }
    }
}

impl<T> From<T> for EnumValue<T> {
    fn from(value: T) -> Self {
        EnumValue::Known(value)
    }
}

impl<T: Enumeration> Serialize for EnumValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: Enumeration> Deserialize<'de> for EnumValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(EnumValue::from_wire)
    }
}

/// Kinds of manifest items that carry required fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    SemanticModel,
    NodeRelation,
    Entity,
    Dimension,
    Measure,
    Metric,
}

/// One required field and the code reported when it is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    /// Field name as written in the document
    pub name: &'static str,
    /// Code reported when the field is missing
    pub code: ErrorCode,
}

const fn required(name: &'static str, code: ErrorCode) -> RequiredField {
    RequiredField { name, code }
}

const SEMANTIC_MODEL_FIELDS: &[RequiredField] = &[
    required("name", ErrorCode::MissingName),
    required("node_relation", ErrorCode::MissingNodeRelation),
    required("entities", ErrorCode::MissingEntities),
];

const NODE_RELATION_FIELDS: &[RequiredField] = &[
    required("alias", ErrorCode::MissingAlias),
    required("schema_name", ErrorCode::MissingSchemaName),
    required("database", ErrorCode::MissingDatabase),
];

const ENTITY_FIELDS: &[RequiredField] = &[
    required("name", ErrorCode::MissingName),
    required("type", ErrorCode::MissingType),
];

const DIMENSION_FIELDS: &[RequiredField] = &[
    required("name", ErrorCode::MissingName),
    required("type", ErrorCode::MissingType),
    required("expr", ErrorCode::MissingExpr),
];

const MEASURE_FIELDS: &[RequiredField] = &[
    required("name", ErrorCode::MissingName),
    required("agg", ErrorCode::MissingAgg),
];

const METRIC_FIELDS: &[RequiredField] = &[
    required("name", ErrorCode::MissingName),
    required("type", ErrorCode::MissingType),
];

const SIMPLE_PARAMS: &[RequiredField] = &[required("measure", ErrorCode::MissingMeasure)];

const RATIO_PARAMS: &[RequiredField] = &[
    required("numerator", ErrorCode::MissingNumerator),
    required("denominator", ErrorCode::MissingDenominator),
];

const DERIVED_PARAMS: &[RequiredField] = &[
    required("expr", ErrorCode::MissingExpr),
    required("metrics", ErrorCode::MissingMetrics),
];

impl ItemKind {
    /// Fields that must be present on every item of this kind, in check order
    pub fn required_fields(self) -> &'static [RequiredField] {
        match self {
            ItemKind::SemanticModel => SEMANTIC_MODEL_FIELDS,
            ItemKind::NodeRelation => NODE_RELATION_FIELDS,
            ItemKind::Entity => ENTITY_FIELDS,
            ItemKind::Dimension => DIMENSION_FIELDS,
            ItemKind::Measure => MEASURE_FIELDS,
            ItemKind::Metric => METRIC_FIELDS,
        }
    }

    /// Label used in messages ("semantic model", "entity", ...)
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::SemanticModel => "semantic model",
            ItemKind::NodeRelation => "node relation",
            ItemKind::Entity => "entity",
            ItemKind::Dimension => "dimension",
            ItemKind::Measure => "measure",
            ItemKind::Metric => "metric",
        }
    }
}

impl MetricType {
    /// Required `type_params` fields for this metric kind
    pub fn required_params(self) -> &'static [RequiredField] {
        match self {
            MetricType::Simple => SIMPLE_PARAMS,
            MetricType::Ratio => RATIO_PARAMS,
            MetricType::Derived => DERIVED_PARAMS,
        }
    }
}
