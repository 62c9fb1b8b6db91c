//! sme-core - Core library for the semantic manifest editor
//!
//! This crate provides the manifest data model, the canonical schema, the
//! structural and cross-reference validators, import and export of
//! `semantic_manifest.json`, the editing session, project configuration,
//! and the named-version store. Nothing here touches a database.

pub mod builder;
pub mod config;
pub mod cross_reference;
mod enumeration;
pub mod error;
pub mod import;
pub mod manifest;
pub mod path;
pub mod schema;
pub mod session;
pub mod store;
pub mod structural;
pub mod suggest;
pub mod validation;

pub use builder::{ExportDefaults, ExportDocument, ManifestBuilder};
pub use config::{Config, DbType};
pub use cross_reference::{
    validate_cross_references, validate_cross_references_with, MeasureIndex, MetricGraph,
};
pub use error::{CoreError, CoreResult};
pub use import::{import_manifest_file, import_manifest_str, import_manifest_value, ImportOutcome};
pub use manifest::{
    Dimension, DimensionKind, EditorMeta, Entity, Manifest, Measure, Metric, MetricKind,
    NodeRelation, ProjectConfiguration, SemanticModel,
};
pub use path::FieldPath;
pub use schema::{
    AggregationType, DimensionType, EntityType, EnumValue, Enumeration, MetricType,
    TimeGranularity,
};
pub use session::EditorSession;
pub use store::{FileVersionStore, ManifestVersion, VersionStore, VersionSummary};
pub use structural::{validate_metric, validate_semantic_model};
pub use validation::{
    validate_manifest, validate_manifest_with, ErrorCode, Severity, ValidationError,
    ValidationOptions, ValidationReport, ValidationStatus,
};
