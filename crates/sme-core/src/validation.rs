//! Validation result types shared by every validator
//!
//! Validators never return `Err` for a rule violation: each violation is a
//! [`ValidationError`] value collected into a list, and callers fold those
//! lists into a [`ValidationReport`].

use crate::cross_reference::validate_cross_references_with;
use crate::manifest::Manifest;
use crate::path::FieldPath;
use crate::structural::{validate_metric_at, validate_semantic_model_at};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Machine-readable code for a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Required fields
    MissingName,
    MissingNodeRelation,
    MissingAlias,
    MissingSchemaName,
    MissingDatabase,
    MissingEntities,
    MissingType,
    MissingExpr,
    MissingAgg,
    MissingPrimaryEntity,
    MissingTimeGranularity,
    MissingMeasure,
    MissingNumerator,
    MissingDenominator,
    MissingMetrics,

    // Enumerated values
    InvalidType,
    InvalidAgg,
    InvalidTimeGranularity,

    // Uniqueness
    DuplicateEntityName,
    DuplicateDimensionName,
    DuplicateMeasureName,
    DuplicateModelName,
    DuplicateMetricName,

    // References
    UnknownAggTimeDimension,
    AggTimeDimensionNotTime,
    UnknownPrimaryEntity,
    UnknownMeasureReference,
    UnknownMetricReference,
    CircularMetricDependency,

    // Import
    InvalidDocument,
    UnknownField,
    MissingSemanticModels,
    MissingMetricsArray,
    UnsupportedSchemaVersion,

    // Database
    TableNotFound,
    ColumnNotFound,
    DatabaseUnavailable,
    ColumnCheckFailed,
    ExpressionNotChecked,
}

impl ErrorCode {
    /// The wire name of this code
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingName => "MISSING_NAME",
            ErrorCode::MissingNodeRelation => "MISSING_NODE_RELATION",
            ErrorCode::MissingAlias => "MISSING_ALIAS",
            ErrorCode::MissingSchemaName => "MISSING_SCHEMA_NAME",
            ErrorCode::MissingDatabase => "MISSING_DATABASE",
            ErrorCode::MissingEntities => "MISSING_ENTITIES",
            ErrorCode::MissingType => "MISSING_TYPE",
            ErrorCode::MissingExpr => "MISSING_EXPR",
            ErrorCode::MissingAgg => "MISSING_AGG",
            ErrorCode::MissingPrimaryEntity => "MISSING_PRIMARY_ENTITY",
            ErrorCode::MissingTimeGranularity => "MISSING_TIME_GRANULARITY",
            ErrorCode::MissingMeasure => "MISSING_MEASURE",
            ErrorCode::MissingNumerator => "MISSING_NUMERATOR",
            ErrorCode::MissingDenominator => "MISSING_DENOMINATOR",
            ErrorCode::MissingMetrics => "MISSING_METRICS",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidAgg => "INVALID_AGG",
            ErrorCode::InvalidTimeGranularity => "INVALID_TIME_GRANULARITY",
            ErrorCode::DuplicateEntityName => "DUPLICATE_ENTITY_NAME",
            ErrorCode::DuplicateDimensionName => "DUPLICATE_DIMENSION_NAME",
            ErrorCode::DuplicateMeasureName => "DUPLICATE_MEASURE_NAME",
            ErrorCode::DuplicateModelName => "DUPLICATE_MODEL_NAME",
            ErrorCode::DuplicateMetricName => "DUPLICATE_METRIC_NAME",
            ErrorCode::UnknownAggTimeDimension => "UNKNOWN_AGG_TIME_DIMENSION",
            ErrorCode::AggTimeDimensionNotTime => "AGG_TIME_DIMENSION_NOT_TIME",
            ErrorCode::UnknownPrimaryEntity => "UNKNOWN_PRIMARY_ENTITY",
            ErrorCode::UnknownMeasureReference => "UNKNOWN_MEASURE_REFERENCE",
            ErrorCode::UnknownMetricReference => "UNKNOWN_METRIC_REFERENCE",
            ErrorCode::CircularMetricDependency => "CIRCULAR_METRIC_DEPENDENCY",
            ErrorCode::InvalidDocument => "INVALID_DOCUMENT",
            ErrorCode::UnknownField => "UNKNOWN_FIELD",
            ErrorCode::MissingSemanticModels => "MISSING_SEMANTIC_MODELS",
            ErrorCode::MissingMetricsArray => "MISSING_METRICS_ARRAY",
            ErrorCode::UnsupportedSchemaVersion => "UNSUPPORTED_SCHEMA_VERSION",
            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::ColumnNotFound => "COLUMN_NOT_FOUND",
            ErrorCode::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            ErrorCode::ColumnCheckFailed => "COLUMN_CHECK_FAILED",
            ErrorCode::ExpressionNotChecked => "EXPRESSION_NOT_CHECKED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    /// Dot/bracket path to the offending field
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Metric names along a dependency cycle, start repeated at the end
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<String>,
}

impl ValidationError {
    fn new(
        severity: Severity,
        code: ErrorCode,
        message: impl Into<String>,
        location: &FieldPath,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: location.to_string(),
            suggestion: None,
            cycle: Vec::new(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, location: &FieldPath) -> Self {
        Self::new(Severity::Error, code, message, location)
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>, location: &FieldPath) -> Self {
        Self::new(Severity::Warning, code, message, location)
    }

    pub fn info(code: ErrorCode, message: impl Into<String>, location: &FieldPath) -> Self {
        Self::new(Severity::Info, code, message, location)
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the metric names of a dependency cycle
    pub fn with_cycle(mut self, cycle: Vec<String>) -> Self {
        self.cycle = cycle;
        self
    }

    /// Whether this finding blocks a "valid" status
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity, self.code, self.message, self.location
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Collects findings in check order
#[derive(Debug, Default)]
pub(crate) struct ValidationContext {
    pub issues: Vec<ValidationError>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationError) {
        self.issues.push(issue);
    }

    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>, location: &FieldPath) {
        self.push(ValidationError::error(code, message, location));
    }

    pub fn warning(&mut self, code: ErrorCode, message: impl Into<String>, location: &FieldPath) {
        self.push(ValidationError::warning(code, message, location));
    }

    pub fn into_issues(self) -> Vec<ValidationError> {
        self.issues
    }
}

/// Response shape for every validation request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    /// Split findings by severity; warnings and infos both land in `warnings`
    pub fn from_issues(issues: impl IntoIterator<Item = ValidationError>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(ValidationError::is_error);
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Fold another report's findings into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
    }

    /// Append findings that are not part of any validator pass (e.g. import warnings)
    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationError>) {
        self.merge(Self::from_issues(issues));
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Whether any finding carries this code
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|e| e.code == code)
    }

    /// Summary attached to exported documents
    pub fn status(&self) -> ValidationStatus {
        ValidationStatus {
            valid: self.valid,
            error_count: self.error_count(),
            warning_count: self.warning_count(),
        }
    }
}

/// Validation summary stamped on an exported manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Tuning knobs for reference suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Maximum number of closest-name suggestions to list
    pub max_suggestions: usize,
    /// Largest edit distance still considered a close match
    pub max_edit_distance: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_suggestions: 3,
            max_edit_distance: 3,
        }
    }
}

/// Run structural validation on every item, then cross-reference validation.
pub fn validate_manifest(manifest: &Manifest) -> ValidationReport {
    validate_manifest_with(manifest, &ValidationOptions::default())
}

/// [`validate_manifest`] with explicit options
pub fn validate_manifest_with(manifest: &Manifest, options: &ValidationOptions) -> ValidationReport {
    let root = FieldPath::root();
    let mut issues = Vec::new();

    for (idx, model) in manifest.semantic_models.iter().enumerate() {
        issues.extend(validate_semantic_model_at(
            model,
            &root.index("semantic_models", idx),
            options,
        ));
    }

    // Measure references are resolved once, by the cross-reference pass.
    for (idx, metric) in manifest.metrics.iter().enumerate() {
        issues.extend(validate_metric_at(
            metric,
            None,
            &root.index("metrics", idx),
            options,
        ));
    }

    issues.extend(validate_cross_references_with(manifest, options));

    log::debug!(
        "Validated {} semantic models and {} metrics: {} findings",
        manifest.semantic_models.len(),
        manifest.metrics.len(),
        issues.len()
    );

    ValidationReport::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_name_matches_serde() {
        for code in [
            ErrorCode::MissingTimeGranularity,
            ErrorCode::UnknownMeasureReference,
            ErrorCode::CircularMetricDependency,
            ErrorCode::MissingMetricsArray,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_report_partitions_by_severity() {
        let path = FieldPath::root().field("name");
        let report = ValidationReport::from_issues(vec![
            ValidationError::error(ErrorCode::MissingName, "missing", &path),
            ValidationError::warning(ErrorCode::UnknownField, "extra", &path),
            ValidationError::info(ErrorCode::ExpressionNotChecked, "skipped", &path),
        ]);
        assert!(!report.valid);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let path = FieldPath::root();
        let report = ValidationReport::from_issues(vec![ValidationError::warning(
            ErrorCode::UnknownField,
            "extra",
            &path,
        )]);
        assert!(report.valid);
        assert_eq!(
            report.status(),
            ValidationStatus {
                valid: true,
                error_count: 0,
                warning_count: 1
            }
        );
    }

    #[test]
    fn test_merge_recomputes_valid() {
        let path = FieldPath::root();
        let mut report = ValidationReport::from_issues(vec![]);
        assert!(report.valid);
        report.extend(vec![ValidationError::error(
            ErrorCode::DuplicateModelName,
            "dup",
            &path,
        )]);
        assert!(!report.valid);
        assert!(report.has_code(ErrorCode::DuplicateModelName));
    }

    #[test]
    fn test_display_includes_hint() {
        let path = FieldPath::root().field("agg");
        let issue = ValidationError::error(ErrorCode::InvalidAgg, "bad agg", &path)
            .with_suggestion("Allowed values: sum, count");
        let rendered = issue.to_string();
        assert!(rendered.starts_with("[ERROR] INVALID_AGG: bad agg (agg)"));
        assert!(rendered.contains("hint: Allowed values: sum, count"));
    }
}
