//! Manifest builder: produces the exportable document
//!
//! Export never gates on validity. The builder strips editor metadata, fills
//! in the project configuration when it is missing, and optionally stamps
//! the current validation status. Output is order-preserving and
//! byte-identical for an unchanged manifest.

use crate::error::CoreResult;
use crate::manifest::{
    ExtraFields, Manifest, Metric, ProjectConfiguration, SemanticModel,
    TimeSpineTableConfiguration,
};
use crate::schema::TimeGranularity;
use crate::validation::{ValidationReport, ValidationStatus};
use serde::{Deserialize, Serialize};

/// Key under which the validation summary is written
pub const VALIDATION_STATUS_KEY: &str = "validation_status";

/// Values used to fill in a missing project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDefaults {
    /// `schema.table` of the time spine
    pub time_spine_location: String,
    pub time_spine_column: String,
    pub time_spine_grain: TimeGranularity,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            time_spine_location: "main.metricflow_time_spine".to_string(),
            time_spine_column: "date_day".to_string(),
            time_spine_grain: TimeGranularity::Day,
        }
    }
}

impl ExportDefaults {
    fn time_spine(&self) -> TimeSpineTableConfiguration {
        TimeSpineTableConfiguration {
            location: self.time_spine_location.clone(),
            column_name: self.time_spine_column.clone(),
            grain: self.time_spine_grain.into(),
        }
    }
}

/// The canonical exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub semantic_models: Vec<SemanticModel>,
    pub metrics: Vec<Metric>,
    pub project_configuration: ProjectConfiguration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_status: Option<ValidationStatus>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ExportDocument {
    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> CoreResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Builds [`ExportDocument`]s from an in-memory manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    defaults: ExportDefaults,
}

impl ManifestBuilder {
    pub fn new(defaults: ExportDefaults) -> Self {
        Self { defaults }
    }

    /// Build the export document, attaching `report`'s status when given
    pub fn build(&self, manifest: &Manifest, report: Option<&ValidationReport>) -> ExportDocument {
        let mut manifest = manifest.clone();
        manifest.strip_editor_metadata();

        let mut project_configuration = manifest.project_configuration.unwrap_or_default();
        if project_configuration.time_spine_table_configurations.is_empty() {
            log::debug!(
                "Injecting default time spine {}",
                self.defaults.time_spine_location
            );
            project_configuration
                .time_spine_table_configurations
                .push(self.defaults.time_spine());
        }

        let mut extra = manifest.extra;
        extra.remove(VALIDATION_STATUS_KEY);

        ExportDocument {
            semantic_models: manifest.semantic_models,
            metrics: manifest.metrics,
            project_configuration,
            validation_status: report.map(ValidationReport::status),
            extra,
        }
    }

    /// Build and serialize in one step
    pub fn export_json(
        &self,
        manifest: &Manifest,
        report: Option<&ValidationReport>,
    ) -> CoreResult<String> {
        self.build(manifest, report).to_json()
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
