//! Configuration types and parsing for sme.yml

use crate::builder::ExportDefaults;
use crate::error::{CoreError, CoreResult};
use crate::schema::TimeGranularity;
use crate::validation::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project configuration from sme.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database used for schema checks
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Validation tuning
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Defaults injected at export time
    #[serde(default)]
    pub export: ExportConfig,

    /// Directory holding saved manifest versions
    #[serde(default = "default_versions_path")]
    pub versions_path: String,
}

/// Database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB database
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or :memory:
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

/// Validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Per-lookup timeout for database checks, in milliseconds
    #[serde(default = "default_database_timeout_ms")]
    pub database_timeout_ms: u64,

    /// Maximum closest-name suggestions per unresolved reference
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Largest edit distance still offered as a suggestion
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            database_timeout_ms: default_database_timeout_ms(),
            max_suggestions: default_max_suggestions(),
            max_edit_distance: default_max_edit_distance(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_time_spine_location")]
    pub time_spine_location: String,

    #[serde(default = "default_time_spine_column")]
    pub time_spine_column: String,

    #[serde(default = "default_time_spine_grain")]
    pub time_spine_grain: TimeGranularity,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            time_spine_location: default_time_spine_location(),
            time_spine_column: default_time_spine_column(),
            time_spine_grain: default_time_spine_grain(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

const DEFAULT_PROJECT_NAME: &str = "semantic_manifest";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_database_timeout_ms() -> u64 {
    5000
}

fn default_max_suggestions() -> usize {
    3
}

fn default_max_edit_distance() -> usize {
    3
}

fn default_time_spine_location() -> String {
    "main.metricflow_time_spine".to_string()
}

fn default_time_spine_column() -> String {
    "date_day".to_string()
}

fn default_time_spine_grain() -> TimeGranularity {
    TimeGranularity::Day
}

fn default_versions_path() -> String {
    ".sme/versions".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROJECT_NAME.to_string(),
            database: DatabaseConfig::default(),
            validation: ValidationConfig::default(),
            export: ExportConfig::default(),
            versions_path: default_versions_path(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for sme.yml or sme.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join("sme.yml").display().to_string(),
            }),
        }
    }

    /// Like [`Config::load_from_dir`], but a directory without a config file
    /// yields the defaults
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No sme.yml in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        ["sme.yml", "sme.yaml"]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }
        if self.validation.database_timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "validation.database_timeout_ms must be greater than zero".to_string(),
            });
        }
        if !self.export.time_spine_location.contains('.') {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "export.time_spine_location '{}' must be of the form schema.table",
                    self.export.time_spine_location
                ),
            });
        }
        Ok(())
    }

    /// Options passed to the validators
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            max_suggestions: self.validation.max_suggestions,
            max_edit_distance: self.validation.max_edit_distance,
        }
    }

    /// Timeout for one database lookup
    pub fn database_timeout(&self) -> Duration {
        Duration::from_millis(self.validation.database_timeout_ms)
    }

    /// Defaults for the manifest builder
    pub fn export_defaults(&self) -> ExportDefaults {
        ExportDefaults {
            time_spine_location: self.export.time_spine_location.clone(),
            time_spine_column: self.export.time_spine_column.clone(),
            time_spine_grain: self.export.time_spine_grain,
        }
    }

    /// Get absolute versions directory
    pub fn versions_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.versions_path)
    }

    /// Whether the database is in-memory (nothing to check against)
    pub fn is_in_memory_database(&self) -> bool {
        self.database.path == DEFAULT_DB_PATH
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
