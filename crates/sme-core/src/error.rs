//! Error types for sme-core

use thiserror::Error;

/// Core error type for the semantic manifest editor
///
/// Only conditions that stop an operation outright live here. Validation
/// findings are reported as [`crate::validation::ValidationError`] values.
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Input could not be read as a manifest document at all
    #[error("[E004] Invalid manifest document: {message}")]
    InvalidDocument { message: String },

    /// E005: Named item does not exist in the session
    #[error("[E005] {kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// E006: Named item already exists in the session
    #[error("[E006] {kind} with name '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// E007: Version name contains characters outside [A-Za-z0-9_-]
    #[error("[E007] Invalid version name '{name}': only letters, digits, '_' and '-' are allowed")]
    InvalidVersionName { name: String },

    /// E008: Saved manifest version not found
    #[error("[E008] Manifest version '{name}' not found")]
    VersionNotFound { name: String },

    /// E009: Item created or renamed with an empty name
    #[error("[E009] Empty name in {context}")]
    EmptyName { context: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context, for any read, write or delete
    #[error("[E016] I/O error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: Config YAML parse error
    #[error("[E015] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
