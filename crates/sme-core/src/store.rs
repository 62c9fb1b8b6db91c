//! Named manifest versions
//!
//! A small key-value surface for saving and restoring snapshots of the
//! manifest under a user-chosen name. [`FileVersionStore`] keeps one JSON
//! record per name in a directory.

use crate::error::{CoreError, CoreResult};
use crate::manifest::Manifest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One saved snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestVersion {
    pub id: Uuid,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub manifest: Manifest,
}

/// Listing entry for a saved snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub id: Uuid,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub semantic_models: usize,
    pub metrics: usize,
}

impl From<&ManifestVersion> for VersionSummary {
    fn from(version: &ManifestVersion) -> Self {
        Self {
            id: version.id,
            name: version.name.clone(),
            saved_at: version.saved_at,
            semantic_models: version.manifest.semantic_models.len(),
            metrics: version.manifest.metrics.len(),
        }
    }
}

/// Save/load surface for named manifest versions
pub trait VersionStore {
    /// Save under `name`, replacing any existing version of that name
    fn save(&self, name: &str, manifest: &Manifest) -> CoreResult<ManifestVersion>;

    fn load(&self, name: &str) -> CoreResult<ManifestVersion>;

    /// All saved versions, ordered by name
    fn list(&self) -> CoreResult<Vec<VersionSummary>>;

    fn delete(&self, name: &str) -> CoreResult<()>;
}

/// Check a version name against `[A-Za-z0-9_-]+`
pub fn validate_version_name(name: &str) -> CoreResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidVersionName {
            name: name.to_string(),
        })
    }
}

/// Directory-backed version store, one `<name>.json` per version
#[derive(Debug, Clone)]
pub struct FileVersionStore {
    root: PathBuf,
}

impl FileVersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> CoreResult<PathBuf> {
        validate_version_name(name)?;
        Ok(self.root.join(format!("{}.json", name)))
    }

    fn read_record(path: &Path) -> CoreResult<ManifestVersion> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl VersionStore for FileVersionStore {
    fn save(&self, name: &str, manifest: &Manifest) -> CoreResult<ManifestVersion> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.root).map_err(|e| CoreError::IoWithPath {
            path: self.root.display().to_string(),
            source: e,
        })?;

        let mut manifest = manifest.clone();
        manifest.strip_editor_metadata();
        let version = ManifestVersion {
            id: Uuid::new_v4(),
            name: name.to_string(),
            saved_at: Utc::now(),
            manifest,
        };

        let json = serde_json::to_string_pretty(&version)?;
        std::fs::write(&path, json).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        log::debug!("Saved manifest version '{}' to {}", name, path.display());
        Ok(version)
    }

    fn load(&self, name: &str) -> CoreResult<ManifestVersion> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(CoreError::VersionNotFound {
                name: name.to_string(),
            });
        }
        Self::read_record(&path)
    }

    fn list(&self) -> CoreResult<Vec<VersionSummary>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(version) => summaries.push(VersionSummary::from(&version)),
                Err(e) => log::warn!("Skipping unreadable version file {}: {}", path.display(), e),
            }
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    fn delete(&self, name: &str) -> CoreResult<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(CoreError::VersionNotFound {
                name: name.to_string(),
            });
        }
        std::fs::remove_file(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
