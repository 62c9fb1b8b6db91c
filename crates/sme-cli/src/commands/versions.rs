//! Versions command implementation

use crate::cli::{GlobalArgs, ListOutput, VersionsArgs, VersionsCommand};
use crate::commands::common::{
    emit, load_config, load_manifest, print_json, print_table, project_root,
};
use anyhow::{Context, Result};
use sme_core::{FileVersionStore, ManifestBuilder, VersionStore};

/// Execute the versions command
pub(crate) async fn execute(args: &VersionsArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let store = FileVersionStore::new(config.versions_path_absolute(&project_root(global)));

    match &args.command {
        VersionsCommand::Save { name, file } => {
            let outcome = load_manifest(file)?;
            let version = store
                .save(name, &outcome.manifest)
                .with_context(|| format!("Failed to save version '{}'", name))?;
            println!(
                "Saved version '{}' ({} semantic models, {} metrics)",
                version.name,
                version.manifest.semantic_models.len(),
                version.manifest.metrics.len()
            );
        }
        VersionsCommand::Load { name, out } => {
            let version = store
                .load(name)
                .with_context(|| format!("Failed to load version '{}'", name))?;
            let json = ManifestBuilder::new(config.export_defaults())
                .export_json(&version.manifest, None)
                .context("Failed to serialize manifest")?;
            emit(&json, out.as_deref())?;
        }
        VersionsCommand::List { output } => {
            let versions = store.list().context("Failed to list versions")?;
            match output {
                ListOutput::Json => print_json(&versions)?,
                ListOutput::Table if versions.is_empty() => {
                    println!("No saved versions in {}", store.root().display());
                }
                ListOutput::Table => {
                    let rows: Vec<Vec<String>> = versions
                        .iter()
                        .map(|v| {
                            vec![
                                v.name.clone(),
                                v.saved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                                v.semantic_models.to_string(),
                                v.metrics.to_string(),
                            ]
                        })
                        .collect();
                    print_table(&["NAME", "SAVED AT (UTC)", "MODELS", "METRICS"], &rows);
                }
            }
        }
        VersionsCommand::Delete { name } => {
            store
                .delete(name)
                .with_context(|| format!("Failed to delete version '{}'", name))?;
            println!("Deleted version '{}'", name);
        }
    }
    Ok(())
}
