//! Export command implementation

use crate::cli::{ExportArgs, GlobalArgs};
use crate::commands::common::{emit, load_config, load_manifest};
use anyhow::{Context, Result};
use sme_core::{validate_manifest_with, ManifestBuilder};

/// Execute the export command
///
/// The document is exported even when it has validation errors; the
/// attached `validation_status` records them.
pub(crate) async fn execute(args: &ExportArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let outcome = load_manifest(&args.file)?;

    let report = validate_manifest_with(&outcome.manifest, &config.validation_options());
    if !report.valid {
        log::warn!(
            "Exporting {} with {} validation error(s)",
            args.file.display(),
            report.error_count()
        );
    }

    let json = ManifestBuilder::new(config.export_defaults())
        .export_json(&outcome.manifest, Some(&report))
        .context("Failed to serialize manifest")?;
    emit(&json, args.out.as_deref())
}
