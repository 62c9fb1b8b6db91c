//! Check-db command implementation

use crate::cli::{CheckDbArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{
    load_config, load_manifest, print_json, print_table, project_root, ExitCode,
};
use anyhow::{bail, Result};
use sme_core::suggest::suggestion_for;
use sme_core::{Manifest, ValidationOptions};
use sme_db::{DatabaseReport, DatabaseValidator, DuckDbCatalog, LookupStatus, TargetSet};
use std::sync::Arc;
use std::time::Duration;

/// Execute the check-db command
pub(crate) async fn execute(args: &CheckDbArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let outcome = load_manifest(&args.file)?;
    let manifest = outcome.manifest;
    check_model_names(&manifest, &args.models, &config.validation_options())?;

    let database = match &args.database {
        Some(path) => path.clone(),
        None if config.is_in_memory_database() => {
            bail!("No database to check against: pass --database or set database.path in sme.yml")
        }
        None => config.database.path.clone(),
    };
    let database_path = project_root(global).join(&database);
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.database_timeout());

    let targets = if args.models.is_empty() {
        TargetSet::for_manifest(&manifest)
    } else {
        TargetSet::for_models(&manifest, |m| args.models.contains(&m.name))
    };

    let text = args.output == OutputFormat::Text;
    if text {
        println!(
            "Checking {} column(s) across {} table(s) in {}...",
            targets.len(),
            targets.tables().len(),
            database_path.display()
        );
    }

    let report = match DuckDbCatalog::open_read_only(&database_path) {
        Ok(catalog) => {
            DatabaseValidator::new(Arc::new(catalog), timeout)
                .with_options(config.validation_options())
                .validate(&targets)
                .await
        }
        Err(e) => {
            log::warn!("Could not open {}: {}", database_path.display(), e);
            DatabaseReport::from(e)
        }
    };

    match args.output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report),
    }

    if !report.valid {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Fail early on a `--model` that names nothing in the manifest
fn check_model_names(
    manifest: &Manifest,
    requested: &[String],
    options: &ValidationOptions,
) -> Result<()> {
    let known = manifest.semantic_models.iter().map(|m| m.name.as_str());
    for name in requested {
        if manifest.find_semantic_model(name).is_none() {
            match suggestion_for(name, known.clone(), options) {
                Some(hint) => bail!("Semantic model '{}' not found. {}", name, hint),
                None => bail!("Semantic model '{}' not found", name),
            }
        }
    }
    Ok(())
}

fn print_text(report: &DatabaseReport) {
    if !report.tables.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = report
            .tables
            .iter()
            .map(|t| {
                let columns: Vec<&_> = report
                    .columns
                    .iter()
                    .filter(|c| c.schema == t.schema && c.table == t.table)
                    .collect();
                let found = columns
                    .iter()
                    .filter(|c| c.status == LookupStatus::Exists)
                    .count();
                vec![
                    format!("{}.{}", t.schema, t.table),
                    t.status.to_string(),
                    format!("{}/{}", found, columns.len()),
                ]
            })
            .collect();
        print_table(&["TABLE", "STATUS", "COLUMNS FOUND"], &rows);
    }

    if !report.errors.is_empty() || !report.warnings.is_empty() {
        println!();
    }
    for issue in report.errors.iter().chain(report.warnings.iter()) {
        println!("{}", issue);
    }

    println!();
    let status = if report.valid { "passed" } else { "failed" };
    println!(
        "Database check {}: {} errors, {} warnings",
        status,
        report.error_count(),
        report.warning_count()
    );
    if report.incomplete {
        println!("Some lookups could not be completed; results are partial.");
    }
}
