//! Validate command implementation

use crate::cli::{GlobalArgs, OutputFormat, ValidateArgs};
use crate::commands::common::{load_config, load_manifest, print_json, ExitCode};
use anyhow::Result;
use sme_core::{EditorSession, ErrorCode, FieldPath, ValidationError, ValidationReport};

/// Execute the validate command
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;

    let outcome = match load_manifest(&args.file) {
        Ok(outcome) => outcome,
        Err(err) if args.output == OutputFormat::Json => {
            // A document that cannot be imported is still reported as data
            let report = ValidationReport::from_issues([ValidationError::error(
                ErrorCode::InvalidDocument,
                format!("{:#}", err),
                &FieldPath::root(),
            )]);
            print_json(&report)?;
            return Err(ExitCode(1).into());
        }
        Err(err) => return Err(err),
    };

    let text = args.output == OutputFormat::Text;
    if text {
        println!("Validating manifest: {}\n", args.file.display());
    }

    let mut report = ValidationReport::from_issues(outcome.warnings);
    let mut session =
        EditorSession::from_manifest(outcome.manifest).with_options(config.validation_options());

    let checked = if let Some(name) = &args.model {
        report.merge(session.validate_model(name)?);
        format!("semantic model '{}'", name)
    } else if let Some(name) = &args.metric {
        report.merge(session.validate_metric(name)?);
        format!("metric '{}'", name)
    } else {
        report.merge(session.validate_all());
        format!(
            "{} semantic model(s) and {} metric(s)",
            session.semantic_models().len(),
            session.metrics().len()
        )
    };

    match args.output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report, &checked, args.strict),
    }

    if failed(&report, args.strict) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Errors always fail; warnings fail only in strict mode
fn failed(report: &ValidationReport, strict: bool) -> bool {
    report.error_count() > 0 || (strict && report.warning_count() > 0)
}

fn print_text(report: &ValidationReport, checked: &str, strict: bool) {
    let mark = if report.valid { "✓" } else { "✗" };
    println!("Checking {}... {}", checked, mark);

    if !report.errors.is_empty() || !report.warnings.is_empty() {
        println!();
    }
    for issue in report.errors.iter().chain(report.warnings.iter()) {
        println!("{}", issue);
    }

    let error_count = report.error_count();
    let warning_count = report.warning_count();
    println!();
    if !failed(report, strict) {
        println!(
            "Validation passed: {} errors, {} warnings",
            error_count, warning_count
        );
    } else if error_count == 0 {
        println!(
            "Validation failed (strict mode): {} errors, {} warnings",
            error_count, warning_count
        );
    } else {
        println!(
            "Validation failed: {} errors, {} warnings",
            error_count, warning_count
        );
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
