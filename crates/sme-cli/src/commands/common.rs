//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use sme_core::{import_manifest_file, Config, ImportOutcome};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing user-facing to print
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// The project directory from global CLI arguments
pub(crate) fn project_root(global: &GlobalArgs) -> PathBuf {
    PathBuf::from(&global.project_dir)
}

/// Load `--config` when given, otherwise sme.yml from the project directory,
/// falling back to defaults when there is none
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(Path::new(path)).context("Failed to load config"),
        None => Config::load_or_default(&project_root(global)).context("Failed to load config"),
    }
}

/// Import a manifest file, logging each import warning
pub(crate) fn load_manifest(path: &Path) -> Result<ImportOutcome> {
    let outcome = import_manifest_file(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    for warning in &outcome.warnings {
        log::debug!("{}", warning);
    }
    Ok(outcome)
}

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize results")?;
    println!("{}", json);
    Ok(())
}

/// Write `content` to `path`, creating parent directories
pub(crate) fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Print the text to stdout, or write it to `out` when given
pub(crate) fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            write_output(path, content)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Format a left-aligned table: header row, dashed separator, then data
/// rows, columns separated by two spaces
pub(crate) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    out.push_str(&line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.clone()));
        out.push('\n');
    }
    out
}

/// Print a formatted table to stdout.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", format_table(headers, rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let widths = calculate_column_widths(
            &["NAME", "KIND"],
            &[vec!["us_employment".into(), "model".into()]],
        );
        assert_eq!(widths, vec![13, 5]);
    }

    #[test]
    fn test_format_table() {
        let table = format_table(
            &["NAME", "KIND"],
            &[
                vec!["orders".into(), "model".into()],
                vec!["revenue".into(), "metric".into()],
            ],
        );
        assert_eq!(
            table,
            "NAME     KIND\n-------  ------\norders   model\nrevenue  metric\n"
        );
    }

    #[test]
    fn test_exit_code_displays_nothing() {
        assert_eq!(ExitCode(1).to_string(), "");
    }
}
