//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sme - validate, check and export MetricFlow semantic manifests
#[derive(Parser, Debug)]
#[command(name = "sme")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a semantic_manifest.json (structure and references)
    Validate(ValidateArgs),

    /// Check that expression columns exist in the database
    CheckDb(CheckDbArgs),

    /// Export the canonical manifest with defaults and validation status
    Export(ExportArgs),

    /// Save, load, list and delete named manifest versions
    Versions(VersionsArgs),

    /// List semantic models and metrics
    Ls(LsArgs),
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// JSON report
    Json,
}

/// Listing output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutput {
    /// Aligned table
    Table,
    /// JSON array
    Json,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest file to validate
    pub file: PathBuf,

    /// Validate only this semantic model (structural checks)
    #[arg(short, long, conflicts_with = "metric")]
    pub model: Option<String>,

    /// Validate only this metric (structural checks and measure references)
    #[arg(long)]
    pub metric: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the check-db command
#[derive(Args, Debug)]
pub struct CheckDbArgs {
    /// Manifest file whose expressions are checked
    pub file: PathBuf,

    /// Semantic models to check (repeatable, default: all)
    #[arg(short, long = "model")]
    pub models: Vec<String>,

    /// DuckDB database file (overrides database.path)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Per-table lookup timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Manifest file to export
    pub file: PathBuf,

    /// Write to this path instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the versions command
#[derive(Args, Debug)]
pub struct VersionsArgs {
    #[command(subcommand)]
    pub command: VersionsCommand,
}

/// Version store operations
#[derive(Subcommand, Debug)]
pub enum VersionsCommand {
    /// Save a manifest file under a name, replacing any existing version
    Save {
        /// Version name ([A-Za-z0-9_-]+)
        name: String,
        /// Manifest file to save
        file: PathBuf,
    },

    /// Export a saved version
    Load {
        /// Version name
        name: String,
        /// Write to this path instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List saved versions
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: ListOutput,
    },

    /// Delete a saved version
    Delete {
        /// Version name
        name: String,
    },
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Manifest file to list
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ListOutput,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
