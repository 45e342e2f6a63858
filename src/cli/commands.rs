//! CLI command definitions

use crate::generator::Preset;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Generate a workflow
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Preset to use (asked for when omitted)
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Regenerate from a saved configuration
    #[arg(long, value_name = "NAME", conflicts_with_all = ["preset", "template"])]
    pub saved: Option<String>,

    /// Render a template (`<category>/<name>`) instead of a preset
    #[arg(long, value_name = "TEMPLATE", conflicts_with = "preset")]
    pub template: Option<String>,

    /// Branches that trigger the workflow
    #[arg(long, value_delimiter = ',')]
    pub branches: Vec<String>,

    /// PHP versions of the test matrix
    #[arg(long, value_delimiter = ',')]
    pub php_versions: Vec<String>,

    /// Workflow name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Merge into an existing workflow file instead of replacing it
    #[arg(long)]
    pub merge: bool,

    /// Show whether the file changes before writing it
    #[arg(long)]
    pub diff: bool,

    /// Back up the existing file before replacing it
    #[arg(long)]
    pub backup: bool,

    /// Never prompt; use defaults for anything not given
    #[arg(long)]
    pub no_interaction: bool,

    /// Print the configuration before generating
    #[arg(long)]
    pub debug: bool,

    /// Save the configuration under this name
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Project directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// Validate a workflow file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Workflow file (defaults to `<workflows_path>/test.yml`)
    pub file: Option<PathBuf>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

/// List workflow templates
#[derive(Debug, Args, Clone)]
pub struct ListTemplatesCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Project directory the templates path is relative to
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// Generate workflows from an audit report
#[derive(Debug, Args, Clone)]
pub struct GenerateFromAuditCommand {
    /// Audit report (JSON)
    #[arg(default_value = "audit-report.json")]
    pub file: PathBuf,

    /// Output directory (defaults to the workflows path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Saved configuration management
#[derive(Debug, Subcommand, Clone)]
pub enum ConfigsCommand {
    /// List saved configurations
    List,

    /// Print a saved configuration
    Show { name: String },

    /// Delete a saved configuration
    Delete { name: String },
}
