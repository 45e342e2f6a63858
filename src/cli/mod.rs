//! Command-line interface

pub mod commands;
pub mod output;
pub mod prompt;

use clap::{Parser, Subcommand};
use commands::{
    ConfigsCommand, GenerateCommand, GenerateFromAuditCommand, ListTemplatesCommand,
    ValidateCommand,
};
use std::ffi::OsString;
use std::path::PathBuf;

/// GitHub Actions workflow generator
#[derive(Debug, Parser, Clone)]
#[command(name = "gha")]
#[command(version)]
#[command(about = "Generate, validate and maintain GitHub Actions workflows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a workflow from a preset, a saved configuration or a template
    Generate(GenerateCommand),

    /// Validate a workflow file
    Validate(ValidateCommand),

    /// List available workflow templates
    ListTemplates(ListTemplatesCommand),

    /// Generate workflows from an audit report
    GenerateFromAudit(GenerateFromAuditCommand),

    /// Manage saved configurations
    #[command(subcommand)]
    Configs(ConfigsCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
