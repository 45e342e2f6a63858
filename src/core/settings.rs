//! Tool settings
//!
//! Settings are read from an optional YAML file (`--config`), fall back to
//! built-in defaults for every missing key, and accept a couple of
//! environment overrides for git behaviour.

use crate::core::error::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable forcing `git.auto_commit`
pub const AUTO_COMMIT_ENV: &str = "GA_AUTO_COMMIT";

/// Environment variable forcing `git.auto_push`
pub const AUTO_PUSH_ENV: &str = "GA_AUTO_PUSH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory generated workflows are written to
    pub workflows_path: PathBuf,

    /// Root of `<category>/<name>.template` files
    pub templates_path: PathBuf,

    /// Where previous versions are copied before an overwrite
    pub backups_path: PathBuf,

    /// Saved configurations; the local data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configs_path: Option<PathBuf>,

    pub defaults: DefaultSettings,
    pub git: GitSettings,
    pub validation: ValidationSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub runner: String,
    pub php_versions: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub auto_commit: bool,
    /// `{name}` is replaced by the workflow name
    pub commit_message: String,
    pub auto_push: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub enabled: bool,
    /// Treat warnings as failures
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    pub auto_detect: bool,
    pub generate_instructions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workflows_path: PathBuf::from(".github/workflows"),
            templates_path: PathBuf::from("resources/templates"),
            backups_path: PathBuf::from(".github/workflows/.backups"),
            configs_path: None,
            defaults: DefaultSettings::default(),
            git: GitSettings::default(),
            validation: ValidationSettings::default(),
            secrets: SecretSettings::default(),
        }
    }
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            runner: crate::core::job::DEFAULT_RUNNER.to_string(),
            php_versions: vec!["8.2".to_string(), "8.3".to_string()],
            extensions: vec!["pdo".to_string(), "json".to_string(), "bcmath".to_string()],
        }
    }
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            auto_commit: false,
            commit_message: "chore: generate GitHub Actions workflow".to_string(),
            auto_push: false,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strict: false,
        }
    }
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            auto_detect: true,
            generate_instructions: true,
        }
    }
}

impl Settings {
    /// Load settings from `path` (or defaults) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `GA_AUTO_COMMIT` / `GA_AUTO_PUSH` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(AUTO_COMMIT_ENV).and_then(|v| parse_flag(&v)) {
            self.git.auto_commit = value;
        }
        if let Some(value) = lookup(AUTO_PUSH_ENV).and_then(|v| parse_flag(&v)) {
            self.git.auto_push = value;
        }
    }

    /// Template root for a project; relative paths resolve against `root`
    pub fn templates_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.templates_path)
    }

    /// Commit message for a workflow
    pub fn commit_message(&self, workflow_name: &str) -> String {
        self.git.commit_message.replace("{name}", workflow_name)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
