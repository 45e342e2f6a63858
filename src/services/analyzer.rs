//! Project introspection from `composer.json` and the project tree
//!
//! The analysis only guesses sensible matrix defaults (PHP versions,
//! databases, tooling); every guess can be overridden from the CLI.

use crate::core::error::{Result, WorkflowError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Manifest file read from the project root
pub const MANIFEST_FILE: &str = "composer.json";

/// Versions used when the manifest does not pin PHP
pub const DEFAULT_PHP_VERSIONS: &[&str] = &["8.2", "8.3"];

fn caret_regex() -> &'static Regex {
    static CARET: OnceLock<Regex> = OnceLock::new();
    CARET.get_or_init(|| Regex::new(r"\^(\d+)\.(\d+)").expect("valid regex"))
}

fn tilde_regex() -> &'static Regex {
    static TILDE: OnceLock<Regex> = OnceLock::new();
    TILDE.get_or_init(|| Regex::new(r"~(\d+\.\d+)").expect("valid regex"))
}

/// Reads facts out of a Composer manifest
#[derive(Debug, Clone, Default)]
pub struct ComposerAnalyzer {
    manifest: Option<Value>,
}

impl ComposerAnalyzer {
    /// Load `<root>/composer.json`; a missing manifest yields an empty analyzer
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            debug!("No manifest at {}", path.display());
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| WorkflowError::resource(&path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            manifest: Some(serde_json::from_str(json)?),
        })
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest.is_some()
    }

    fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.manifest.as_ref()?.get(name)?.as_object()
    }

    fn requires(&self) -> Option<&Map<String, Value>> {
        self.section("require")
    }

    /// PHP versions to test against, derived from `require.php`
    ///
    /// `^X.Y` gives `X.Y` plus `X.(Y+1)` while `Y < 3`; `~X.Y` gives `X.Y`;
    /// anything else falls back to the defaults.
    pub fn php_versions(&self) -> Vec<String> {
        let constraint = self
            .requires()
            .and_then(|r| r.get("php"))
            .and_then(Value::as_str);
        match constraint {
            Some(constraint) => extract_php_versions(constraint),
            None => default_php_versions(),
        }
    }

    /// Databases implied by required packages
    pub fn databases(&self) -> Vec<String> {
        let Some(requires) = self.requires() else {
            return Vec::new();
        };
        let mut databases = Vec::new();
        if requires.contains_key("mysql/mysql-server") || requires.contains_key("doctrine/dbal") {
            databases.push("mysql".to_string());
        }
        let mentions_pgsql = requires
            .iter()
            .any(|(name, constraint)| name.contains("pgsql") || constraint.to_string().contains("pgsql"));
        if requires.contains_key("postgresql/postgresql") || mentions_pgsql {
            databases.push("postgres".to_string());
        }
        if requires.contains_key("doctrine/dbal") {
            databases.push("sqlite".to_string());
        }
        databases
    }

    /// Whether the package is in `require` or `require-dev`
    pub fn has_package(&self, package: &str) -> bool {
        ["require", "require-dev"]
            .iter()
            .any(|section| self.section(section).is_some_and(|s| s.contains_key(package)))
    }

    /// Constraint of `laravel/framework`
    pub fn laravel_version(&self) -> Option<String> {
        self.requires()?
            .get("laravel/framework")?
            .as_str()
            .map(str::to_string)
    }

    pub fn test_framework(&self) -> Option<String> {
        if self.has_package("phpunit/phpunit") {
            Some("phpunit".to_string())
        } else if self.has_package("pestphp/pest") {
            Some("pest".to_string())
        } else {
            None
        }
    }

    pub fn code_quality_tools(&self) -> Vec<String> {
        [
            ("phpstan/phpstan", "phpstan"),
            ("squizlabs/php_codesniffer", "phpcs"),
            ("nunomaduro/larastan", "larastan"),
            ("nunomaduro/phpinsights", "phpinsights"),
        ]
        .iter()
        .filter(|(package, _)| self.has_package(package))
        .map(|(_, tool)| tool.to_string())
        .collect()
    }
}

fn default_php_versions() -> Vec<String> {
    DEFAULT_PHP_VERSIONS.iter().map(|v| v.to_string()).collect()
}

fn extract_php_versions(constraint: &str) -> Vec<String> {
    if let Some(caps) = caret_regex().captures(constraint) {
        let major: u32 = caps[1].parse().unwrap_or(0);
        let minor: u32 = caps[2].parse().unwrap_or(0);
        let mut versions = vec![format!("{}.{}", major, minor)];
        if minor < 3 {
            versions.push(format!("{}.{}", major, minor + 1));
        }
        versions
    } else if let Some(caps) = tilde_regex().captures(constraint) {
        vec![caps[1].to_string()]
    } else {
        default_php_versions()
    }
}

/// Summary of a project used to parameterize presets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub php_versions: Vec<String>,
    pub databases: Vec<String>,
    pub has_redis: bool,
    pub has_queues: bool,
    pub test_framework: Option<String>,
    pub code_quality_tools: Vec<String>,
    pub laravel_version: Option<String>,
}

/// Combines the manifest with files found in the project tree
#[derive(Debug, Clone)]
pub struct ProjectAnalyzer {
    root: PathBuf,
    composer: ComposerAnalyzer,
}

impl ProjectAnalyzer {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let composer = ComposerAnalyzer::load(&root)?;
        Ok(Self { root, composer })
    }

    pub fn with_composer(root: impl Into<PathBuf>, composer: ComposerAnalyzer) -> Self {
        Self {
            root: root.into(),
            composer,
        }
    }

    pub fn composer(&self) -> &ComposerAnalyzer {
        &self.composer
    }

    pub fn analyze(&self) -> ProjectMetadata {
        let metadata = ProjectMetadata {
            php_versions: self.composer.php_versions(),
            databases: self.databases(),
            has_redis: self.composer.has_package("predis/predis")
                || self.composer.has_package("phpredis/phpredis"),
            has_queues: self.uses_queues(),
            test_framework: self.composer.test_framework(),
            code_quality_tools: self.composer.code_quality_tools(),
            laravel_version: self.composer.laravel_version(),
        };
        debug!("Project metadata: {:?}", metadata);
        metadata
    }

    /// Manifest databases, or the `DB_CONNECTION` of `.env` / `.env.example`
    pub fn databases(&self) -> Vec<String> {
        let databases = self.composer.databases();
        if !databases.is_empty() {
            return databases;
        }
        [".env", ".env.example"]
            .iter()
            .find_map(|file| env_connection(&self.root.join(file)))
            .and_then(|driver| match driver.as_str() {
                "mysql" => Some("mysql"),
                "pgsql" => Some("postgres"),
                "sqlite" => Some("sqlite"),
                _ => None,
            })
            .map(|db| vec![db.to_string()])
            .unwrap_or_default()
    }

    /// A `*_create_jobs_table.php` migration exists
    pub fn uses_queues(&self) -> bool {
        let migrations = self.root.join("database").join("migrations");
        let Ok(entries) = std::fs::read_dir(migrations) else {
            return false;
        };
        entries.flatten().any(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with("_create_jobs_table.php"))
        })
    }
}

/// `DB_CONNECTION` value of a dotenv file
fn env_connection(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix("DB_CONNECTION=")?;
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
