//! Ready-made job configurations for common Laravel pipelines

use crate::core::config::{JobConfig, OneOrMany, StepConfig, StrategyConfig, TriggersConfig, WorkflowConfig};
use crate::core::document::put;
use crate::core::DEFAULT_RUNNER;
use crate::services::ProjectMetadata;
use indexmap::IndexMap;
use serde_yaml::Mapping;

const PHP_VERSION_EXPR: &str = "${{ matrix.php-version }}";

/// Workflow presets offered by `generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Testing,
    CodeQuality,
    Security,
    Deployment,
    Documentation,
    Performance,
    /// Starts from the testing pipeline
    Custom,
}

/// Inputs shared by every preset
#[derive(Debug, Clone)]
pub struct PresetContext<'a> {
    pub php_versions: &'a [String],
    pub extensions: &'a [String],
    pub runner: &'a str,
    pub metadata: &'a ProjectMetadata,
}

impl<'a> PresetContext<'a> {
    pub fn new(php_versions: &'a [String], metadata: &'a ProjectMetadata) -> Self {
        Self {
            php_versions,
            extensions: &[],
            runner: DEFAULT_RUNNER,
            metadata,
        }
    }
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Testing,
        Preset::CodeQuality,
        Preset::Security,
        Preset::Deployment,
        Preset::Documentation,
        Preset::Performance,
        Preset::Custom,
    ];

    /// Command-line name
    pub fn key(&self) -> &'static str {
        match self {
            Preset::Testing => "testing",
            Preset::CodeQuality => "code-quality",
            Preset::Security => "security",
            Preset::Deployment => "deployment",
            Preset::Documentation => "documentation",
            Preset::Performance => "performance",
            Preset::Custom => "custom",
        }
    }

    /// Human-readable title, shown in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Preset::Testing => "Testing Pipeline",
            Preset::CodeQuality => "Code Quality",
            Preset::Security => "Security Scan",
            Preset::Deployment => "Deployment",
            Preset::Documentation => "Documentation",
            Preset::Performance => "Performance",
            Preset::Custom => "Custom",
        }
    }

    /// Jobs of this preset keyed by id
    pub fn jobs(&self, ctx: &PresetContext<'_>) -> IndexMap<String, JobConfig> {
        let (id, job) = match self {
            Preset::Testing | Preset::Custom => ("test", testing_job(ctx)),
            Preset::CodeQuality => ("code-quality", code_quality_job(ctx)),
            Preset::Security => ("security", security_job(ctx)),
            Preset::Deployment => ("deploy", deployment_job(ctx)),
            Preset::Documentation => ("docs", documentation_job(ctx)),
            Preset::Performance => ("performance", performance_job(ctx)),
        };
        let mut jobs = IndexMap::new();
        jobs.insert(id.to_string(), job);
        jobs
    }

    /// Full configuration triggered on push and pull requests to `branches`
    pub fn workflow_config(&self, name: &str, branches: &[String], ctx: &PresetContext<'_>) -> WorkflowConfig {
        WorkflowConfig {
            name: Some(name.to_string()),
            on: Some(push_and_pull_request(branches)),
            jobs: Some(self.jobs(ctx)),
            ..WorkflowConfig::default()
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// `push` and `pull_request` on the same branches
pub fn push_and_pull_request(branches: &[String]) -> TriggersConfig {
    let mut on = Mapping::new();
    for event in ["push", "pull_request"] {
        let mut config = Mapping::new();
        put(&mut config, "branches", branches.to_vec());
        put(&mut on, event, config);
    }
    TriggersConfig::Detailed(on)
}

fn job(ctx: &PresetContext<'_>, steps: Vec<StepConfig>) -> JobConfig {
    JobConfig {
        runs_on: Some(ctx.runner.to_string()),
        steps: Some(steps),
        ..JobConfig::default()
    }
}

fn php_matrix(ctx: &PresetContext<'_>) -> Mapping {
    let mut matrix = Mapping::new();
    put(&mut matrix, "php-version", ctx.php_versions.to_vec());
    matrix
}

fn checkout() -> StepConfig {
    StepConfig::action("Checkout", "actions/checkout@v4")
}

fn extensions(ctx: &PresetContext<'_>) -> String {
    if ctx.extensions.is_empty() {
        "pdo,json,bcmath".to_string()
    } else {
        ctx.extensions.join(",")
    }
}

fn testing_job(ctx: &PresetContext<'_>) -> JobConfig {
    let mut matrix = php_matrix(ctx);
    if !ctx.metadata.databases.is_empty() {
        put(&mut matrix, "database", ctx.metadata.databases.clone());
    }
    let extensions = extensions(ctx);

    JobConfig {
        strategy: Some(StrategyConfig {
            fail_fast: Some(false),
            matrix: Some(matrix),
            max_parallel: None,
        }),
        ..job(
            ctx,
            vec![
                checkout(),
                StepConfig::action("Setup PHP", "shivammathur/setup-php@v2").with_inputs(&[
                    ("php-version", PHP_VERSION_EXPR),
                    ("extensions", extensions.as_str()),
                    ("tools", "composer:v2"),
                ]),
                StepConfig::action("Cache dependencies", "actions/cache@v3").with_inputs(&[
                    ("path", "vendor\n~/.composer/cache"),
                    (
                        "key",
                        "${{ runner.os }}-php-${{ matrix.php-version }}-composer-${{ hashFiles('**/composer.lock') }}",
                    ),
                ]),
                StepConfig::script("Install dependencies", "composer install --prefer-dist --no-interaction"),
                StepConfig::script("Copy .env.example", "cp .env.example .env"),
                StepConfig::script("Generate key", "php artisan key:generate"),
                StepConfig::script("Run migrations", "php artisan migrate --force"),
                StepConfig::script("Run tests", "php artisan test"),
            ],
        )
    }
}

fn code_quality_job(ctx: &PresetContext<'_>) -> JobConfig {
    JobConfig {
        strategy: Some(StrategyConfig {
            matrix: Some(php_matrix(ctx)),
            ..StrategyConfig::default()
        }),
        ..job(
            ctx,
            vec![
                checkout(),
                StepConfig::action("Setup PHP", "shivammathur/setup-php@v2")
                    .with_inputs(&[("php-version", PHP_VERSION_EXPR)]),
                StepConfig::script("Install dependencies", "composer install --prefer-dist"),
                StepConfig::script("Run PHPStan", "vendor/bin/phpstan analyse"),
                StepConfig::script("Run PHPCS", "vendor/bin/phpcs"),
            ],
        )
    }
}

fn security_job(ctx: &PresetContext<'_>) -> JobConfig {
    job(
        ctx,
        vec![
            checkout(),
            StepConfig::script("Composer audit", "composer audit"),
            StepConfig::script(
                "Security check",
                "composer require --dev roave/security-advisories:dev-latest",
            ),
        ],
    )
}

fn deployment_job(ctx: &PresetContext<'_>) -> JobConfig {
    JobConfig {
        environment: Some("production".to_string()),
        needs: Some(OneOrMany::Many(vec!["test".to_string()])),
        ..job(
            ctx,
            vec![
                checkout(),
                StepConfig::script("Deploy", "echo \"Deploy script here\""),
            ],
        )
    }
}

fn documentation_job(ctx: &PresetContext<'_>) -> JobConfig {
    job(
        ctx,
        vec![
            checkout(),
            StepConfig::script("Generate docs", "echo \"Generate documentation\""),
        ],
    )
}

fn performance_job(ctx: &PresetContext<'_>) -> JobConfig {
    job(
        ctx,
        vec![
            checkout(),
            StepConfig::script("Performance test", "echo \"Performance tests\""),
        ],
    )
}
