//! Workflows derived from an audit report
//!
//! A report is `{"findings": [{"severity": ..., "category": ...}, ...]}`;
//! any other keys are ignored.

use crate::core::config::{JobConfig, StepConfig, TriggersConfig, WorkflowConfig};
use crate::core::document::put;
use crate::core::error::{Result, WorkflowError};
use crate::core::DEFAULT_RUNNER;
use crate::generator::presets::push_and_pull_request;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Mapping;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl AuditReport {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn has_critical(&self) -> bool {
        self.findings.iter().any(|f| f.severity.as_deref() == Some("critical"))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.findings.iter().any(|f| f.category.as_deref() == Some(category))
    }

    /// Security, performance and code-quality workflows, in that order, for
    /// the findings present
    pub fn workflow_configs(&self) -> Vec<WorkflowConfig> {
        let main = vec!["main".to_string()];
        let mut configs = Vec::new();

        if self.has_critical() {
            configs.push(config(
                "Security Scan",
                push_and_pull_request(&main),
                "security",
                vec![
                    StepConfig::action("Checkout", "actions/checkout@v4"),
                    StepConfig::script("Composer audit", "composer audit"),
                ],
            ));
        }
        if self.has_category("performance") {
            let mut push = Mapping::new();
            put(&mut push, "branches", main.clone());
            let mut on = Mapping::new();
            put(&mut on, "push", push);
            configs.push(config(
                "Performance Tests",
                TriggersConfig::Detailed(on),
                "performance",
                vec![
                    StepConfig::action("Checkout", "actions/checkout@v4"),
                    StepConfig::script("Performance test", "echo \"Performance tests\""),
                ],
            ));
        }
        if self.has_category("quality") {
            configs.push(config(
                "Code Quality",
                push_and_pull_request(&main),
                "quality",
                vec![
                    StepConfig::action("Checkout", "actions/checkout@v4"),
                    StepConfig::script("Install dependencies", "composer install"),
                    StepConfig::script("Run PHPStan", "vendor/bin/phpstan analyse"),
                ],
            ));
        }
        configs
    }
}

fn config(name: &str, on: TriggersConfig, job_id: &str, steps: Vec<StepConfig>) -> WorkflowConfig {
    let mut jobs = IndexMap::new();
    jobs.insert(
        job_id.to_string(),
        JobConfig {
            runs_on: Some(DEFAULT_RUNNER.to_string()),
            steps: Some(steps),
            ..JobConfig::default()
        },
    );
    WorkflowConfig {
        name: Some(name.to_string()),
        on: Some(on),
        jobs: Some(jobs),
        ..WorkflowConfig::default()
    }
}
