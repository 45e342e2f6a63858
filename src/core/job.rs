//! Job domain model

use crate::core::document::{merge_into, put, put_mapping, put_str, Document, Fields};
use crate::core::error::{Result, WorkflowError};
use crate::core::step::Step;
use serde_yaml::{Mapping, Value};

/// Runner used when none is configured
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Concurrency group shared by workflows and jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concurrency {
    pub group: String,
    pub cancel_in_progress: bool,
}

impl Concurrency {
    pub fn new(group: impl Into<String>, cancel_in_progress: bool) -> Self {
        Self {
            group: group.into(),
            cancel_in_progress,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        put(&mut doc, "group", self.group.as_str());
        put(&mut doc, "cancel-in-progress", self.cancel_in_progress);
        doc
    }

    /// `cancel-in-progress` defaults to true when absent
    pub fn from_document(doc: &Mapping, path: &str) -> Result<Self> {
        let fields = Fields::new(doc, path);
        let group = fields
            .string("group")?
            .ok_or_else(|| WorkflowError::invalid_field(fields.path_of("group"), "is required"))?;
        Ok(Self {
            group,
            cancel_in_progress: fields.bool("cancel-in-progress")?.unwrap_or(true),
        })
    }
}

/// A unit of work bound to a runner and composed of ordered steps
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: String,
    pub name: Option<String>,
    pub runs_on: String,
    pub environment: Option<String>,
    pub timeout_minutes: Option<u32>,
    pub continue_on_error: bool,
    pub concurrency: Option<Concurrency>,
    pub permissions: Mapping,
    /// Folded strategy (`fail-fast`, `matrix`, `max-parallel`)
    pub strategy: Mapping,
    /// Ids of jobs that must finish first; not checked against the workflow
    pub needs: Vec<String>,
    pub condition: Option<String>,
    pub defaults: Mapping,
    /// Service containers keyed by name
    pub services: Mapping,
    steps: Vec<Step>,
    env: Mapping,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_runner(id, DEFAULT_RUNNER)
    }

    pub fn with_runner(id: impl Into<String>, runs_on: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            runs_on: runs_on.into(),
            environment: None,
            timeout_minutes: None,
            continue_on_error: false,
            concurrency: None,
            permissions: Mapping::new(),
            strategy: Mapping::new(),
            needs: Vec::new(),
            condition: None,
            defaults: Mapping::new(),
            services: Mapping::new(),
            steps: Vec::new(),
            env: Mapping::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn add_service(&mut self, name: impl Into<String>, config: Mapping) {
        self.services.insert(Value::String(name.into()), Value::Mapping(config));
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.env.insert(Value::String(key.into()), value.into());
    }

    pub fn merge_env(&mut self, env: &Mapping) {
        merge_into(&mut self.env, env);
    }

    pub fn env(&self) -> &Mapping {
        &self.env
    }

    /// Serialize into canonical field order; `steps` is always present
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        put(&mut doc, "runs-on", self.runs_on.as_str());
        put_str(&mut doc, "name", self.name.as_deref());
        put_str(&mut doc, "environment", self.environment.as_deref());
        if let Some(minutes) = self.timeout_minutes.filter(|m| *m > 0) {
            put(&mut doc, "timeout-minutes", minutes);
        }
        if self.continue_on_error {
            put(&mut doc, "continue-on-error", true);
        }
        if let Some(concurrency) = &self.concurrency {
            put(&mut doc, "concurrency", concurrency.to_document());
        }
        put_mapping(&mut doc, "permissions", &self.permissions);
        put_mapping(&mut doc, "strategy", &self.strategy);
        if !self.needs.is_empty() {
            put(&mut doc, "needs", self.needs.clone());
        }
        put_str(&mut doc, "if", self.condition.as_deref());
        put_mapping(&mut doc, "defaults", &self.defaults);
        put_mapping(&mut doc, "services", &self.services);
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|step| Value::Mapping(step.to_document()))
            .collect();
        put(&mut doc, "steps", steps);
        put_mapping(&mut doc, "env", &self.env);
        doc
    }

    /// Rebuild a job from its serialized form
    pub fn from_document(id: &str, doc: &Mapping) -> Result<Self> {
        let path = format!("jobs.{}", id);
        let fields = Fields::new(doc, path.as_str());

        let runs_on = fields.string("runs-on")?.unwrap_or_else(|| DEFAULT_RUNNER.to_string());
        let mut job = Job::with_runner(id, runs_on);
        job.name = fields.string("name")?;
        job.environment = fields.string("environment")?;
        job.timeout_minutes = fields.u32("timeout-minutes")?;
        job.continue_on_error = fields.bool("continue-on-error")?.unwrap_or(false);
        if let Some(concurrency) = fields.mapping("concurrency")? {
            job.concurrency = Some(Concurrency::from_document(
                concurrency,
                &fields.path_of("concurrency"),
            )?);
        }
        if let Some(permissions) = fields.mapping("permissions")? {
            job.permissions = permissions.clone();
        }
        if let Some(strategy) = fields.mapping("strategy")? {
            job.strategy = strategy.clone();
        }
        job.needs = fields.strings("needs")?.unwrap_or_default();
        job.condition = fields.string("if")?;
        if let Some(defaults) = fields.mapping("defaults")? {
            job.defaults = defaults.clone();
        }
        if let Some(services) = fields.mapping("services")? {
            job.services = services.clone();
        }
        if let Some(steps) = fields.sequence("steps")? {
            for (index, step) in steps.iter().enumerate() {
                let step_path = format!("{}[{}]", fields.path_of("steps"), index);
                job.add_step(Step::from_value(step, &step_path)?);
            }
        }
        if let Some(env) = fields.mapping("env")? {
            job.merge_env(env);
        }
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_new_job_defaults() {
        let job = Job::new("test");
        assert_eq!(job.id(), "test");
        assert_eq!(job.runs_on, "ubuntu-latest");
        assert!(!job.continue_on_error);
        assert!(job.steps().is_empty());
    }

    #[test]
    fn test_minimal_job_emits_runs_on_and_empty_steps() {
        let doc = Job::new("test").to_document();
        assert_eq!(doc, mapping("runs-on: ubuntu-latest\nsteps: []\n"));
    }

    #[test]
    fn test_zero_timeout_is_omitted() {
        let mut job = Job::new("test");
        job.timeout_minutes = Some(0);
        assert!(!job.to_document().contains_key("timeout-minutes"));
    }

    #[test]
    fn test_job_field_order_is_canonical() {
        let mut job = Job::new("deploy");
        job.set_env("APP_ENV", "production");
        job.needs = vec!["test".to_string()];
        job.environment = Some("production".to_string());
        job.name = Some("Deploy".to_string());
        job.concurrency = Some(Concurrency::new("deploy", false));

        let keys: Vec<_> = job
            .to_document()
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect();
        assert_eq!(
            keys,
            vec!["runs-on", "name", "environment", "concurrency", "needs", "steps", "env"]
        );
    }

    #[test]
    fn test_from_document_roundtrip() {
        let doc = mapping(
            r#"
runs-on: ubuntu-22.04
name: Tests
timeout-minutes: 30
continue-on-error: true
concurrency:
  group: tests-${{ github.ref }}
  cancel-in-progress: false
permissions:
  contents: read
strategy:
  fail-fast: false
  matrix:
    php-version: ["8.2", "8.3"]
needs:
  - lint
if: github.event_name == 'push'
defaults:
  run:
    shell: bash
services:
  mysql:
    image: mysql:8.0
    ports:
      - 3306:3306
steps:
  - uses: actions/checkout@v4
  - run: php artisan test
env:
  DB_CONNECTION: mysql
"#,
        );
        let job = Job::from_document("tests", &doc).unwrap();
        assert_eq!(job.steps().len(), 2);
        assert_eq!(job.to_document(), doc);
    }

    #[test]
    fn test_concurrency_requires_group() {
        let doc = mapping("concurrency:\n  cancel-in-progress: true\n");
        let err = Job::from_document("build", &doc).unwrap_err();
        assert_eq!(err.to_string(), "Field 'jobs.build.concurrency.group' is required");
    }

    #[test]
    fn test_bad_step_shape_names_its_position() {
        let doc = mapping("steps:\n  - uses: actions/checkout@v4\n  - echo hi\n");
        let err = Job::from_document("build", &doc).unwrap_err();
        assert_eq!(err.to_string(), "Field 'jobs.build.steps[1]' must be a mapping");
    }
}
