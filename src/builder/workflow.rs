//! Fluent workflow construction

use crate::builder::job::JobBuilder;
use crate::core::{Concurrency, Result, Workflow, DEFAULT_WORKFLOW_NAME};
use serde_yaml::{Mapping, Value};

/// Builds a [`Workflow`]; jobs are configured through scoped closures
///
/// ```
/// use gha_generator::builder::WorkflowBuilder;
///
/// let workflow = WorkflowBuilder::new("CI")
///     .on("push", &["main".to_string()])
///     .job("test", |job| job.step(|s| s.run("make test")))
///     .build();
/// assert_eq!(workflow.jobs().len(), 1);
/// ```
#[derive(Debug)]
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_NAME)
    }
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            workflow: Workflow::new(name),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.workflow.set_name(name);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.workflow.description = Some(description.into());
        self
    }

    pub fn on(mut self, event: &str, branches: &[String]) -> Self {
        self.workflow.on(event, branches);
        self
    }

    pub fn schedule(mut self, cron: impl Into<String>) -> Self {
        self.workflow.schedule = Some(cron.into());
        self
    }

    pub fn concurrency(mut self, group: impl Into<String>, cancel_in_progress: bool) -> Self {
        self.workflow.concurrency = Some(Concurrency::new(group, cancel_in_progress));
        self
    }

    pub fn env(mut self, env: &Mapping) -> Self {
        for (key, value) in env {
            if let Some(key) = key.as_str() {
                self.workflow.set_env(key, value.clone());
            }
        }
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.workflow.set_env(key, value);
        self
    }

    pub fn permissions(mut self, permissions: Mapping) -> Self {
        self.workflow.permissions = permissions;
        self
    }

    /// Add a job configured by `configure` on a fresh builder for `id`
    pub fn job<F>(mut self, id: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(JobBuilder) -> JobBuilder,
    {
        let job = configure(JobBuilder::new(id)).build();
        self.workflow.add_job(job);
        self
    }

    /// Like [`WorkflowBuilder::job`] for configurators that can fail
    pub fn try_job<F>(mut self, id: impl Into<String>, configure: F) -> Result<Self>
    where
        F: FnOnce(JobBuilder) -> Result<JobBuilder>,
    {
        let job = configure(JobBuilder::new(id))?.build();
        self.workflow.add_job(job);
        Ok(self)
    }

    pub fn build(self) -> Workflow {
        self.workflow
    }
}
