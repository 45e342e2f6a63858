//! Fluent job construction

use crate::builder::service::ServiceBuilder;
use crate::builder::step::StepBuilder;
use crate::builder::strategy::{StrategyBuilder, StrategyState};
use crate::core::{Concurrency, Job, Step};
use serde_yaml::{Mapping, Value};

/// Builds a [`Job`] through chained calls
#[derive(Debug)]
pub struct JobBuilder {
    job: Job,
    strategy: Option<StrategyState>,
}

impl JobBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            job: Job::new(id),
            strategy: None,
        }
    }

    pub fn with_runner(id: impl Into<String>, runs_on: impl Into<String>) -> Self {
        Self {
            job: Job::with_runner(id, runs_on),
            strategy: None,
        }
    }

    pub fn id(&self) -> &str {
        self.job.id()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.job.name = Some(name.into());
        self
    }

    pub fn runs_on(mut self, runner: impl Into<String>) -> Self {
        self.job.runs_on = runner.into();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.job.environment = Some(environment.into());
        self
    }

    pub fn timeout(mut self, minutes: u32) -> Self {
        self.job.timeout_minutes = Some(minutes);
        self
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.job.continue_on_error = continue_on_error;
        self
    }

    pub fn concurrency(mut self, group: impl Into<String>, cancel_in_progress: bool) -> Self {
        self.job.concurrency = Some(Concurrency::new(group, cancel_in_progress));
        self
    }

    pub fn permissions(mut self, permissions: Mapping) -> Self {
        self.job.permissions = permissions;
        self
    }

    /// Append job ids this job waits for
    pub fn needs<I, S>(mut self, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job.needs.extend(jobs.into_iter().map(Into::into));
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.job.condition = Some(condition.into());
        self
    }

    pub fn defaults(mut self, defaults: Mapping) -> Self {
        self.job.defaults = defaults;
        self
    }

    /// Enter the strategy sub-builder, creating its state on first use
    pub fn strategy(mut self) -> StrategyBuilder {
        let state = self.strategy.take().unwrap_or_default();
        StrategyBuilder::new(self, state)
    }

    pub(crate) fn set_strategy(&mut self, state: StrategyState) {
        self.job.strategy = state.to_mapping();
        self.strategy = Some(state);
    }

    /// Configure a named service container
    pub fn service<F>(mut self, name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(ServiceBuilder) -> ServiceBuilder,
    {
        let service = configure(ServiceBuilder::new(name));
        let name = service.name().to_string();
        self.job.add_service(name, service.build());
        self
    }

    /// Configure and append a step
    pub fn step<F>(self, configure: F) -> Self
    where
        F: FnOnce(StepBuilder) -> StepBuilder,
    {
        self.add_step(configure(StepBuilder::new()).build())
    }

    pub fn add_step(mut self, step: Step) -> Self {
        self.job.add_step(step);
        self
    }

    /// Merge variables into the job environment
    pub fn env(mut self, env: &Mapping) -> Self {
        self.job.merge_env(env);
        self
    }

    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.job.set_env(key, value);
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_composes_job() {
        let job = JobBuilder::new("tests")
            .name("Tests")
            .timeout(20)
            .needs(["lint"])
            .service("redis", |s| s.image("redis:7").port("6379:6379"))
            .step(|s| s.name("Checkout").uses("actions/checkout@v4"))
            .step(|s| s.name("Test").run("vendor/bin/phpunit"))
            .env_var("APP_ENV", "testing")
            .build();

        assert_eq!(job.id(), "tests");
        assert_eq!(job.timeout_minutes, Some(20));
        assert_eq!(job.needs, vec!["lint"]);
        assert!(job.services.contains_key("redis"));
        assert_eq!(job.steps().len(), 2);
        assert_eq!(job.steps()[1].run.as_deref(), Some("vendor/bin/phpunit"));
    }

    #[test]
    fn test_no_strategy_leaves_mapping_empty() {
        let job = JobBuilder::new("lint").build();
        assert!(job.strategy.is_empty());
        assert!(!job.to_document().contains_key("strategy"));
    }

    #[test]
    fn test_canonical_order_ignores_call_order() {
        let first = JobBuilder::new("deploy")
            .env_var("A", "1")
            .condition("github.ref == 'refs/heads/main'")
            .name("Deploy")
            .build();
        let second = JobBuilder::new("deploy")
            .name("Deploy")
            .condition("github.ref == 'refs/heads/main'")
            .env_var("A", "1")
            .build();
        assert_eq!(
            serde_yaml::to_string(&first.to_document()).unwrap(),
            serde_yaml::to_string(&second.to_document()).unwrap()
        );
    }
}
