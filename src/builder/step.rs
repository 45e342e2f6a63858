//! Fluent step construction

use crate::core::Step;
use serde_yaml::{Mapping, Value};

/// Builds a [`Step`] through chained calls
///
/// ```
/// use gha_generator::builder::StepBuilder;
///
/// let step = StepBuilder::new()
///     .name("Checkout")
///     .uses("actions/checkout@v4")
///     .build();
/// assert_eq!(step.uses.as_deref(), Some("actions/checkout@v4"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.step.name = Some(name.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.step.id = Some(id.into());
        self
    }

    pub fn uses(mut self, action: impl Into<String>) -> Self {
        self.step.uses = Some(action.into());
        self
    }

    /// Replace the action inputs
    pub fn with(mut self, with: Mapping) -> Self {
        self.step.with = with;
        self
    }

    /// Set a single action input
    pub fn input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.step.with.insert(Value::String(key.into()), value.into());
        self
    }

    pub fn run(mut self, command: impl Into<String>) -> Self {
        self.step.run = Some(command.into());
        self
    }

    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.step.shell = Some(shell.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.step.condition = Some(condition.into());
        self
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.step.continue_on_error = continue_on_error;
        self
    }

    /// Merge variables into the step environment
    pub fn env(mut self, env: &Mapping) -> Self {
        self.step.merge_env(env);
        self
    }

    pub fn env_var(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut env = Mapping::new();
        env.insert(Value::String(key.into()), value.into());
        self.env(&env)
    }

    pub fn working_directory(mut self, directory: impl Into<String>) -> Self {
        self.step.working_directory = Some(directory.into());
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}
