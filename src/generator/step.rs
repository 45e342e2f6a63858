use crate::builder::StepBuilder;
use crate::core::config::StepConfig;
use crate::core::Step;

/// Maps a step configuration onto a [`Step`]
///
/// Only keys present in the configuration are applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepGenerator;

impl StepGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, config: &StepConfig) -> Step {
        let mut builder = StepBuilder::new();
        if let Some(name) = &config.name {
            builder = builder.name(name);
        }
        if let Some(id) = &config.id {
            builder = builder.id(id);
        }
        if let Some(uses) = &config.uses {
            builder = builder.uses(uses);
        }
        if let Some(with) = &config.with {
            builder = builder.with(with.clone());
        }
        if let Some(run) = &config.run {
            builder = builder.run(run);
        }
        if let Some(shell) = &config.shell {
            builder = builder.shell(shell);
        }
        if let Some(condition) = &config.condition {
            builder = builder.condition(condition);
        }
        if let Some(continue_on_error) = config.continue_on_error {
            builder = builder.continue_on_error(continue_on_error);
        }
        if let Some(env) = &config.env {
            builder = builder.env(env);
        }
        if let Some(directory) = &config.working_directory {
            builder = builder.working_directory(directory);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    #[test]
    fn test_only_present_keys_are_emitted() {
        let config = StepConfig::action("Checkout", "actions/checkout@v4");
        let doc = StepGenerator::new().generate(&config).to_document();
        let expected: Mapping =
            serde_yaml::from_str("name: Checkout\nuses: actions/checkout@v4\n").unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_all_keys() {
        let config: StepConfig = serde_yaml::from_str(
            r#"
name: Build
id: build
run: |
  npm ci
  npm run build
shell: bash
if: success()
continue-on-error: true
env:
  NODE_ENV: production
working-directory: frontend
"#,
        )
        .unwrap();
        let step = StepGenerator::new().generate(&config);
        assert_eq!(step.working_directory.as_deref(), Some("frontend"));
        assert!(step.continue_on_error);
        assert_eq!(step.env().len(), 1);
        assert_eq!(step.run.as_deref(), Some("npm ci\nnpm run build\n"));
    }
}
