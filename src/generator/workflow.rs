use crate::builder::WorkflowBuilder;
use crate::core::config::{TriggersConfig, WorkflowConfig};
use crate::core::document::{scalar_to_string, Fields};
use crate::core::error::{Result, WorkflowError};
use crate::core::{Workflow, DEFAULT_CRON, DEFAULT_WORKFLOW_NAME};
use crate::generator::JobGenerator;
use crate::services::TemplateRenderer;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info};

/// Root entry point: configuration to [`Workflow`]
#[derive(Debug, Clone)]
pub struct WorkflowGenerator<R> {
    renderer: R,
    jobs: JobGenerator,
}

impl<R: TemplateRenderer> WorkflowGenerator<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            jobs: JobGenerator::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn generate(&self, config: &WorkflowConfig) -> Result<Workflow> {
        let name = config.name.as_deref().unwrap_or(DEFAULT_WORKFLOW_NAME);
        debug!("Generating workflow '{}'", name);
        let mut builder = WorkflowBuilder::new(name);

        if let Some(description) = &config.description {
            builder = builder.description(description);
        }
        if let Some(on) = &config.on {
            builder = apply_triggers(builder, on)?;
        }
        if let Some(concurrency) = &config.concurrency {
            builder = builder.concurrency(
                &concurrency.group,
                concurrency.cancel_in_progress.unwrap_or(true),
            );
        }
        if let Some(env) = &config.env {
            builder = builder.env(env);
        }
        if let Some(permissions) = &config.permissions {
            builder = builder.permissions(permissions.clone());
        }
        if let Some(jobs) = &config.jobs {
            for (id, job) in jobs {
                builder = builder.try_job(id, |b| self.jobs.configure(b, job))?;
            }
        }

        let workflow = builder.build();
        info!("Generated workflow '{}' with {} job(s)", workflow.name(), workflow.jobs().len());
        Ok(workflow)
    }

    /// Parse YAML configuration text, then generate
    pub fn generate_from_yaml(&self, yaml: &str) -> Result<Workflow> {
        self.generate(&WorkflowConfig::from_yaml(yaml)?)
    }

    /// Interpret an already parsed mapping as configuration, then generate
    pub fn generate_from_value(&self, value: Value) -> Result<Workflow> {
        self.generate(&WorkflowConfig::from_value(value)?)
    }

    /// Render a template file and generate from the resulting YAML
    pub fn generate_from_template(&self, template: &Path, data: &serde_json::Value) -> Result<Workflow> {
        let yaml = self.renderer.render_file(template, data)?;
        self.generate_from_yaml(&yaml)
    }
}

fn apply_triggers(mut builder: WorkflowBuilder, on: &TriggersConfig) -> Result<WorkflowBuilder> {
    match on {
        TriggersConfig::Event(event) => Ok(builder.on(event, &[])),
        TriggersConfig::Events(events) => {
            for event in events {
                builder = builder.on(event, &[]);
            }
            Ok(builder)
        }
        TriggersConfig::Detailed(events) => {
            for (event, config) in events {
                let event = scalar_to_string(event)
                    .ok_or_else(|| WorkflowError::invalid_field("on", "event names must be strings"))?;
                if event == "schedule" {
                    builder = builder.schedule(schedule_cron(config)?);
                } else {
                    builder = builder.on(&event, &event_branches(&event, config)?);
                }
            }
            Ok(builder)
        }
    }
}

/// `cron` of the first schedule entry; later entries are ignored
fn schedule_cron(config: &Value) -> Result<String> {
    let first = match config {
        Value::Sequence(entries) => entries.first(),
        Value::Null => None,
        _ => return Err(WorkflowError::invalid_field("on.schedule", "must be a sequence")),
    };
    let cron = match first {
        Some(Value::Mapping(entry)) => Fields::new(entry, "on.schedule[0]").string("cron")?,
        Some(_) => return Err(WorkflowError::invalid_field("on.schedule[0]", "must be a mapping")),
        None => None,
    };
    Ok(cron.unwrap_or_else(|| DEFAULT_CRON.to_string()))
}

fn event_branches(event: &str, config: &Value) -> Result<Vec<String>> {
    match config {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(config) => Ok(branches(config, event)?.unwrap_or_default()),
        _ => Err(WorkflowError::invalid_field(format!("on.{}", event), "must be a mapping")),
    }
}

fn branches(config: &Mapping, event: &str) -> Result<Option<Vec<String>>> {
    Fields::new(config, format!("on.{}", event)).strings("branches")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TemplateEngine;
    use serde_json::json;

    fn generator() -> WorkflowGenerator<TemplateEngine> {
        WorkflowGenerator::new(TemplateEngine::new("resources/templates"))
    }

    #[test]
    fn test_name_defaults_to_workflow() {
        let workflow = generator().generate(&WorkflowConfig::default()).unwrap();
        assert_eq!(workflow.name(), "workflow");
        assert_eq!(workflow.filename(), "workflow.yml");
    }

    #[test]
    fn test_schedule_survives_generation() {
        let workflow = generator()
            .generate_from_yaml("on:\n  schedule:\n    - cron: \"0 0 * * *\"\n")
            .unwrap();
        let doc = workflow.to_document();
        let expected: Value = serde_yaml::from_str("schedule:\n  - cron: \"0 0 * * *\"\n").unwrap();
        assert_eq!(doc.get("on"), Some(&expected));
    }

    #[test]
    fn test_schedule_without_cron_uses_default() {
        let workflow = generator()
            .generate_from_yaml("on:\n  schedule:\n    - {}\n")
            .unwrap();
        assert_eq!(workflow.schedule.as_deref(), Some(DEFAULT_CRON));
    }

    #[test]
    fn test_event_shorthands() {
        let workflow = generator().generate_from_yaml("on: [push, workflow_dispatch]\n").unwrap();
        let events: Vec<_> = workflow.triggers().keys().filter_map(Value::as_str).collect();
        assert_eq!(events, vec!["push", "workflow_dispatch"]);
    }

    #[test]
    fn test_schedule_shorthand_round_trips() {
        for yaml in ["on: schedule\n", "on: [push, schedule]\n"] {
            let workflow = generator().generate_from_yaml(yaml).unwrap();
            assert_eq!(workflow.schedule.as_deref(), Some(DEFAULT_CRON));
            assert!(!workflow.triggers().contains_key("schedule"));

            let reparsed = Workflow::from_json(&workflow.to_json().unwrap()).unwrap();
            assert_eq!(reparsed, workflow);
        }
    }

    #[test]
    fn test_event_config_keeps_branches_only() {
        let workflow = generator()
            .generate_from_yaml("on:\n  push:\n    branches: main\n  pull_request:\n")
            .unwrap();
        let expected: Mapping =
            serde_yaml::from_str("push:\n  branches: [main]\npull_request: {}\n").unwrap();
        assert_eq!(workflow.triggers(), &expected);
    }

    #[test]
    fn test_schema_errors_are_parse_errors() {
        let err = generator().generate_from_yaml("jobs:\n  test:\n    runs_on: x\n").unwrap_err();
        assert!(matches!(err, WorkflowError::Parse(_)));
    }

    #[test]
    fn test_generate_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("testing.template");
        std::fs::write(
            &template,
            "name: {{ name }}\non:\n  push:\n    branches: [{{ branches }}]\njobs:\n  test:\n    steps:\n      - run: echo ${{ github.sha }}\n",
        )
        .unwrap();

        let workflow = generator()
            .generate_from_template(&template, &json!({"name": "Tests", "branches": ["main", "develop"]}))
            .unwrap();
        assert_eq!(workflow.name(), "Tests");
        let step = &workflow.job("test").unwrap().steps()[0];
        assert_eq!(step.run.as_deref(), Some("echo ${{ github.sha }}"));
        let push = workflow.triggers().get("push").and_then(Value::as_mapping).unwrap();
        assert_eq!(push.get("branches").and_then(Value::as_sequence).map(Vec::len), Some(2));
    }
}
