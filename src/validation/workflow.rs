use crate::core::document::scalar_to_string;
use crate::core::Workflow;
use crate::validation::YamlValidator;
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Structural checks of a workflow
///
/// Problems are split into errors, which make validation fail, and
/// warnings, which are only reported. Both lists are reset at the start of
/// every validation.
#[derive(Debug, Default, Clone)]
pub struct WorkflowValidator {
    yaml: YamlValidator,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl WorkflowValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Validate a model: its serialized text must parse, then the structure is checked
    pub fn validate(&mut self, workflow: &Workflow) -> bool {
        self.reset();

        let checked = workflow
            .to_yaml()
            .and_then(|yaml| self.yaml.validate(&yaml));
        if let Err(err) = checked {
            self.errors.push(err.to_string());
            return false;
        }

        if workflow.triggers().is_empty() && workflow.schedule.is_none() {
            self.warn("Workflow has no triggers defined".to_string());
        }
        if workflow.jobs().is_empty() {
            self.error("Workflow must have at least one job".to_string());
        }
        for job in workflow.jobs() {
            if job.runs_on.trim().is_empty() {
                self.error(format!("Job '{}' must have a runs-on value", job.id()));
            }
            if job.steps().is_empty() {
                self.warn(format!("Job '{}' has no steps", job.id()));
            }
        }
        self.finish()
    }

    /// Validate workflow text
    pub fn validate_yaml(&mut self, yaml: &str) -> bool {
        self.reset();

        let value = match self.yaml.parse(yaml) {
            Ok(value) => value,
            Err(err) => {
                self.errors.push(err.to_string());
                return false;
            }
        };
        let Value::Mapping(doc) = value else {
            self.error("Workflow document must be a mapping".to_string());
            return self.finish();
        };

        if !has(&doc, "name") {
            self.warn("Workflow should have a name".to_string());
        }
        if !has(&doc, "on") && !has(&doc, "schedule") {
            self.warn("Workflow has no triggers defined".to_string());
        }

        match doc.get("jobs") {
            Some(Value::Mapping(jobs)) if !jobs.is_empty() => self.check_jobs(jobs),
            _ => self.error("Workflow must have at least one job".to_string()),
        }
        self.finish()
    }

    fn check_jobs(&mut self, jobs: &Mapping) {
        for (id, job) in jobs {
            let id = scalar_to_string(id).unwrap_or_default();
            let Value::Mapping(job) = job else {
                self.error(format!("Job '{}' must be a mapping", id));
                continue;
            };
            let runs_on = job.get("runs-on").filter(|v| match v {
                Value::String(s) => !s.trim().is_empty(),
                Value::Null => false,
                Value::Sequence(labels) => !labels.is_empty(),
                _ => true,
            });
            if runs_on.is_none() {
                self.error(format!("Job '{}' must have a runs-on value", id));
            }
            let has_steps = match job.get("steps") {
                Some(Value::Sequence(steps)) => !steps.is_empty(),
                _ => false,
            };
            // reusable workflow calls carry `uses` instead of steps
            if !has_steps && !job.contains_key("uses") {
                self.warn(format!("Job '{}' has no steps", id));
            }
        }
    }

    fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn finish(&self) -> bool {
        debug!(
            "Validation finished with {} error(s) and {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        );
        self.errors.is_empty()
    }
}

fn has(doc: &Mapping, field: &str) -> bool {
    doc.get(field).is_some_and(|v| !v.is_null())
}
