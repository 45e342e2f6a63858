//! Step domain model

use crate::core::document::{merge_into, put, put_mapping, put_str, Document, Fields};
use crate::core::error::{Result, WorkflowError};
use serde_yaml::{Mapping, Value};

/// A single task inside a job
///
/// A step is expected to set either `uses` or `run`; this is not enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub name: Option<String>,
    pub id: Option<String>,
    /// Action reference, e.g. `actions/checkout@v4`
    pub uses: Option<String>,
    /// Inputs passed to the action
    pub with: Mapping,
    /// Shell script body, may span several lines
    pub run: Option<String>,
    pub shell: Option<String>,
    /// Conditional expression (`if:`)
    pub condition: Option<String>,
    pub continue_on_error: bool,
    env: Mapping,
    pub working_directory: Option<String>,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge variables into the step environment; later values win
    pub fn merge_env(&mut self, env: &Mapping) {
        merge_into(&mut self.env, env);
    }

    pub fn env(&self) -> &Mapping {
        &self.env
    }

    /// Serialize into canonical field order
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        put_str(&mut doc, "name", self.name.as_deref());
        put_str(&mut doc, "id", self.id.as_deref());
        put_str(&mut doc, "uses", self.uses.as_deref());
        put_mapping(&mut doc, "with", &self.with);
        put_str(&mut doc, "run", self.run.as_deref());
        put_str(&mut doc, "shell", self.shell.as_deref());
        put_str(&mut doc, "if", self.condition.as_deref());
        if self.continue_on_error {
            put(&mut doc, "continue-on-error", true);
        }
        put_mapping(&mut doc, "env", &self.env);
        put_str(&mut doc, "working-directory", self.working_directory.as_deref());
        doc
    }

    /// Rebuild a step from its serialized form
    pub fn from_document(doc: &Mapping, path: &str) -> Result<Self> {
        let fields = Fields::new(doc, path);
        let mut step = Step {
            name: fields.string("name")?,
            id: fields.string("id")?,
            uses: fields.string("uses")?,
            run: fields.string("run")?,
            shell: fields.string("shell")?,
            condition: fields.string("if")?,
            continue_on_error: fields.bool("continue-on-error")?.unwrap_or(false),
            working_directory: fields.string("working-directory")?,
            ..Step::default()
        };
        if let Some(with) = fields.mapping("with")? {
            step.with = with.clone();
        }
        if let Some(env) = fields.mapping("env")? {
            step.merge_env(env);
        }
        Ok(step)
    }

    /// Parse a step from a YAML value, which must be a mapping
    pub fn from_value(value: &Value, path: &str) -> Result<Self> {
        match value {
            Value::Mapping(doc) => Self::from_document(doc, path),
            _ => Err(WorkflowError::invalid_field(path, "must be a mapping")),
        }
    }

    /// Serialize this step on its own, used for scanning step text
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_document())
            .map_err(|e| WorkflowError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_empty_step_serializes_to_empty_document() {
        assert!(Step::new().to_document().is_empty());
    }

    #[test]
    fn test_canonical_field_order() {
        let mut step = Step::new();
        step.working_directory = Some("app".to_string());
        step.run = Some("make".to_string());
        step.name = Some("Build".to_string());
        step.continue_on_error = true;

        let keys: Vec<_> = step
            .to_document()
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["name", "run", "continue-on-error", "working-directory"]);
    }

    #[test]
    fn test_env_merge_accumulates() {
        let mut step = Step::new();
        step.merge_env(&mapping("A: one\nB: two\n"));
        step.merge_env(&mapping("B: three\nC: four\n"));

        assert_eq!(step.env(), &mapping("A: one\nB: three\nC: four\n"));
    }

    #[test]
    fn test_from_document_roundtrip() {
        let doc = mapping(
            r#"
name: Setup PHP
uses: shivammathur/setup-php@v2
with:
  php-version: "8.3"
if: github.event_name == 'push'
continue-on-error: true
env:
  TOKEN: ${{ secrets.TOKEN }}
"#,
        );
        let step = Step::from_document(&doc, "steps[0]").unwrap();
        assert_eq!(step.condition.as_deref(), Some("github.event_name == 'push'"));
        assert_eq!(step.to_document(), doc);
    }

    #[test]
    fn test_from_value_rejects_scalar() {
        let err = Step::from_value(&Value::String("checkout".into()), "jobs.build.steps[0]").unwrap_err();
        assert_eq!(err.to_string(), "Field 'jobs.build.steps[0]' must be a mapping");
    }

    #[test]
    fn test_multiline_run_is_literal_block() {
        let mut step = Step::new();
        step.run = Some("composer install\nphp artisan test\n".to_string());
        let yaml = step.to_yaml().unwrap();
        assert!(yaml.contains("run: |"), "expected literal block, got:\n{}", yaml);
        assert!(yaml.contains("  composer install\n  php artisan test\n"));
    }
}
