//! Workflow configuration schema
//!
//! Configurations are the declarative input to the generators. Every level
//! rejects unknown keys, except matrix dimensions, which pass through
//! untouched so any dimension name can be used.

use crate::core::document::scalar_to_string;
use crate::core::error::{Result, WorkflowError};
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// A value that may be written as a single item or a list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Any scalar is accepted, so `php: [8.2, 8.3]` reads the same as the quoted form
impl<'de> Deserialize<'de> for OneOrMany<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        fn scalar<E: de::Error>(value: &Value) -> std::result::Result<String, E> {
            scalar_to_string(value).ok_or_else(|| E::custom("expected a string, number or list of them"))
        }

        match Value::deserialize(deserializer)? {
            Value::Sequence(items) => items
                .iter()
                .map(scalar)
                .collect::<std::result::Result<_, _>>()
                .map(OneOrMany::Many),
            value => scalar(&value).map(OneOrMany::One),
        }
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Top-level workflow configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Workflow name (defaults to "workflow")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Trigger events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<TriggersConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<ConcurrencyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Mapping>,

    /// Jobs keyed by id, in output order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<IndexMap<String, JobConfig>>,
}

/// Trigger events: `on: push`, `on: [push, pull_request]` or a full mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggersConfig {
    Event(String),
    Events(Vec<String>),
    /// Event name to event configuration (`{branches: [...]}` or the schedule list)
    Detailed(Mapping),
}

/// `concurrency: {group, cancel-in-progress}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConcurrencyConfig {
    pub group: String,

    /// Defaults to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_in_progress: Option<bool>,
}

/// Job configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct JobConfig {
    /// Job id, only read when a job is generated on its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<ConcurrencyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<OneOrMany<String>>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<IndexMap<String, ServiceConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Mapping>,
}

/// `strategy:` block of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    /// Dimensions pass through verbatim; `exclude` and `include` are lists of combinations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<u32>,
}

/// Service container attached to a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Mapping>,
}

/// Step configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct StepConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl StepConfig {
    /// Step that invokes an action
    pub fn action(name: &str, uses: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            uses: Some(uses.to_string()),
            ..Self::default()
        }
    }

    /// Step that runs an inline script
    pub fn script(name: &str, run: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            run: Some(run.to_string()),
            ..Self::default()
        }
    }

    /// Attach action inputs
    pub fn with_inputs(mut self, inputs: &[(&str, &str)]) -> Self {
        let mut with = Mapping::new();
        for (key, value) in inputs {
            with.insert(Value::String(key.to_string()), Value::String(value.to_string()));
        }
        self.with = Some(with);
        self
    }
}

/// Matrix shorthand consumed by the matrix generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub php: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laravel: Option<OneOrMany<String>>,
}

impl WorkflowConfig {
    /// Load a workflow configuration from a YAML (or JSON) file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse a workflow configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Interpret an already parsed mapping as a configuration
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_yaml::from_value(value)?)
    }

    /// Pretty-printed JSON, used when storing a configuration for recall
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
