use crate::core::error::{Result, WorkflowError};
use serde_yaml::Value;
use std::path::Path;

/// Syntax check of workflow text
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlValidator;

impl YamlValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parse `yaml`, returning the parsed value or a `Parse` error
    pub fn parse(&self, yaml: &str) -> Result<Value> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn validate(&self, yaml: &str) -> Result<()> {
        self.parse(yaml).map(|_| ())
    }

    /// Validate a file; a missing file is a resource error
    pub fn validate_file(&self, path: &Path) -> Result<()> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WorkflowError::resource(path, e))?;
        self.validate(&content)
    }

    /// Parse errors of `yaml`, without failing
    pub fn errors(&self, yaml: &str) -> Vec<String> {
        match serde_yaml::from_str::<Value>(yaml) {
            Ok(_) => Vec::new(),
            Err(err) => vec![err.to_string()],
        }
    }
}
