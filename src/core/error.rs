//! Error types for workflow generation

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors raised while generating, parsing or publishing workflows
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Text is not well-formed YAML/JSON, or does not match the configuration schema
    #[error("Invalid YAML: {0}")]
    Parse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document field has an unexpected shape
    #[error("Field '{field}' {problem}")]
    InvalidField { field: String, problem: String },

    #[error("Failed to serialize workflow: {0}")]
    Serialize(String),

    /// Missing or unreadable file at the pipeline boundary
    #[error("{}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Git command failed: {0}")]
    Git(String),

    #[error("Configuration store error: {0}")]
    Store(String),
}

impl WorkflowError {
    pub fn invalid_field(field: impl Into<String>, problem: impl Into<String>) -> Self {
        WorkflowError::InvalidField {
            field: field.into(),
            problem: problem.into(),
        }
    }

    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkflowError::Resource {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for WorkflowError {
    fn from(err: serde_yaml::Error) -> Self {
        WorkflowError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err: WorkflowError = serde_yaml::from_str::<serde_yaml::Value>("a: [b")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Invalid YAML: "));
    }

    #[test]
    fn test_resource_error_names_path() {
        let err = WorkflowError::resource(
            "/tmp/missing.yml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("/tmp/missing.yml"));
    }
}
