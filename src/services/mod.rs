//! Collaborators around the workflow model
//!
//! Template rendering, publishing to disk (with backups and git), secret
//! detection and project introspection. None of these carry workflow
//! semantics; they produce or consume configurations and text.

pub mod analyzer;
pub mod publisher;
pub mod secrets;
pub mod template;

pub use analyzer::{ComposerAnalyzer, ProjectAnalyzer, ProjectMetadata};
pub use publisher::{GitCommitter, WorkflowPublisher};
pub use secrets::SecretDetector;
pub use template::{TemplateEngine, TemplateInfo, TemplateRenderer};
