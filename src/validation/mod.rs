//! Workflow validation
//!
//! Two layers: [`YamlValidator`] checks that text parses at all, and
//! [`WorkflowValidator`] checks the structure this tool depends on.

pub mod workflow;
pub mod yaml;

pub use workflow::WorkflowValidator;
pub use yaml::YamlValidator;
