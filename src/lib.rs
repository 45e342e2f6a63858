//! gha-generator - GitHub Actions workflows from declarative configuration

pub mod builder;
pub mod cli;
pub mod core;
pub mod generator;
pub mod persistence;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use builder::{JobBuilder, ServiceBuilder, StepBuilder, StrategyBuilder, WorkflowBuilder};
pub use core::config::WorkflowConfig;
pub use core::{Job, Result, Settings, Step, Workflow, WorkflowError};
pub use generator::{AuditReport, JobGenerator, MatrixGenerator, Preset, StepGenerator, WorkflowGenerator};
pub use persistence::{ConfigStore, FileConfigStore, InMemoryConfigStore, WorkflowRegistry};
pub use services::{SecretDetector, TemplateEngine, WorkflowPublisher};
pub use validation::{WorkflowValidator, YamlValidator};
