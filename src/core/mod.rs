//! Core domain models for workflows
//!
//! This module defines the workflow document model (workflows, jobs and
//! steps), its ordered serialization, the configuration schema consumed by
//! the generators, and the tool settings.

pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod settings;
pub mod step;
pub mod workflow;

pub use document::Document;
pub use error::{Result, WorkflowError};
pub use job::{Concurrency, Job, DEFAULT_RUNNER};
pub use settings::Settings;
pub use step::Step;
pub use workflow::{Workflow, DEFAULT_CRON, DEFAULT_WORKFLOW_NAME};
