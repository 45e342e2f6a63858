//! Fluent builders for the workflow model
//!
//! Builders are owned values moved through chained calls. Sub-builders are
//! either closure-scoped (jobs, services, steps) or take the parent by value
//! and hand it back (the job strategy).

pub mod job;
pub mod service;
pub mod step;
pub mod strategy;
pub mod workflow;

pub use job::JobBuilder;
pub use service::ServiceBuilder;
pub use step::StepBuilder;
pub use strategy::StrategyBuilder;
pub use workflow::WorkflowBuilder;
