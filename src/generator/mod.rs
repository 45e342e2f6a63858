//! Configuration to model mapping
//!
//! Generators are stateless: they read a typed configuration and drive the
//! builders, applying only the keys that are present.

pub mod audit;
pub mod job;
pub mod matrix;
pub mod presets;
pub mod step;
pub mod workflow;

pub use audit::AuditReport;
pub use job::JobGenerator;
pub use matrix::MatrixGenerator;
pub use presets::{Preset, PresetContext};
pub use step::StepGenerator;
pub use workflow::WorkflowGenerator;
