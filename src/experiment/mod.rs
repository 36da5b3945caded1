//! Experiment metadata and registry
//!
//! ## Lifecycle
//!
//! ```text
//! create ──> running <──> paused ──> completed
//!               │            │           │
//!               └────────────┴───────────┴──> delete (terminal, NotFound after)
//! ```
//!
//! Pause/resume go through [`crate::remote::EvolutionControlClient`];
//! completion is decided by the service.

mod experiment_record;
mod registry;

pub use experiment_record::{Experiment, ExperimentBuilder, ExperimentStatus};
pub use registry::ExperimentRegistry;
