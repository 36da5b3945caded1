//! Local Telemetry
//!
//! Per-experiment, append-only generation logs with derived statistics.
//!
//! ## Schema Overview
//!
//! ```text
//! experiment_id (1) ──< GenerationRecord (N) [append order]
//!                            └── GenerationData { generation, fitness, phi, entropy, genome? }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use evolab::telemetry::{GenerationData, TelemetryStore};
//! use serde_json::json;
//!
//! let store = TelemetryStore::new();
//!
//! store.record("exp-001", GenerationData::new(0, 0.50, 0.8, 0.2));
//! store.record(
//!     "exp-001",
//!     GenerationData::new(1, 0.50, 0.8, 0.2)
//!         .with_genome(json!([{"gene": "AT"}, {"gene": "GC"}])),
//! );
//!
//! assert_eq!(store.history("exp-001").len(), 2);
//! assert_eq!(store.convergence_rate("exp-001"), 1.0);
//! assert!(store.population_diversity("exp-001") > 0.0);
//! ```

mod generation_record;
pub mod statistics;
mod store;

pub use generation_record::{GenerationData, GenerationRecord};
pub use statistics::{
    canonical_form, convergence_rate, pairwise_distance, population_diversity, CONVERGENCE_WINDOW,
};
pub use store::TelemetryStore;
