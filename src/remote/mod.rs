//! Remote service clients
//!
//! All request/response calls go through one shared `reqwest` client; the
//! live stream runs over a WebSocket.
//!
//! ## Endpoints
//!
//! ```text
//! POST   /telemetry/submit
//! GET    /telemetry/history?experiment_id=..&include_genomes=..
//! GET    /telemetry/{id}/latest | convergence | mutations
//! GET    /telemetry/{id}/export?format=json|csv
//! WS     /telemetry/{id}/stream
//! POST   /evolution/{id}/pause | resume | select
//! PUT    /evolution/{id}/mutation-rate   { "rate": f64 }
//! ```
//!
//! Experiment CRUD lives in [`crate::experiment::ExperimentRegistry`].

mod control;
pub mod stream;
mod telemetry_client;
pub(crate) mod transport;

pub use control::EvolutionControlClient;
pub use stream::{RecordSink, RecordStream};
pub use telemetry_client::{ExportFormat, RemoteTelemetryClient};

/// A record-like object as returned by the service.
///
/// Field sets are service-defined, so remote results stay untyped.
pub type RecordMap = serde_json::Map<String, serde_json::Value>;
