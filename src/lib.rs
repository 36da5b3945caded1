//! # Evolab: Evolutionary Experiment Telemetry Client
//!
//! Evolab records and analyzes generation-by-generation telemetry of
//! evolutionary optimization runs, and steers those runs through a remote
//! control service.
//!
//! ## Components
//!
//! - [`telemetry::TelemetryStore`]: in-process, append-only generation logs
//!   with convergence rate and population diversity
//! - [`remote::RemoteTelemetryClient`]: submit/query/export plus a live
//!   record stream
//! - [`remote::EvolutionControlClient`]: pause, resume, mutation rate,
//!   selection
//! - [`experiment::ExperimentRegistry`]: experiment CRUD
//! - [`EvolabClient`]: one handle over all of the above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use evolab::{ClientConfig, EvolabClient};
//! use evolab::telemetry::GenerationData;
//!
//! # async fn example() -> evolab::Result<()> {
//! let client = EvolabClient::new(ClientConfig::builder().api_key("token").build()?)?;
//!
//! client.track("exp-001", GenerationData::new(0, 0.42, 0.7, 0.3)).await?;
//! println!("convergence: {}", client.local().convergence_rate("exp-001"));
//!
//! let mut stream = client.telemetry().stream("exp-001").await?;
//! while let Some(record) = stream.next_record().await {
//!     println!("{:?}", record?);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod client;
pub mod config;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod remote;
pub mod telemetry;

pub use client::EvolabClient;
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
