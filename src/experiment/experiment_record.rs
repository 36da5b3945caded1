//! Experiment - metadata for one evolutionary run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Run state of an experiment.
///
/// Transitions happen through pause/resume commands or service-side
/// completion, never locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Generations are being produced.
    Running,
    /// Evolution is suspended.
    Paused,
    /// The run has finished.
    Completed,
}

/// Experiment metadata as held by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experiment {
    id: String,
    name: String,
    status: ExperimentStatus,
    generation: u64,
    population_size: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Experiment {
    /// Create a builder, mostly useful for fixtures and stand-in services.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ExperimentBuilder {
        ExperimentBuilder::new(id, name)
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the run state.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Get the current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Get the population size.
    #[must_use]
    pub const fn population_size(&self) -> u64 {
        self.population_size
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the last-update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    name: String,
    status: ExperimentStatus,
    generation: u64,
    population_size: u64,
    created_at: DateTime<Utc>,
}

impl ExperimentBuilder {
    /// Create a new builder; the experiment starts out running at generation 0.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ExperimentStatus::Running,
            generation: 0,
            population_size: 0,
            created_at: Utc::now(),
        }
    }

    /// Set the run state.
    #[must_use]
    pub const fn status(mut self, status: ExperimentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the current generation.
    #[must_use]
    pub const fn generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Set the population size.
    #[must_use]
    pub const fn population_size(mut self, population_size: u64) -> Self {
        self.population_size = population_size;
        self
    }

    /// Set a custom creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `Experiment`; `updated_at` is set to the creation time.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: self.id,
            name: self.name,
            status: self.status,
            generation: self.generation,
            population_size: self.population_size,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
