//! Generation Record - one observation of an experiment at a generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied measurements for one generation.
///
/// This is the payload shape shared by local recording and remote
/// submission. The genome is opaque to this crate; population diversity
/// reads it as a collection of genomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationData {
    generation: u64,
    fitness: f64,
    phi: f64,
    entropy: f64,
    #[serde(default, alias = "genomes", skip_serializing_if = "Option::is_none")]
    genome: Option<Value>,
}

impl GenerationData {
    /// Create generation data without genome payload.
    ///
    /// # Arguments
    ///
    /// * `generation` - Generation index
    /// * `fitness` - Fitness score (higher is better)
    /// * `phi` - Integration/coherence metric
    /// * `entropy` - Entropy metric
    #[must_use]
    pub const fn new(generation: u64, fitness: f64, phi: f64, entropy: f64) -> Self {
        Self {
            generation,
            fitness,
            phi,
            entropy,
            genome: None,
        }
    }

    /// Attach a genome payload.
    #[must_use]
    pub fn with_genome(mut self, genome: Value) -> Self {
        self.genome = Some(genome);
        self
    }

    /// Get the generation index.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Get the fitness score.
    #[must_use]
    pub const fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Get the phi metric.
    #[must_use]
    pub const fn phi(&self) -> f64 {
        self.phi
    }

    /// Get the entropy metric.
    #[must_use]
    pub const fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Get the genome payload, if any.
    #[must_use]
    pub const fn genome(&self) -> Option<&Value> {
        self.genome.as_ref()
    }
}

/// A stored generation observation.
///
/// Records are immutable once created; the store hands them out behind
/// `Arc` so readers never copy genome payloads.
///
/// ## Ordering
///
/// `timestamp` is assigned at ingestion and is informational only. Within
/// one experiment's local log, append order is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    experiment_id: String,
    #[serde(flatten)]
    data: GenerationData,
    timestamp: DateTime<Utc>,
}

impl GenerationRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, data: GenerationData) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the recorded measurements.
    #[must_use]
    pub const fn data(&self) -> &GenerationData {
        &self.data
    }

    /// Get the generation index.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.data.generation
    }

    /// Get the fitness score.
    #[must_use]
    pub const fn fitness(&self) -> f64 {
        self.data.fitness
    }

    /// Get the phi metric.
    #[must_use]
    pub const fn phi(&self) -> f64 {
        self.data.phi
    }

    /// Get the entropy metric.
    #[must_use]
    pub const fn entropy(&self) -> f64 {
        self.data.entropy
    }

    /// Get the genome payload, if any.
    #[must_use]
    pub const fn genome(&self) -> Option<&Value> {
        self.data.genome.as_ref()
    }

    /// Get the ingestion timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
