//! Telemetry Store - in-memory, append-only generation logs
//!
//! One log per experiment ID. Data is lost on process restart; callers who
//! need durability also submit records to the remote service.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::{statistics, GenerationData, GenerationRecord};

/// In-memory store of generation records keyed by experiment ID.
///
/// ## Concurrency
///
/// Logs live in a `DashMap`; an append holds the shard's write lock for the
/// duration of a `Vec::push`, so concurrent appends to one experiment are
/// serialized and readers never observe a partially written record. Readers
/// take a snapshot of `Arc` handles under the shard's read lock; records
/// appended after that point are simply not part of the snapshot.
///
/// ## Isolation
///
/// Independent stores never share state, so tests and multiple clients can
/// each own one.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    logs: DashMap<String, Vec<Arc<GenerationRecord>>>,
}

impl TelemetryStore {
    /// Create a new empty telemetry store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a generation to an experiment's log.
    ///
    /// Unknown experiment IDs start a new log. The record is timestamped at
    /// this call.
    pub fn record(&self, experiment_id: &str, data: GenerationData) {
        let generation = data.generation();
        let record = Arc::new(GenerationRecord::new(experiment_id, data));
        let mut log = self.logs.entry(experiment_id.to_string()).or_default();
        log.push(record);
        debug!(experiment_id, generation, len = log.len(), "recorded generation");
    }

    /// Full log of an experiment in append order.
    ///
    /// Empty if the experiment has no recorded history.
    #[must_use]
    pub fn history(&self, experiment_id: &str) -> Vec<Arc<GenerationRecord>> {
        self.logs
            .get(experiment_id)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    /// Most recently appended record, if any.
    #[must_use]
    pub fn latest(&self, experiment_id: &str) -> Option<Arc<GenerationRecord>> {
        self.logs
            .get(experiment_id)
            .and_then(|log| log.last().cloned())
    }

    /// Number of records logged for an experiment.
    #[must_use]
    pub fn len(&self, experiment_id: &str) -> usize {
        self.logs.get(experiment_id).map_or(0, |log| log.len())
    }

    /// Check if no experiment has any recorded history.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.iter().all(|log| log.is_empty())
    }

    /// IDs of all experiments with a log, in no particular order.
    #[must_use]
    pub fn experiment_ids(&self) -> Vec<String> {
        self.logs.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Stability of recent fitness values; see [`statistics::convergence_rate`].
    ///
    /// ## Example
    ///
    /// ```rust
    /// use evolab::telemetry::{GenerationData, TelemetryStore};
    ///
    /// let store = TelemetryStore::new();
    /// for (generation, fitness) in [0.2, 0.4, 0.6, 0.8].into_iter().enumerate() {
    ///     store.record("exp-001", GenerationData::new(generation as u64, fitness, 0.0, 0.0));
    /// }
    ///
    /// let rate = store.convergence_rate("exp-001");
    /// assert!((rate - 0.9524).abs() < 1e-4);
    /// ```
    #[must_use]
    pub fn convergence_rate(&self, experiment_id: &str) -> f64 {
        let Some(log) = self.logs.get(experiment_id) else {
            return 0.0;
        };
        let fitness: Vec<f64> = log.iter().map(|r| r.fitness()).collect();
        statistics::convergence_rate(&fitness)
    }

    /// Genetic spread of the latest record's genome collection; see
    /// [`statistics::population_diversity`].
    #[must_use]
    pub fn population_diversity(&self, experiment_id: &str) -> f64 {
        self.latest(experiment_id)
            .map_or(0.0, |record| statistics::population_diversity(record.genome()))
    }

    /// Delete one experiment's log.
    pub fn clear(&self, experiment_id: &str) {
        if self.logs.remove(experiment_id).is_some() {
            debug!(experiment_id, "cleared telemetry log");
        }
    }

    /// Delete every log.
    pub fn clear_all(&self) {
        self.logs.clear();
        debug!("cleared all telemetry logs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(generation: u64, fitness: f64) -> GenerationData {
        GenerationData::new(generation, fitness, 0.5, 0.1)
    }

    #[test]
    fn test_store_default() {
        let store = TelemetryStore::new();
        assert!(store.is_empty());
        assert!(store.history("missing").is_empty());
        assert!(store.latest("missing").is_none());
        assert_eq!(store.len("missing"), 0);
    }

    #[test]
    fn test_record_and_latest() {
        let store = TelemetryStore::new();
        store.record("exp-1", data(0, 0.1));
        store.record("exp-1", data(1, 0.2));

        let latest = store.latest("exp-1").unwrap();
        assert_eq!(latest.generation(), 1);
        assert_eq!(latest.experiment_id(), "exp-1");
        assert_eq!(store.len("exp-1"), 2);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_history_preserves_append_order() {
        let store = TelemetryStore::new();
        // Out-of-order generations are kept in append order.
        store.record("exp-1", data(2, 0.2));
        store.record("exp-1", data(0, 0.0));
        store.record("exp-1", data(1, 0.1));

        let generations: Vec<u64> = store
            .history("exp-1")
            .iter()
            .map(|r| r.generation())
            .collect();
        assert_eq!(generations, vec![2, 0, 1]);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_appends() {
        let store = TelemetryStore::new();
        store.record("exp-1", data(0, 0.1));
        let snapshot = store.history("exp-1");
        store.record("exp-1", data(1, 0.2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.history("exp-1").len(), 2);
    }

    #[test]
    fn test_convergence_needs_two_records() {
        let store = TelemetryStore::new();
        assert_eq!(store.convergence_rate("exp-1"), 0.0);
        store.record("exp-1", data(0, 0.7));
        assert_eq!(store.convergence_rate("exp-1"), 0.0);
        store.record("exp-1", data(1, 0.7));
        assert_eq!(store.convergence_rate("exp-1"), 1.0);
    }

    #[test]
    fn test_diversity_reads_latest_only() {
        let store = TelemetryStore::new();
        store.record(
            "exp-1",
            data(0, 0.1).with_genome(json!([{"x": "aaaa"}, {"x": "bbbb"}])),
        );
        assert!(store.population_diversity("exp-1") > 0.0);

        store.record("exp-1", data(1, 0.2));
        assert_eq!(store.population_diversity("exp-1"), 0.0);
    }

    #[test]
    fn test_clear_and_clear_all() {
        let store = TelemetryStore::new();
        store.record("exp-1", data(0, 0.1));
        store.record("exp-2", data(0, 0.1));

        store.clear("exp-1");
        assert!(store.history("exp-1").is_empty());
        assert_eq!(store.history("exp-2").len(), 1);

        store.clear_all();
        assert!(store.is_empty());
        assert!(store.experiment_ids().is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(TelemetryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for g in 0..250 {
                        store.record("shared", data(t * 1000 + g, 0.5));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let history = store.history("shared");
        assert_eq!(history.len(), 2000);
        // Each writer's own appends stay in order.
        for t in 0..8u64 {
            let mine: Vec<u64> = history
                .iter()
                .map(|r| r.generation())
                .filter(|g| g / 1000 == t)
                .collect();
            assert_eq!(mine, (0..250).map(|g| t * 1000 + g).collect::<Vec<_>>());
        }
    }
}
