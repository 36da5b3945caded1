//! Facade composing the local store and the remote clients.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::experiment::ExperimentRegistry;
use crate::remote::transport::HttpTransport;
use crate::remote::{EvolutionControlClient, RemoteTelemetryClient};
use crate::telemetry::{GenerationData, TelemetryStore};
use crate::Result;

/// One handle over every part of the client.
///
/// The sub-clients share a connection pool and configuration. The local
/// [`TelemetryStore`] is owned by this handle; clones of the handle share
/// it.
#[derive(Debug, Clone)]
pub struct EvolabClient {
    config: Arc<ClientConfig>,
    telemetry: RemoteTelemetryClient,
    evolution: EvolutionControlClient,
    experiments: ExperimentRegistry,
    local: Arc<TelemetryStore>,
}

impl EvolabClient {
    /// Create a client with its own empty local store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(TelemetryStore::new()))
    }

    /// Create a client recording into an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_store(config: ClientConfig, local: Arc<TelemetryStore>) -> Result<Self> {
        let config = Arc::new(config);
        let transport = HttpTransport::new(Arc::clone(&config))?;
        tracing::debug!(base_url = %config.base_url(), "evolab client ready");

        Ok(Self {
            telemetry: RemoteTelemetryClient::from_transport(transport.clone()),
            evolution: EvolutionControlClient::from_transport(transport.clone()),
            experiments: ExperimentRegistry::from_transport(transport),
            config,
            local,
        })
    }

    /// Create a client from `EVOLAB_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds an invalid URL.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Remote telemetry client.
    #[must_use]
    pub const fn telemetry(&self) -> &RemoteTelemetryClient {
        &self.telemetry
    }

    /// Evolution control client.
    #[must_use]
    pub const fn evolution(&self) -> &EvolutionControlClient {
        &self.evolution
    }

    /// Experiment registry client.
    #[must_use]
    pub const fn experiments(&self) -> &ExperimentRegistry {
        &self.experiments
    }

    /// Local telemetry store.
    #[must_use]
    pub fn local(&self) -> &TelemetryStore {
        &self.local
    }

    /// Record a generation locally, then submit it to the service.
    ///
    /// The local record is kept even if the submission fails.
    ///
    /// # Errors
    ///
    /// Propagates the submission error unchanged.
    pub async fn track(&self, experiment_id: &str, data: GenerationData) -> Result<()> {
        self.local.record(experiment_id, data.clone());
        self.telemetry.submit(experiment_id, &data).await
    }
}
