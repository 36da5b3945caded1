//! Experiment Registry - CRUD over experiment metadata

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::Experiment;
use crate::config::ClientConfig;
use crate::remote::transport::HttpTransport;
use crate::Result;

#[derive(Serialize)]
struct CreateExperiment<'a> {
    name: &'a str,
    config: &'a Value,
}

/// Client for the service's experiment registry.
///
/// Nothing is cached: after [`delete`](Self::delete), a `get` on the same
/// ID fails with [`crate::Error::NotFound`] because the service says so,
/// even if an earlier `get` succeeded.
#[derive(Debug, Clone)]
pub struct ExperimentRegistry {
    transport: HttpTransport,
}

impl ExperimentRegistry {
    /// Create a registry client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_transport(HttpTransport::new(Arc::new(config))?))
    }

    pub(crate) const fn from_transport(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// List all experiments.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Remote`] on any non-success response.
    #[tracing::instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Experiment>> {
        let request = self.transport.request(Method::GET, &["experiments"])?;
        self.transport.send_json(request).await
    }

    /// Fetch one experiment.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] if the experiment was deleted or never
    /// existed, [`crate::Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn get(&self, experiment_id: &str) -> Result<Experiment> {
        let request = self
            .transport
            .request(Method::GET, &["experiments", experiment_id])?;
        self.transport.send_json(request).await
    }

    /// Create an experiment. `config` is passed to the service uninterpreted.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Remote`] on any non-success response.
    #[tracing::instrument(skip(self, config), err)]
    pub async fn create(&self, name: &str, config: &Value) -> Result<Experiment> {
        let request = self
            .transport
            .request(Method::POST, &["experiments"])?
            .json(&CreateExperiment { name, config });
        let experiment: Experiment = self.transport.send_json(request).await?;
        tracing::info!(experiment_id = experiment.id(), "experiment created");
        Ok(experiment)
    }

    /// Delete an experiment. Terminal: later calls on the ID fail with
    /// [`crate::Error::NotFound`].
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] if already gone, [`crate::Error::Remote`]
    /// otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn delete(&self, experiment_id: &str) -> Result<()> {
        let request = self
            .transport
            .request(Method::DELETE, &["experiments", experiment_id])?;
        self.transport.send_empty(request).await
    }
}
