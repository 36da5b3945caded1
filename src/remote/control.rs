//! Evolution control commands against a running experiment.

use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use super::transport::HttpTransport;
use crate::config::ClientConfig;
use crate::Result;

/// Fire-and-confirm commands that steer an experiment's future generations.
///
/// Holds no experiment state. Idempotency (double pause) and range checks
/// (mutation rate outside `[0, 1]`) are left to the service. Concurrent
/// commands against one experiment carry no ordering guarantee.
#[derive(Debug, Clone)]
pub struct EvolutionControlClient {
    transport: HttpTransport,
}

impl EvolutionControlClient {
    /// Create a client for the configured service.
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

    /// Pause evolution.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] for unknown experiments,
    /// [`crate::Error::Remote`] for any other non-success response.
    #[tracing::instrument(skip(self), err)]
    pub async fn pause(&self, experiment_id: &str) -> Result<()> {
        self.command(Method::POST, experiment_id, "pause", None).await
    }

    /// Resume evolution.
    ///
    /// # Errors
    ///
    /// Same as [`pause`](Self::pause).
    #[tracing::instrument(skip(self), err)]
    pub async fn resume(&self, experiment_id: &str) -> Result<()> {
        self.command(Method::POST, experiment_id, "resume", None).await
    }

    /// Set the mutation rate. The value is forwarded unchecked.
    ///
    /// # Errors
    ///
    /// Same as [`pause`](Self::pause); an out-of-range rate fails only if
    /// the service rejects it.
    #[tracing::instrument(skip(self), err)]
    pub async fn set_mutation_rate(&self, experiment_id: &str, rate: f64) -> Result<()> {
        self.command(
            Method::PUT,
            experiment_id,
            "mutation-rate",
            Some(json!({ "rate": rate })),
        )
        .await
    }

    /// Request an out-of-band selection step.
    ///
    /// # Errors
    ///
    /// Same as [`pause`](Self::pause).
    #[tracing::instrument(skip(self), err)]
    pub async fn trigger_selection(&self, experiment_id: &str) -> Result<()> {
        self.command(Method::POST, experiment_id, "select", None).await
    }

    async fn command(
        &self,
        method: Method,
        experiment_id: &str,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let mut request = self
            .transport
            .request(method, &["evolution", experiment_id, action])?;
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.transport.send_empty(request).await
    }
}
