//! Remote telemetry: submission, queries, bulk export and the live stream.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;

use super::stream::RecordStream;
use super::transport::HttpTransport;
use super::RecordMap;
use crate::config::ClientConfig;
use crate::telemetry::GenerationData;
use crate::{Error, Result};

/// Bulk export encodings offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    /// JSON document
    #[default]
    Json,
    /// Comma-separated values
    Csv,
}

impl ExportFormat {
    /// Query-string value for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::InvalidConfig(format!("unknown export format: {other}"))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Submission<'a> {
    experiment_id: &'a str,
    #[serde(flatten)]
    data: &'a GenerationData,
}

/// Client for the remote telemetry service.
///
/// Statistics returned by [`convergence_metrics`](Self::convergence_metrics)
/// and [`mutation_stats`](Self::mutation_stats) are computed by the service
/// and passed through untouched; they need not agree with the local
/// [`crate::telemetry::TelemetryStore`] figures.
///
/// No call is retried. Dropping a returned future cancels the request and
/// releases its connection.
#[derive(Debug, Clone)]
pub struct RemoteTelemetryClient {
    transport: HttpTransport,
}

impl RemoteTelemetryClient {
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

    /// Send one generation's measurements to the service.
    ///
    /// # Errors
    ///
    /// [`Error::Remote`] if the service rejects the record or is unreachable.
    #[tracing::instrument(skip(self, data), fields(generation = data.generation()), err)]
    pub async fn submit(&self, experiment_id: &str, data: &GenerationData) -> Result<()> {
        let request = self
            .transport
            .request(Method::POST, &["telemetry", "submit"])?
            .json(&Submission {
                experiment_id,
                data,
            });
        self.transport.send_empty(request).await
    }

    /// Fetch an experiment's history in service order.
    ///
    /// Genome payloads are only included when `include_genomes` is set.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown experiments, [`Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn history(
        &self,
        experiment_id: &str,
        include_genomes: bool,
    ) -> Result<Vec<RecordMap>> {
        let request = self
            .transport
            .request(Method::GET, &["telemetry", "history"])?
            .query(&[
                ("experiment_id", experiment_id),
                ("include_genomes", if include_genomes { "true" } else { "false" }),
            ]);
        self.transport.send_json(request).await
    }

    /// Fetch the most recent record; `None` if the service has none yet.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown experiments, [`Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn latest(&self, experiment_id: &str) -> Result<Option<RecordMap>> {
        self.get_experiment_resource(experiment_id, "latest").await
    }

    /// Fetch the service's convergence metrics.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown experiments, [`Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn convergence_metrics(&self, experiment_id: &str) -> Result<RecordMap> {
        self.get_experiment_resource(experiment_id, "convergence").await
    }

    /// Fetch the service's mutation statistics.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown experiments, [`Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn mutation_stats(&self, experiment_id: &str) -> Result<RecordMap> {
        self.get_experiment_resource(experiment_id, "mutations").await
    }

    /// Download a full export, buffered in memory.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for unknown experiments, [`Error::Remote`] otherwise.
    #[tracing::instrument(skip(self), err)]
    pub async fn export(&self, experiment_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        let request = self
            .transport
            .request(Method::GET, &["telemetry", experiment_id, "export"])?
            .query(&[("format", format.as_str())]);
        let payload = self.transport.send(request).await?.bytes().await?;
        tracing::debug!(bytes = payload.len(), "export downloaded");
        Ok(payload.to_vec())
    }

    /// Open a live stream of records on a fresh connection.
    ///
    /// The connection is authenticated with the same bearer credential as
    /// HTTP calls, sent on the handshake request.
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails. Failures after the
    /// handshake surface through the stream itself.
    #[tracing::instrument(skip(self), err)]
    pub async fn stream(&self, experiment_id: &str) -> Result<RecordStream> {
        let url = self
            .transport
            .stream_endpoint(&["telemetry", experiment_id, "stream"])?;
        RecordStream::connect(url, self.transport.config().bearer()).await
    }

    async fn get_experiment_resource<T: serde::de::DeserializeOwned>(
        &self,
        experiment_id: &str,
        resource: &str,
    ) -> Result<T> {
        let request = self
            .transport
            .request(Method::GET, &["telemetry", experiment_id, resource])?;
        self.transport.send_json(request).await
    }
}
