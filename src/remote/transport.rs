//! Shared HTTP plumbing for the remote clients.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::{Error, Result};

/// A configured `reqwest` client bound to one service.
///
/// Cheap to clone; all clones share one connection pool. No request
/// timeout is set, so dropping the returned future is how a caller bounds
/// latency.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    pub(crate) fn new(config: Arc<ClientConfig>) -> Result<Self> {
        let client = Client::builder().user_agent(config.user_agent()).build()?;
        Ok(Self { client, config })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL joined with percent-encoded path segments.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        join_segments(self.config.base_url(), segments)
    }

    /// Stream base URL joined with percent-encoded path segments.
    pub(crate) fn stream_endpoint(&self, segments: &[&str]) -> Result<Url> {
        join_segments(self.config.stream_url(), segments)
    }

    /// Start a request carrying the credential, if configured.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let mut request = self.client.request(method, url);
        if let Some(bearer) = self.config.bearer() {
            request = request.header(AUTHORIZATION, bearer);
        }
        Ok(request)
    }

    /// Send a request and map non-success statuses to errors.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let resource = response.url().path().to_string();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound { resource });
        }

        let body = response.text().await.unwrap_or_default();
        let reason = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            body.trim().to_string()
        };
        tracing::debug!(status = status.as_u16(), %resource, %reason, "service rejected request");
        Err(Error::Remote {
            status: status.as_u16(),
            reason,
        })
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::InvalidConfig(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
