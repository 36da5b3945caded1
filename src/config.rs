//! Client configuration
//!
//! A [`ClientConfig`] is built once and shared by every sub-client of the
//! facade. It lives for as long as the owning [`crate::EvolabClient`].

use std::fmt;

use reqwest::Url;

use crate::{Error, Result};

/// Well-known service endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.dnalang.io";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "EVOLAB_BASE_URL";
/// Environment variable carrying the bearer credential.
pub const ENV_API_KEY: &str = "EVOLAB_API_KEY";
/// Environment variable overriding the stream endpoint.
pub const ENV_STREAM_URL: &str = "EVOLAB_STREAM_URL";

const DEFAULT_USER_AGENT: &str = concat!("evolab/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the remote telemetry service.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    stream_url: Url,
    api_key: Option<String>,
    user_agent: String,
}

impl ClientConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from `EVOLAB_*` environment variables.
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a variable holds an unusable URL.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                builder = builder.api_key(key);
            }
        }
        if let Ok(url) = std::env::var(ENV_STREAM_URL) {
            builder = builder.stream_url(url);
        }
        builder.build()
    }

    /// Base URL of the HTTP API.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL of the WebSocket stream endpoint.
    #[must_use]
    pub const fn stream_url(&self) -> &Url {
        &self.stream_url
    }

    /// Bearer credential, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// User agent sent with HTTP requests.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Value for the `Authorization` header, if a credential is configured.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| format!("Bearer {key}"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        let stream_url = derive_stream_url(&base_url).expect("default base URL is http(s)");
        Self {
            base_url,
            stream_url,
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("stream_url", &self.stream_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    stream_url: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the HTTP base URL (`http` or `https`).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the WebSocket base URL (`ws` or `wss`).
    ///
    /// When unset it is derived from the base URL.
    #[must_use]
    pub fn stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = Some(url.into());
        self
    }

    /// Set the bearer credential.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the `ClientConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a URL does not parse, has the
    /// wrong scheme, or cannot carry path segments.
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = match self.base_url {
            Some(raw) => parse_url(&raw, &["http", "https"])?,
            None => ClientConfig::default().base_url,
        };
        let stream_url = match self.stream_url {
            Some(raw) => parse_url(&raw, &["ws", "wss"])?,
            None => derive_stream_url(&base_url)?,
        };
        if let Some(key) = &self.api_key {
            if key.chars().any(char::is_control) {
                return Err(Error::InvalidConfig(
                    "API key contains control characters".to_string(),
                ));
            }
        }

        Ok(ClientConfig {
            base_url,
            stream_url,
            api_key: self.api_key,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn parse_url(raw: &str, schemes: &[&str]) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidConfig(format!("{raw}: {e}")))?;
    if !schemes.contains(&url.scheme()) {
        return Err(Error::InvalidConfig(format!(
            "{raw}: scheme must be one of {schemes:?}"
        )));
    }
    if url.cannot_be_a_base() {
        return Err(Error::InvalidConfig(format!("{raw}: not a base URL")));
    }
    Ok(url)
}

fn derive_stream_url(base: &Url) -> Result<Url> {
    let scheme = match base.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(Error::InvalidConfig(format!(
                "cannot derive stream URL from scheme {other}"
            )))
        }
    };
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::InvalidConfig(format!("cannot switch {base} to {scheme}")))?;
    Ok(url)
}
