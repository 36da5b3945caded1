//! Error types for Evolab
//!
//! Every failure carries a kind ([`ErrorKind`]) so callers can tell an
//! experiment that is gone from a service that is merely unhappy.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for branching in calling code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service rejected the call or could not be reached.
    Remote,
    /// The referenced experiment (or other resource) does not exist.
    NotFound,
    /// A live record stream ended abnormally.
    StreamClosed,
    /// A payload could not be decoded.
    Decode,
    /// The client was configured with unusable values.
    Config,
}

/// Evolab error types
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success response from the service
    #[error("Remote service error ({status}): {reason}")]
    Remote {
        /// HTTP status code returned by the service
        status: u16,
        /// Human-readable reason (response body or canonical status text)
        reason: String,
    },

    /// The service reported that the resource does not exist
    #[error("Not found: {resource}")]
    NotFound {
        /// Request path of the missing resource
        resource: String,
    },

    /// Live stream ended because of a transport fault or an undecodable frame
    #[error("Record stream closed abnormally: {reason}")]
    StreamClosed {
        /// What ended the stream
        reason: String,
    },

    /// HTTP transport error (boxed to keep enum small)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<reqwest::Error>),

    /// WebSocket handshake or transport error (boxed to keep enum small)
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Box<tokio_tungstenite::tungstenite::Error>),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote { .. } | Self::Http(_) | Self::WebSocket(_) => ErrorKind::Remote,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StreamClosed { .. } => ErrorKind::StreamClosed,
            Self::Json(_) => ErrorKind::Decode,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// True if the service no longer knows the referenced resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound)
    }

    /// HTTP status of the failed call, when the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}
