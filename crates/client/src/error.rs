use std::path::PathBuf;

use printables_core::payload::PayloadError;

use crate::config::ConfigError;

/// Errors from the backend client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status not covered below.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The session cookie is missing or expired.
    #[error("Not authenticated")]
    Unauthorized,

    /// The draft could not be turned into a request.
    #[error("Cannot build request: {0}")]
    Payload(#[from] PayloadError),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An upload read from disk is over the size limit.
    #[error("{} is {size} bytes; uploads must be under {limit} bytes", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
