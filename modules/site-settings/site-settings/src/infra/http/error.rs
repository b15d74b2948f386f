use std::time::Duration;

use thiserror::Error;

/// Errors raised by the HTTP settings store.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    /// Endpoint could not be turned into a request URI
    #[error("Invalid settings endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Endpoint scheme is not allowed by the transport settings
    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },

    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Configured header value is not a valid HTTP header
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// TLS setup failed
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body exceeded size limit
    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Store answered with a non-2xx status
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
    },

    /// Response body is not a settings record
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<hyper::Error> for HttpStoreError {
    fn from(err: hyper::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpStoreError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
