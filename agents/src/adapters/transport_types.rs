//! Transport types
//!
//! Common types shared across transport implementations.

use async_trait::async_trait;

/// Adapter errors
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Network error (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited
    #[error("Rate limited{retry_after}")]
    RateLimited { retry_after: String },

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider-specific error (see response body)
    #[error("Provider error: {code} - {message}")]
    Provider { code: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(String),
}

impl AdapterError {
    /// Rate limiting, network faults and 5xx responses are transient
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::RateLimited { .. } | AdapterError::Network(_) => true,
            AdapterError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a non-2xx status to an error
    pub fn from_status(status: u16, body: String, retry_after: Option<&str>) -> Self {
        match status {
            401 => AdapterError::Authentication(body),
            429 => AdapterError::RateLimited {
                retry_after: retry_after
                    .map(|secs| format!(" (retry after {}s)", secs))
                    .unwrap_or_default(),
            },
            _ => AdapterError::Http {
                status,
                message: body,
            },
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AdapterError::from_status(status.as_u16(), err.to_string(), None),
            None => AdapterError::Network(err.to_string()),
        }
    }
}

/// Asynchronous HTTP transport
///
/// Abstraction over HTTP client to enable testing with FakeTransport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST JSON request and return response body
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError>;
}
