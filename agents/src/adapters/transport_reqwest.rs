//! Real HTTP transport using reqwest

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::adapters::transport_types::{AdapterError, HttpTransport};

/// Real HTTP transport using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create new transport with default timeout (30s)
    pub fn new() -> Result<Self, AdapterError> {
        Self::with_timeout(30)
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdapterError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        let mut request = self.client.post(url).body(body.to_string());
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "Provider response");

        if !status.is_success() {
            return Err(AdapterError::from_status(
                status.as_u16(),
                text,
                retry_after.as_deref(),
            ));
        }
        Ok(text)
    }
}
