//! Fake transport for testing
//!
//! Replays scripted responses instead of real HTTP calls and records every
//! request body it receives.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::adapters::transport_types::{AdapterError, HttpTransport};

/// Fake transport for testing (uses fixture strings)
///
/// Clones share the same script and request log, so a test can keep one
/// handle while the adapter owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    responses: Arc<Mutex<VecDeque<Result<String, AdapterError>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    /// Create fake transport with one response
    pub fn new(response: &str) -> Self {
        Self::default().then_body(response)
    }

    /// Create fake transport that returns a network error
    pub fn with_error(msg: &str) -> Self {
        Self::default().then_error(AdapterError::Network(msg.to_string()))
    }

    /// Queue a successful response body
    pub fn then_body(self, body: &str) -> Self {
        self.push(Ok(body.to_string()));
        self
    }

    /// Queue an HTTP status failure
    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.push(Err(AdapterError::from_status(status, body.to_string(), None)));
        self
    }

    /// Queue an arbitrary error
    pub fn then_error(self, err: AdapterError) -> Self {
        self.push(Err(err));
        self
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn push(&self, response: Result<String, AdapterError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post_json(
        &self,
        _url: &str,
        _headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(body.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
            .unwrap_or_else(|| Err(AdapterError::Network("fake transport exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_transport_basic() {
        let transport = FakeTransport::new("test response");
        let result = transport.post_json("http://test", &[], "{}").await;
        assert_eq!(result.unwrap(), "test response");
        assert_eq!(transport.requests(), vec!["{}"]);
    }

    #[tokio::test]
    async fn test_fake_transport_with_error() {
        let transport = FakeTransport::with_error("test error");
        let result = transport.post_json("http://test", &[], "{}").await;
        assert!(matches!(result, Err(AdapterError::Network(_))));
    }

    #[tokio::test]
    async fn test_fake_transport_script_order() {
        let transport = FakeTransport::default()
            .then_status(429, "slow down")
            .then_body("ok");
        let handle = transport.clone();

        assert!(transport.post_json("u", &[], "a").await.unwrap_err().is_retryable());
        assert_eq!(transport.post_json("u", &[], "b").await.unwrap(), "ok");
        assert!(transport.post_json("u", &[], "c").await.is_err());
        assert_eq!(handle.requests().len(), 3);
    }
}
