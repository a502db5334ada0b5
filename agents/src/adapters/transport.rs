//! HTTP Transport for LLM Adapters

pub use crate::adapters::transport_fake::FakeTransport;
pub use crate::adapters::transport_reqwest::ReqwestTransport;
pub use crate::adapters::transport_types::{AdapterError, HttpTransport};

use async_trait::async_trait;

/// Concrete transport enum
///
/// Wraps all transport types so adapters stay free of generics.
#[derive(Debug, Clone)]
pub enum Transport {
    Real(ReqwestTransport),
    Fake(FakeTransport),
}

#[async_trait]
impl HttpTransport for Transport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        match self {
            Transport::Real(t) => t.post_json(url, headers, body).await,
            Transport::Fake(t) => t.post_json(url, headers, body).await,
        }
    }
}

impl From<FakeTransport> for Transport {
    fn from(fake: FakeTransport) -> Self {
        Transport::Fake(fake)
    }
}
