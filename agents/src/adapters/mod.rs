//! LLM Adapters
//!
//! Provider interface used by the session. The only implementation talks to
//! an OpenAI-compatible chat-completions endpoint; tests script it through
//! `FakeTransport` or implement `LanguageModel` directly.

pub mod openai;
pub mod openai_parse;
pub mod transport;
pub mod transport_fake;
pub mod transport_reqwest;
pub mod transport_types;

use async_trait::async_trait;

use crate::tools::FunctionSchema;
use crate::transcript::{FunctionCall, Message};

pub use openai::OpenAiAdapter;
pub use openai_parse::parse_chat_completion;
pub use transport::{AdapterError, FakeTransport, HttpTransport, ReqwestTransport, Transport};

/// What the model answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Plain assistant text
    Text(String),
    /// Request to run a function
    FunctionCall(FunctionCall),
}

/// Chat model interface
///
/// `functions` is `None` when the model must answer in text only.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        functions: Option<&[FunctionSchema]>,
    ) -> Result<ModelReply, AdapterError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;

    fn model(&self) -> &str;
}
