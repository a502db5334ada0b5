//! OpenAI Adapter
//!
//! OpenAI-compatible chat-completions adapter using the function-calling
//! wire format (`functions`, `function_call: "auto"`, role `function`).

use async_trait::async_trait;
use marketlens_core::config::LlmConfig;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::adapters::openai_parse::parse_chat_completion;
use crate::adapters::transport::{HttpTransport, ReqwestTransport, Transport};
use crate::adapters::{AdapterError, LanguageModel, ModelReply};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::tools::FunctionSchema;
use crate::transcript::Message;

/// OpenAI-compatible adapter
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    /// Base URL (e.g., https://api.openai.com/v1)
    base_url: String,
    /// Model name (e.g., gpt-3.5-turbo)
    model: String,
    /// API key; a request without one fails with a configuration error
    api_key: Option<String>,
    temperature: f64,
    max_tokens: u32,
    /// HTTP transport
    transport: Transport,
    retry: RetryPolicy,
}

impl OpenAiAdapter {
    /// Create adapter from the `[llm]` configuration section
    pub fn from_config(config: &LlmConfig) -> Result<Self, AdapterError> {
        let transport = Transport::Real(ReqwestTransport::with_timeout(config.timeout_seconds)?);
        info!(model = %config.model, base_url = %config.base_url, "Configured OpenAI adapter");
        Ok(Self::with_transport(config, transport))
    }

    /// Create adapter with custom transport (for testing)
    pub fn with_transport(config: &LlmConfig, transport: impl Into<Transport>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            transport: transport.into(),
            retry: RetryPolicy::from(&config.retry),
        }
    }

    /// Replace the retry schedule
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build chat request body from the transcript
    pub fn build_request(
        &self,
        messages: &[Message],
        functions: Option<&[FunctionSchema]>,
    ) -> JsonValue {
        let openai_messages: Vec<JsonValue> = messages.iter().map(wire_message).collect();

        let mut request = json!({
            "model": self.model,
            "messages": openai_messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        if let Some(functions) = functions.filter(|f| !f.is_empty()) {
            request["functions"] = json!(functions);
            request["function_call"] = json!("auto");
        }

        request
    }
}

fn wire_message(message: &Message) -> JsonValue {
    match message {
        Message::System(content) => json!({"role": "system", "content": content}),
        Message::User(content) => json!({"role": "user", "content": content}),
        Message::AssistantText(content) => json!({"role": "assistant", "content": content}),
        Message::AssistantCall(call) => json!({
            "role": "assistant",
            "content": null,
            "function_call": {"name": call.name, "arguments": call.arguments},
        }),
        Message::FunctionResult { name, content } => {
            json!({"role": "function", "name": name, "content": content})
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiAdapter {
    async fn complete(
        &self,
        messages: &[Message],
        functions: Option<&[FunctionSchema]>,
    ) -> Result<ModelReply, AdapterError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AdapterError::Configuration("API key is not set".to_string()))?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_request(messages, functions).to_string();

        let auth_header = format!("Bearer {}", api_key);
        let headers = [
            ("Authorization", auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        debug!(
            model = %self.model,
            messages = messages.len(),
            with_functions = functions.is_some(),
            "Sending chat completion request"
        );
        let response = retry_with_backoff(&self.retry, AdapterError::is_retryable, || {
            self.transport.post_json(&url, &headers, &body)
        })
        .await?;

        parse_chat_completion(&response)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
