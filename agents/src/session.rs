//! Chat session
//!
//! One session owns one transcript. Each `ask` runs a short state machine:
//!
//! ```text
//! Dispatching ──text──────────────────────────────► Responding
//!      │
//!      └─function call─► Executing ──ok──► Summarizing ──► Responding
//!                            │
//!                            └─error─────────────────────► Responding (refusal)
//! ```
//!
//! At most one function call runs per turn. The summarizing request carries
//! no function schema, so the model has to answer in text.

use marketlens_core::{AppConfig, Dataset, FallbackPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::{AdapterError, LanguageModel, ModelReply};
use crate::tools::{parse_query_call, query_data_schema, FunctionSchema};
use crate::transcript::{FunctionCall, Transcript};

/// Answer given whenever the data cannot support a reply
pub const REFUSAL_TEXT: &str = "Sorry, I don't have the data to answer that question.";

/// Turn failures surfaced to the caller
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Model request failed: {0}")]
    Provider(#[from] AdapterError),
}

/// Session behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub fallback: FallbackPolicy,
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            fallback: config.assistant.fallback,
        }
    }
}

enum TurnState {
    Dispatching,
    Executing(FunctionCall),
    Summarizing,
    Responding(String),
}

/// Conversation with the model over a shared dataset
pub struct Session {
    id: Uuid,
    model: Arc<dyn LanguageModel>,
    dataset: Arc<Dataset>,
    transcript: Transcript,
    options: SessionOptions,
    functions: Vec<FunctionSchema>,
}

impl Session {
    pub fn new(model: Arc<dyn LanguageModel>, dataset: Arc<Dataset>, options: SessionOptions) -> Self {
        let id = Uuid::new_v4();
        let transcript = Transcript::new(system_prompt(&dataset));
        info!(
            session = %id,
            provider = model.provider_name(),
            model = model.model(),
            fallback = ?options.fallback,
            "Started chat session"
        );

        Self {
            id,
            model,
            dataset,
            transcript,
            options,
            functions: vec![query_data_schema()],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Answer one user question
    ///
    /// On a provider failure the transcript is restored to its state before
    /// the call and the session remains usable.
    pub async fn ask(&mut self, text: &str) -> Result<String, TurnError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(TurnError::EmptyQuery);
        }

        let checkpoint = self.transcript.len();
        self.transcript.push_user(question);

        match self.run_turn().await {
            Ok(answer) => {
                self.transcript.push_assistant(answer.as_str());
                Ok(answer)
            }
            Err(err) => {
                warn!(session = %self.id, "Turn failed, rolling back transcript: {}", err);
                self.transcript.truncate(checkpoint);
                Err(err.into())
            }
        }
    }

    async fn run_turn(&mut self) -> Result<String, AdapterError> {
        let mut state = TurnState::Dispatching;
        loop {
            state = match state {
                TurnState::Dispatching => {
                    let reply = self
                        .model
                        .complete(self.transcript.messages(), Some(self.functions.as_slice()))
                        .await?;
                    match reply {
                        ModelReply::Text(text) => TurnState::Responding(self.fallback(text)),
                        ModelReply::FunctionCall(call) => TurnState::Executing(call),
                    }
                }
                TurnState::Executing(call) => match self.execute(&call) {
                    Some(content) => {
                        self.transcript.push_function_exchange(call, content);
                        TurnState::Summarizing
                    }
                    None => TurnState::Responding(REFUSAL_TEXT.to_string()),
                },
                TurnState::Summarizing => {
                    let reply = self.model.complete(self.transcript.messages(), None).await?;
                    match reply {
                        ModelReply::Text(text) => TurnState::Responding(text),
                        ModelReply::FunctionCall(call) => {
                            warn!(function = %call.name, "Second function call in one turn");
                            TurnState::Responding(REFUSAL_TEXT.to_string())
                        }
                    }
                }
                TurnState::Responding(answer) => return Ok(answer),
            };
        }
    }

    /// Run the requested query; `None` when the answer must be a refusal
    fn execute(&self, call: &FunctionCall) -> Option<String> {
        let request = match parse_query_call(call) {
            Ok(request) => request,
            Err(err) => {
                warn!(session = %self.id, "Rejected function call: {}", err);
                return None;
            }
        };

        let result = self.dataset.execute(&request);
        if result.is_error() {
            debug!(operation = %request.operation(), "Query returned an error result");
            return None;
        }

        match serde_json::to_string(&result) {
            Ok(content) => {
                debug!(operation = %request.operation(), bytes = content.len(), "Query executed");
                Some(content)
            }
            Err(err) => {
                warn!("Failed to serialize query result: {}", err);
                None
            }
        }
    }

    fn fallback(&self, text: String) -> String {
        match self.options.fallback {
            FallbackPolicy::Refuse => {
                debug!("Model answered without data, refusing");
                REFUSAL_TEXT.to_string()
            }
            FallbackPolicy::Direct => text,
        }
    }
}

fn system_prompt(dataset: &Dataset) -> String {
    let range = match (dataset.first_date(), dataset.last_date()) {
        (Some(first), Some(last)) => format!("from {} to {}", first, last),
        _ => "with no rows".to_string(),
    };

    format!(
        "You are a financial data assistant. Answer questions only from the daily \
         Gold, SPY and Sensex price dataset, which covers {range}. \
         Columns: {columns}. \
         Call the query_data function to get figures; never invent numbers. \
         If the data cannot answer a question, reply exactly: {refusal}",
        range = range,
        columns = dataset.column_names().join(", "),
        refusal = REFUSAL_TEXT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_error_display() {
        assert_eq!(TurnError::EmptyQuery.to_string(), "Query is empty");
        let err: TurnError = AdapterError::Network("down".into()).into();
        assert!(err.to_string().contains("Network error: down"));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AppConfig::default();
        assert_eq!(SessionOptions::from(&config).fallback, FallbackPolicy::Refuse);
        config.assistant.fallback = FallbackPolicy::Direct;
        assert_eq!(SessionOptions::from(&config).fallback, FallbackPolicy::Direct);
    }
}
