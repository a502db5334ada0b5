//! MarketLens Agents Module
//!
//! The agents module drives the conversation with the chat model: it keeps
//! the per-session transcript, offers the model the single `query_data`
//! function, runs that function against the shared dataset and asks the
//! model to phrase the final answer.

pub mod adapters;
pub mod retry;
pub mod session;
pub mod tools;
pub mod transcript;

pub use adapters::{
    parse_chat_completion, AdapterError, FakeTransport, HttpTransport, LanguageModel, ModelReply,
    OpenAiAdapter, ReqwestTransport,
};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use session::{Session, SessionOptions, TurnError, REFUSAL_TEXT};
pub use tools::{parse_query_call, query_data_schema, FunctionSchema, ToolCallParseError, QUERY_DATA};
pub use transcript::{FunctionCall, Message, Role, Transcript};
