//! Conversation transcript
//!
//! Ordered message history of one session. The first entry is always the
//! system instruction, and a function result always directly follows the
//! assistant function call that requested it.

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Function => "function",
        }
    }
}

/// Function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON argument string, exactly as the model sent it
    pub arguments: String,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System(String),
    User(String),
    AssistantText(String),
    AssistantCall(FunctionCall),
    /// Serialized function result
    FunctionResult { name: String, content: String },
}

impl Message {
    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::AssistantText(_) | Message::AssistantCall(_) => Role::Assistant,
            Message::FunctionResult { .. } => Role::Function,
        }
    }

    /// Human-readable content for display
    pub fn display_content(&self) -> String {
        match self {
            Message::System(text) | Message::User(text) | Message::AssistantText(text) => {
                text.clone()
            }
            Message::AssistantCall(call) => format!("{}({})", call.name, call.arguments),
            Message::FunctionResult { content, .. } => content.clone(),
        }
    }
}

/// Session transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript with the system instruction
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::System(system_prompt.into())],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::User(text.into()));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::AssistantText(text.into()));
    }

    /// Append a function call together with its result
    ///
    /// Both are pushed in one step so a call never sits in the transcript
    /// without its answer.
    pub fn push_function_exchange(&mut self, call: FunctionCall, content: String) {
        let name = call.name.clone();
        self.messages.push(Message::AssistantCall(call));
        self.messages.push(Message::FunctionResult { name, content });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop everything after the first `len` messages (never the system entry)
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }

    /// `(role, content)` pairs in order, for the presentation layer
    pub fn display_pairs(&self) -> Vec<(Role, String)> {
        self.messages
            .iter()
            .map(|message| (message.role(), message.display_content()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_with_system() {
        let transcript = Transcript::new("be precise");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0], Message::System("be precise".into()));
    }

    #[test]
    fn test_function_exchange_is_adjacent() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("growth?");
        transcript.push_function_exchange(
            FunctionCall {
                name: "query_data".into(),
                arguments: r#"{"operation":"growth"}"#.into(),
            },
            r#"{"spy_growth_pct":10.0,"sensex_growth_pct":10.0}"#.into(),
        );

        let roles: Vec<Role> = transcript.messages().iter().map(Message::role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Function]
        );
        assert!(matches!(
            &transcript.messages()[3],
            Message::FunctionResult { name, .. } if name == "query_data"
        ));
    }

    #[test]
    fn test_truncate_keeps_system() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("a");
        transcript.push_assistant("b");
        transcript.truncate(0);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_display_pairs() {
        let mut transcript = Transcript::new("sys");
        transcript.push_user("hi");
        transcript.push_assistant("hello");
        let pairs = transcript.display_pairs();
        assert_eq!(pairs[1], (Role::User, "hi".to_string()));
        assert_eq!(pairs[2].0.as_str(), "assistant");
    }
}
