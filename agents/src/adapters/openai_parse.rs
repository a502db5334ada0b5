//! OpenAI response parsing
//!
//! Public functions for parsing OpenAI chat-completion JSON.

use serde_json::Value as JsonValue;

use crate::adapters::{AdapterError, ModelReply};
use crate::transcript::FunctionCall;

/// Parse OpenAI chat completion JSON response
///
/// Accepts the legacy `function_call` field as well as the first entry of
/// `tool_calls`. An `error` object in the body becomes `AdapterError::Provider`.
pub fn parse_chat_completion(response: &str) -> Result<ModelReply, AdapterError> {
    let json: JsonValue = serde_json::from_str(response)?;

    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        return Err(AdapterError::Provider {
            code: error
                .get("code")
                .or_else(|| error.get("type"))
                .and_then(|c| c.as_str())
                .unwrap_or("unknown")
                .to_string(),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    let message = json["choices"]
        .get(0)
        .and_then(|c| c.get("message"))
        .ok_or_else(|| AdapterError::InvalidResponse("Missing choices[0].message".to_string()))?;

    let call = message
        .get("function_call")
        .filter(|c| !c.is_null())
        .or_else(|| {
            message
                .get("tool_calls")
                .and_then(|calls| calls.get(0))
                .and_then(|call| call.get("function"))
        });
    if let Some(call) = call {
        return parse_function_call(call).map(ModelReply::FunctionCall);
    }

    message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|content| ModelReply::Text(content.to_string()))
        .ok_or_else(|| {
            AdapterError::InvalidResponse("Missing choices[0].message.content".to_string())
        })
}

fn parse_function_call(call: &JsonValue) -> Result<FunctionCall, AdapterError> {
    let name = call
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| AdapterError::InvalidResponse("Function call without name".to_string()))?;

    // Arguments are normally a JSON string; tolerate an inline object.
    let arguments = match call.get("arguments") {
        Some(JsonValue::String(raw)) => raw.clone(),
        Some(JsonValue::Null) | None => "{}".to_string(),
        Some(other) => other.to_string(),
    };

    Ok(FunctionCall {
        name: name.to_string(),
        arguments,
    })
}
