//! `query_data` function schema and call parsing
//!
//! The model sees exactly one function. Its arguments arrive as a JSON string
//! that is parsed and validated here before anything touches the dataset.

use marketlens_core::{DataQueryError, Operation, QueryArgs, QueryRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::transcript::FunctionCall;

/// Name of the only function the model may call
pub const QUERY_DATA: &str = "query_data";

/// Function declaration sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object
    pub parameters: JsonValue,
}

/// Errors for a function call that cannot be executed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolCallParseError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Malformed arguments: {0}")]
    Malformed(String),

    #[error("Arguments must be a JSON object")]
    NotAnObject,

    #[error("Invalid arguments: {0}")]
    Invalid(#[from] DataQueryError),
}

/// Schema of `query_data`, with `operation` constrained to the catalogue
pub fn query_data_schema() -> FunctionSchema {
    let operations: Vec<&str> = Operation::ALL.iter().map(Operation::as_str).collect();

    FunctionSchema {
        name: QUERY_DATA.to_string(),
        description: "Query the merged Gold, SPY and Sensex price dataset. \
            Use this for any question about prices, growth, correlation or weekdays."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": operations,
                    "description": "Analysis to run"
                },
                "column_x": {
                    "type": "string",
                    "description": "First column for correlation"
                },
                "column_y": {
                    "type": "string",
                    "description": "Second column for correlation"
                },
                "years": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Trailing window in years for growth (default 5)"
                },
                "index": {
                    "type": "string",
                    "description": "Column for best_day, e.g. SPY_Close"
                },
                "n": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Row count for head or tail (default 5)"
                }
            },
            "required": ["operation"]
        }),
    }
}

/// Turn a model function call into a validated query
pub fn parse_query_call(call: &FunctionCall) -> Result<QueryRequest, ToolCallParseError> {
    if call.name != QUERY_DATA {
        return Err(ToolCallParseError::UnknownFunction(call.name.clone()));
    }

    let value: JsonValue = serde_json::from_str(&call.arguments)
        .map_err(|e| ToolCallParseError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(ToolCallParseError::NotAnObject);
    }

    let args: QueryArgs =
        serde_json::from_value(value).map_err(|e| ToolCallParseError::Malformed(e.to_string()))?;
    Ok(QueryRequest::try_from(args)?)
}
