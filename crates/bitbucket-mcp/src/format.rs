//! Rendering of handler output into MCP tool results.

use bitbucket_core::Error;
use serde_json::{json, Value};

use crate::protocol::ToolCallResult;

/// What a tool handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured result, pretty-printed for the client
    Json(Value),
    /// Raw text (diffs, logs, confirmations), passed through byte-for-byte
    Text(String),
}

impl ToolOutput {
    pub fn into_result(self) -> ToolCallResult {
        match self {
            ToolOutput::Json(value) => ToolCallResult::text(pretty(&value)),
            ToolOutput::Text(text) => ToolCallResult::text(text),
        }
    }
}

/// Render a failed tool call as an `isError` result.
///
/// Upstream failures keep the status and raw body so the caller can see
/// exactly what Bitbucket returned.
pub fn error_result(err: &Error) -> ToolCallResult {
    match err {
        Error::Upstream {
            status,
            message,
            body,
        } => ToolCallResult::error(pretty(&json!({
            "error": err.to_string(),
            "status": status,
            "message": message,
            "body": body,
        }))),
        other => ToolCallResult::error(other.to_string()),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
