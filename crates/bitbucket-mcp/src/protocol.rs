//! MCP protocol types based on JSON-RPC 2.0.
//!
//! Both transports exchange the same envelopes; only the framing differs
//! (one JSON document per line on stdio, one document per POST body or SSE
//! event over HTTP).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version.
pub const MCP_VERSION: &str = "2024-11-05";

/// Server name reported in `initialize`.
pub const SERVER_NAME: &str = "bitbucket-mcp";

/// JSON-RPC request message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC response message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC notification (no response expected).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Request ID - can be string, number, or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    Null,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes
impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    fn new(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
        }
    }

    pub fn parse_error(msg: &str) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {}", msg))
    }

    pub fn invalid_request(msg: &str) -> Self {
        Self::new(Self::INVALID_REQUEST, format!("Invalid request: {}", msg))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(msg: &str) -> Self {
        Self::new(Self::INVALID_PARAMS, format!("Invalid params: {}", msg))
    }

    /// Unknown tool names are protocol errors, not tool failures.
    pub fn unknown_tool(name: &str) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: format!("Unknown tool: {}", name),
            data: Some(serde_json::json!({ "tool": name })),
        }
    }

    pub fn internal_error(msg: &str) -> Self {
        Self::new(Self::INTERNAL_ERROR, format!("Internal error: {}", msg))
    }
}

impl JsonRpcResponse {
    /// Create a successful response.
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// A frame that could not be turned into a message.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Not JSON at all
    Parse(String),
    /// Valid JSON but not a JSON-RPC message; `id` is recovered when present
    Invalid { id: RequestId, message: String },
}

impl FrameError {
    /// JSON-RPC error response answering the bad frame.
    pub fn into_response(self) -> JsonRpcResponse {
        match self {
            FrameError::Parse(msg) => {
                JsonRpcResponse::error(RequestId::Null, JsonRpcError::parse_error(&msg))
            }
            FrameError::Invalid { id, message } => {
                JsonRpcResponse::error(id, JsonRpcError::invalid_request(&message))
            }
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Parse(msg) => write!(f, "Invalid JSON: {}", msg),
            FrameError::Invalid { message, .. } => {
                write!(f, "Invalid JSON-RPC message: {}", message)
            }
        }
    }
}

/// Parse one framed JSON-RPC message.
///
/// Messages with an `id` are requests, messages without one are notifications.
pub fn parse_message(frame: &str) -> Result<IncomingMessage, FrameError> {
    let value: Value =
        serde_json::from_str(frame).map_err(|e| FrameError::Parse(e.to_string()))?;

    let id = value.get("id").cloned();
    let parsed = match &id {
        Some(_) => serde_json::from_value(value).map(IncomingMessage::Request),
        None => serde_json::from_value(value).map(IncomingMessage::Notification),
    };

    parsed.map_err(|e| FrameError::Invalid {
        id: id
            .and_then(|id| serde_json::from_value(id).ok())
            .unwrap_or(RequestId::Null),
        message: e.to_string(),
    })
}

// ============================================================================
// MCP-specific types
// ============================================================================

/// MCP initialization request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

/// Client info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// MCP initialization response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Server capabilities. Only tools are offered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

/// Server info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Tool definition for tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Tools list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

/// Tool call request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Tool call result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolResultContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content in tool result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ToolResultContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResult {
    /// Create a successful text result.
    pub fn text(content: String) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: content }],
            is_error: None,
        }
    }

    /// Create an error result.
    pub fn error(message: String) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: message }],
            is_error: Some(true),
        }
    }

    /// Text of the first content item.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolResultContent::Text { text } => text.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Number(1),
            method: "initialize".to_string(),
            params: Some(serde_json::json!({"test": true})),
        };

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
    }

    #[test]
    fn test_response_error() {
        let resp =
            JsonRpcResponse::error(RequestId::Number(1), JsonRpcError::method_not_found("test"));

        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_unknown_tool_error() {
        let err = JsonRpcError::unknown_tool("deleteEverything");
        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
        assert!(err.message.contains("deleteEverything"));
        assert_eq!(err.data.unwrap()["tool"], "deleteEverything");
    }

    #[test]
    fn test_tool_call_result_envelope() {
        let result = ToolCallResult::text("Hello".to_string());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"content": [{"type": "text", "text": "Hello"}]})
        );
        assert_eq!(result.first_text(), Some("Hello"));

        let err = ToolCallResult::error("Something failed".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn test_request_id_variants() {
        assert_eq!(serde_json::to_string(&RequestId::Number(42)).unwrap(), "42");
        assert_eq!(
            serde_json::to_string(&RequestId::String("abc".to_string())).unwrap(),
            "\"abc\""
        );
        assert_eq!(serde_json::to_string(&RequestId::Null).unwrap(), "null");
    }

    #[test]
    fn test_parse_request() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","id":"a-1","method":"tools/list"}"#).unwrap();
        match msg {
            IncomingMessage::Request(req) => {
                assert_eq!(req.method, "tools/list");
                assert_eq!(req.id, RequestId::String("a-1".to_string()));
            }
            other => panic!("Expected request, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_notification() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .unwrap();
        assert!(matches!(msg, IncomingMessage::Notification(n) if n.method == "notifications/initialized"));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_message("not json").unwrap_err();
        assert!(matches!(err, FrameError::Parse(_)));

        let resp = err.into_response();
        assert_eq!(resp.id, RequestId::Null);
        assert_eq!(resp.error.unwrap().code, JsonRpcError::PARSE_ERROR);
    }

    #[test]
    fn test_parse_invalid_request_keeps_id() {
        let err = parse_message(r#"{"jsonrpc":"2.0","id":5}"#).unwrap_err();
        assert!(matches!(err, FrameError::Invalid { id: RequestId::Number(5), .. }));

        let resp = err.into_response();
        assert_eq!(resp.id, RequestId::Number(5));
        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }

    #[test]
    fn test_parse_invalid_notification() {
        let err = parse_message(r#"{"jsonrpc":"2.0","params":{}}"#).unwrap_err();
        assert_eq!(
            err.into_response().error.unwrap().code,
            JsonRpcError::INVALID_REQUEST
        );
        assert!(matches!(
            parse_message("[1, 2]"),
            Err(FrameError::Invalid { id: RequestId::Null, .. })
        ));
    }

    #[test]
    fn test_cancel_notification_keeps_params() {
        let msg = parse_message(
            r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":7}}"#,
        )
        .unwrap();
        match msg {
            IncomingMessage::Notification(n) => {
                assert_eq!(n.params.unwrap()["requestId"], 7);
            }
            other => panic!("Expected notification, got {other:?}"),
        }
    }
}
