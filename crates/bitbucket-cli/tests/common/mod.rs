//! Shared scenario helpers.
//!
//! Scenarios run the real `BitbucketClient` against an `httpmock` stub of the
//! Bitbucket REST API, so requests go through the same path as in production.

#![allow(dead_code)]

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use bitbucket_api::BitbucketClient;
use bitbucket_core::{BitbucketConfig, Credentials};
use bitbucket_mcp::protocol::ToolCallResult;
use bitbucket_mcp::{transport, McpServer, StdioTransport, ToolHandler};
use httpmock::MockServer;
use serde_json::{json, Value};

pub const TOKEN: &str = "scenario-token";

/// Tool handler talking to the stub server.
pub fn handler(server: &MockServer) -> Arc<ToolHandler> {
    handler_with(server, |config| config)
}

/// Tool handler with extra configuration applied (default workspace, username).
pub fn handler_with(
    server: &MockServer,
    configure: impl FnOnce(BitbucketConfig) -> BitbucketConfig,
) -> Arc<ToolHandler> {
    let config = configure(BitbucketConfig::new(
        server.base_url(),
        Credentials::Bearer {
            token: TOKEN.to_string(),
        },
    ));
    let client = BitbucketClient::new(&config).unwrap();
    Arc::new(ToolHandler::new(Arc::new(config), Arc::new(client)))
}

/// Render a dispatch outcome the way `tools/call` reports it.
pub async fn call(handler: &ToolHandler, tool: &str, arguments: Value) -> ToolCallResult {
    match handler.dispatch(tool, Some(arguments)).await {
        Ok(output) => output.into_result(),
        Err(e) => bitbucket_mcp::format::error_result(&e),
    }
}

pub fn text(result: &ToolCallResult) -> &str {
    result.first_text().unwrap_or_default()
}

/// Parse the JSON carried by a successful tool result.
pub fn json_text(result: &ToolCallResult) -> Value {
    assert_eq!(result.is_error, None, "tool failed: {}", text(result));
    serde_json::from_str(text(result)).unwrap()
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Feed `lines` to a stdio session and collect every response line.
pub async fn run_stdio(handler: Arc<ToolHandler>, lines: &[Value]) -> Vec<Value> {
    let input: String = lines.iter().map(|line| format!("{}\n", line)).collect();
    let output = Arc::new(Mutex::new(Vec::new()));
    let mut stdio = StdioTransport::new(
        Box::new(Cursor::new(input)),
        Box::new(SharedWriter(output.clone())),
    );

    let server = McpServer::new(handler);
    transport::serve(&server, &mut stdio).await.unwrap();

    let bytes = output.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

pub fn initialize(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "scenario", "version": "0.0.0"}
        }
    })
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}
