//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - dispatch to the tool handler
//! 3. Shutdown - end of input (stdio) or stream drop (SSE)
//!
//! One `McpServer` holds the protocol state of one client. Stdio mode has a
//! single instance; the SSE transport creates one per session, all sharing
//! the same [`ToolHandler`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bitbucket_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::format::error_result;
use crate::handlers::ToolHandler;
use crate::protocol::{
    IncomingMessage, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, RequestId, ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
    ToolsListResult, MCP_VERSION, SERVER_NAME,
};
use crate::transport::{self, StdioTransport};

/// MCP server for one client session.
pub struct McpServer {
    handler: Arc<ToolHandler>,
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(handler: Arc<ToolHandler>) -> Self {
        Self {
            handler,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Serve this session over stdin/stdout until end of input.
    pub async fn run_stdio(&self) -> Result<()> {
        info!(
            tools = self.handler.registry().len(),
            "Starting MCP server on stdio"
        );

        let mut transport = StdioTransport::stdio();
        transport::serve(self, &mut transport).await?;

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle an incoming message. Notifications produce no response.
    pub async fn handle_message(&self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %req.method, id = ?req.id, "Handling request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => self.handle_ping(req.id),
            method => {
                warn!(method, "Unknown method");
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled by client");
            }
            _ => {
                debug!(method, "Ignoring notification");
            }
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => {
                    info!(
                        client = %init.client_info.name,
                        version = %init.client_info.version,
                        protocol = %init.protocol_version,
                        "Client connected"
                    );
                }
                Err(e) => {
                    warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        success(id, &result)
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        success(id, &result)
    }

    /// Unknown tools become JSON-RPC errors; every other failure is reported
    /// inside the tool result with `isError` set.
    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(&e.to_string()));
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        info!(tool = %params.name, "Calling tool");

        match self.handler.dispatch(&params.name, params.arguments).await {
            Ok(output) => success(id, &output.into_result()),
            Err(Error::UnknownTool(name)) => {
                warn!(tool = %name, "Unknown tool");
                JsonRpcResponse::error(id, JsonRpcError::unknown_tool(&name))
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                success(id, &error_result(&e))
            }
        }
    }

    fn handle_ping(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, serde_json::json!({}))
    }
}

fn success<T: Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(&e.to_string())),
    }
}
