//! Transport layer for MCP JSON-RPC communication.
//!
//! Stdio mode uses newline-delimited JSON over stdin/stdout. Only JSON-RPC
//! goes to stdout; logs are written to stderr by the binary.

use std::io::{self, BufRead, Write};

use bitbucket_core::{Error, Result};
use tracing::{debug, error, info, warn};

use crate::protocol::{parse_message, JsonRpcResponse};
use crate::server::McpServer;

/// Transport for reading/writing JSON-RPC messages.
pub struct StdioTransport {
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
}

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self {
            reader: Box::new(io::BufReader::new(io::stdin())),
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a transport with custom reader/writer.
    pub fn new(reader: Box<dyn BufRead + Send>, writer: Box<dyn Write + Send>) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-blank line. `None` means end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                debug!("Received: {}", trimmed);
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Write a JSON-RPC response as one line and flush it.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        debug!("Sending: {}", json);

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }
}

/// Run one stdio session: read, handle and answer messages in order until
/// end of input.
///
/// A line that is not JSON is answered with a parse error, a JSON value that
/// is not a JSON-RPC message with an invalid-request error carrying its id.
/// Reading continues in both cases. Read or write failures end the session.
pub async fn serve(server: &McpServer, transport: &mut StdioTransport) -> Result<()> {
    loop {
        let line = match transport.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("EOF received, shutting down");
                return Ok(());
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                return Err(Error::Transport(format!("read failed: {}", e)));
            }
        };

        let response = match parse_message(&line) {
            Ok(msg) => server.handle_message(msg).await,
            Err(e) => {
                warn!("Failed to parse message: {}", e);
                Some(e.into_response())
            }
        };

        if let Some(response) = response {
            if let Err(e) = transport.write_response(&response) {
                error!("Failed to write response: {}", e);
                return Err(Error::Transport(format!("write failed: {}", e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ToolHandler;
    use crate::protocol::{JsonRpcError, RequestId};
    use async_trait::async_trait;
    use bitbucket_api::{ApiRequest, ApiResponse, BitbucketApi};
    use bitbucket_core::{BitbucketConfig, Credentials};
    use serde_json::Value;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

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

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct EchoApi;

    #[async_trait]
    impl BitbucketApi for EchoApi {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
            Ok(ApiResponse::Json(serde_json::json!({ "path": request.path })))
        }
    }

    fn server() -> McpServer {
        let config = BitbucketConfig::new(
            "https://api.bitbucket.org/2.0",
            Credentials::Bearer {
                token: "t".to_string(),
            },
        );
        McpServer::new(Arc::new(ToolHandler::new(
            Arc::new(config),
            Arc::new(EchoApi),
        )))
    }

    fn transport(input: &str) -> (StdioTransport, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let transport = StdioTransport::new(
            Box::new(Cursor::new(input.to_string())),
            Box::new(SharedWriter(buffer.clone())),
        );
        (transport, buffer)
    }

    fn output_lines(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<Value> {
        String::from_utf8(buffer.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_read_line_skips_blank_lines() {
        let (mut transport, _) = transport("\n  \n{\"a\":1}\n");
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(transport.read_line().unwrap().is_none());
    }

    #[test]
    fn test_read_eof() {
        let (mut transport, _) = transport("");
        assert!(transport.read_line().unwrap().is_none());
    }

    #[test]
    fn test_write_response() {
        let (mut transport, buffer) = transport("");
        let response =
            JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"test": true}));

        transport.write_response(&response).unwrap();

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.ends_with('\n'));
        assert!(output.contains("\"jsonrpc\":\"2.0\""));
        assert!(output.contains("\"id\":1"));
    }

    #[tokio::test]
    async fn test_serve_session() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"1"}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"getRepository","arguments":{"workspace":"acme","repo_slug":"api"}}}"#,
        ]
        .join("\n");
        let (mut transport, buffer) = transport(&input);
        let server = server();

        serve(&server, &mut transport).await.unwrap();

        let lines = output_lines(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["id"], 2);
        let text = lines[1]["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("/repositories/acme/api"));
    }

    #[tokio::test]
    async fn test_serve_continues_after_parse_error() {
        let input = "this is not json\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"ping\"}\n";
        let (mut transport, buffer) = transport(input);

        serve(&server(), &mut transport).await.unwrap();

        let lines = output_lines(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[0]["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert_eq!(lines[1]["id"], 9);
        assert_eq!(lines[1]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_serve_answers_invalid_request_with_its_id() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":5}\n{\"jsonrpc\":\"2.0\",\"id\":6,\"method\":\"ping\"}\n";
        let (mut transport, buffer) = transport(input);

        serve(&server(), &mut transport).await.unwrap();

        let lines = output_lines(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 5);
        assert_eq!(lines[0]["error"]["code"], JsonRpcError::INVALID_REQUEST);
        assert_eq!(lines[1]["id"], 6);
    }

    #[tokio::test]
    async fn test_serve_stops_on_write_failure() {
        let mut transport = StdioTransport::new(
            Box::new(Cursor::new(
                "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n".to_string(),
            )),
            Box::new(BrokenWriter),
        );

        let err = serve(&server(), &mut transport).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
