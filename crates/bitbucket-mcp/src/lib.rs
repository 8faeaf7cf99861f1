//! MCP (Model Context Protocol) server exposing Bitbucket Cloud as tools.
//!
//! The tool catalogue lives in [`tools`], the handlers that forward tool
//! calls to the Bitbucket REST API in [`handlers`]. [`McpServer`] drives the
//! protocol lifecycle and is served over stdio ([`transport`]) or HTTP/SSE
//! ([`sse`]).

pub mod format;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod sse;
pub mod tools;
pub mod transport;

pub use format::ToolOutput;
pub use handlers::ToolHandler;
pub use server::McpServer;
pub use tools::{ToolDescriptor, ToolRegistry, TOOLS};
pub use transport::StdioTransport;
