//! Core types, configuration, and error handling for bitbucket-mcp.
//!
//! This crate provides the foundational pieces shared by the API client,
//! the MCP server and the CLI.

pub mod branching;
pub mod config;
pub mod error;

pub use config::{BitbucketConfig, Config, Credentials, ServerSettings, Settings, TransportKind};
pub use error::{Error, Result};
