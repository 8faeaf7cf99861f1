//! Error types for bitbucket-mcp.

use thiserror::Error;

/// Main error type for bitbucket-mcp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool name is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not satisfy the tool's parameter schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Bitbucket returned a non-2xx response
    #[error("Bitbucket API error: {status} - {}", message.as_deref().unwrap_or(body))]
    Upstream {
        status: u16,
        /// Message parsed from the Bitbucket error envelope, if any
        message: Option<String>,
        /// Raw response body
        body: String,
    },

    /// HTTP request could not be completed
    #[error("HTTP error: {0}")]
    Http(String),

    /// No usable credentials were configured
    #[error("Authentication missing: set BITBUCKET_TOKEN or BITBUCKET_USERNAME and BITBUCKET_PASSWORD")]
    AuthenticationMissing,

    /// Response body did not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Malformed frame or broken connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an upstream error from a status code and the raw response body.
    ///
    /// Bitbucket wraps failures as `{"type": "error", "error": {"message": ...}}`;
    /// the message is extracted when the body has that shape.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            });

        Error::Upstream {
            status,
            message,
            body,
        }
    }

    /// HTTP status of an upstream failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for bitbucket-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;
