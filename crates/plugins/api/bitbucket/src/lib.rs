//! Bitbucket Cloud REST v2 client for bitbucket-mcp.
//!
//! Tool handlers describe each call as an [`ApiRequest`] and hand it to a
//! [`BitbucketApi`] implementation. [`BitbucketClient`] is the reqwest-backed
//! implementation that attaches credentials and maps error responses.

mod client;
mod request;
mod types;

use async_trait::async_trait;
use bitbucket_core::Result;

pub use client::BitbucketClient;
pub use request::{api_path, ApiRequest, ApiResponse, ResponseKind};
pub use reqwest::Method;
pub use types::*;

/// Seam between tool handlers and the HTTP layer.
#[async_trait]
pub trait BitbucketApi: Send + Sync {
    /// Issue a single REST call.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
