//! Bitbucket API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use bitbucket_core::{BitbucketConfig, Credentials, Error, Result};
use tracing::{debug, warn};

use crate::request::{ApiRequest, ApiResponse, ResponseKind};
use crate::BitbucketApi;

/// Timeout applied to every outbound request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bitbucket Cloud REST v2 client.
pub struct BitbucketClient {
    base_url: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl BitbucketClient {
    /// Create a client from resolved connection settings.
    pub fn new(config: &BitbucketConfig) -> Result<Self> {
        Self::with_base_url(config.base_url.clone(), config.credentials.clone())
    }

    /// Create a client for a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bitbucket-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the absolute URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build request with auth and accept headers.
    fn request(&self, request: &ApiRequest) -> reqwest::RequestBuilder {
        let accept = match request.accept {
            ResponseKind::Json => "application/json",
            ResponseKind::Text => "text/plain",
        };

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .header(reqwest::header::ACCEPT, accept);

        builder = match &self.credentials {
            Credentials::Bearer { token } => builder.bearer_auth(token),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
    }

    /// Handle response and map errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        accept: ResponseKind,
    ) -> Result<ApiResponse> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                body = body.as_str(),
                "Bitbucket API error response"
            );
            return Err(Error::upstream(status_code, body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

        if text.is_empty() {
            return Ok(ApiResponse::Empty);
        }

        match accept {
            ResponseKind::Text => Ok(ApiResponse::Text(text)),
            ResponseKind::Json => serde_json::from_str(&text)
                .map(ApiResponse::Json)
                .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e))),
        }
    }
}

#[async_trait]
impl BitbucketApi for BitbucketClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(
            method = %request.method,
            path = request.path.as_str(),
            "Bitbucket request"
        );

        let response = self
            .request(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response, request.accept).await
    }
}
