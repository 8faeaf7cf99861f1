//! Request/response envelopes exchanged with [`crate::BitbucketApi`].

use bitbucket_core::{Error, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::Paginated;

/// Join path segments into an API path, percent-encoding each segment.
///
/// `api_path(&["repositories", "acme", "api"])` gives `/repositories/acme/api`.
pub fn api_path(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
        path
    })
}

/// Expected shape of a successful response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// JSON document (`Accept: application/json`)
    #[default]
    Json,
    /// Raw text such as diffs and step logs (`Accept: text/plain`)
    Text,
}

/// A single Bitbucket REST call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/repositories/acme/api`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub accept: ResponseKind,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            accept: ResponseKind::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Expect a raw text response.
    pub fn text(mut self) -> Self {
        self.accept = ResponseKind::Text;
        self
    }
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// Raw body decoded as UTF-8. Invalid sequences (binary files in a diff,
    /// non-UTF-8 log output) are replaced with U+FFFD, so the text matches the
    /// upstream bytes only when they are valid UTF-8.
    Text(String),
    /// 204 No Content or an empty body
    Empty,
}

impl ApiResponse {
    /// Interpret the body as JSON. Empty bodies read as `null`.
    pub fn into_json(self) -> Result<Value> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Empty => Ok(Value::Null),
            ApiResponse::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }

    /// Interpret the body as text, verbatim.
    pub fn into_text(self) -> String {
        match self {
            ApiResponse::Text(text) => text,
            ApiResponse::Json(value) => value.to_string(),
            ApiResponse::Empty => String::new(),
        }
    }

    /// Decode the body as a typed page. Empty bodies read as an empty page.
    pub fn into_page<T: DeserializeOwned>(self) -> Result<Paginated<T>> {
        match self.into_json()? {
            Value::Null => Ok(Paginated {
                values: Vec::new(),
                next: None,
                page: None,
                pagelen: None,
                size: None,
            }),
            value => serde_json::from_value(value)
                .map_err(|e| Error::InvalidData(format!("Unexpected page shape: {}", e))),
        }
    }

    /// Extract the `values` array of a paginated response, in upstream order.
    ///
    /// A page without `values` yields an empty list.
    pub fn into_values(self) -> Result<Vec<Value>> {
        match self.into_json()? {
            Value::Object(mut page) => match page.remove("values") {
                Some(Value::Array(values)) => Ok(values),
                Some(other) => Err(Error::InvalidData(format!(
                    "Expected 'values' to be an array, got {}",
                    other
                ))),
                None => Ok(Vec::new()),
            },
            Value::Null => Ok(Vec::new()),
            other => Err(Error::InvalidData(format!(
                "Expected a paginated object, got {}",
                other
            ))),
        }
    }
}
