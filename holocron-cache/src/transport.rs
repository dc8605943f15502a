//! Transport abstraction.
//!
//! The cache never talks HTTP itself. Query and mutation functions receive a
//! [`Transport`], so the TUI plugs in a real client while tests plug in a
//! scripted one.

use ::async_trait::async_trait;
use holocron_core::FetchError;
use serde_json::Value;
use url::Url;

/// HTTP method of a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request: a path relative to the configured base plus an optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path and query, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Sends requests to the remote catalog and returns decoded JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request.
    ///
    /// A body-less success is returned as `Value::Null`.
    async fn request(&self, request: Request) -> Result<Value, FetchError>;
}

/// Strip the scheme and host from a resource reference.
///
/// The catalog links related resources by absolute URL
/// (`https://swapi.dev/api/films/1/`); requests go through the configured
/// base, so only the path and query are kept. References that are already
/// paths pass through unchanged.
pub fn resource_path(reference: &str) -> Result<String, FetchError> {
    if reference.starts_with('/') {
        return Ok(reference.to_string());
    }
    let url = Url::parse(reference)
        .map_err(|e| FetchError::decode(format!("invalid resource reference {reference:?}: {e}")))?;
    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
