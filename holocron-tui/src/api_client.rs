//! HTTP transport for the remote people catalog.

use crate::config::TuiConfig;
use async_trait::async_trait;
use holocron_cache::{Method, Request, Transport};
use holocron_core::FetchError;
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// [`Transport`] over `reqwest`, resolving paths against the configured base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn request(&self, request: Request) -> Result<Value, FetchError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(method = %request.method, %url, status = status.as_u16(), "Request rejected");
            return Err(FetchError::remote(status.as_u16(), error_message(status, &bytes)));
        }
        decode_body(&bytes)
    }
}

/// Decode a success body. Empty bodies (`204 No Content`) become `Null`.
fn decode_body(bytes: &[u8]) -> Result<Value, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Human-readable message for a failed response.
///
/// The catalog reports errors as `{"detail": "..."}`; anything else falls
/// back to the body text or the status reason.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) {
        if let Some(Value::String(detail)) = map.get("detail") {
            return detail.clone();
        }
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
