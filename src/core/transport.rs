//! HTTP transport.
//!
//! Requests are described declaratively with [`HttpRequest`] and executed
//! by a [`Transport`]. Every call expects a JSON response body.

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::error::TransportError;

/// A GET request description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes [`HttpRequest`]s and returns the parsed JSON body.
///
/// Non-2xx responses are errors. No retries and no timeouts beyond what
/// the implementation itself applies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, request: &HttpRequest) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        let url = request.url.clone();
        trace!(url = %url, headers = request.headers.len(), "sending request");

        let mut builder = self
            .client
            .get(&request.url)
            .header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| TransportError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;
        trace!(url = %url, status = status.as_u16(), body_len = body.len(), "received response");

        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url,
            message: format!("invalid JSON body: {}", e),
        })
    }
}

/// Extract a string field from a JSON response body.
pub(crate) fn string_field(url: &str, body: &Value, field: &str) -> Result<String, TransportError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TransportError::Decode {
            url: url.to_string(),
            message: format!("missing string field '{}'", field),
        })
}
