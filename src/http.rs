//! HTTP client utilities shared by every endpoint.
//!
//! Client construction, header handling, logged body encoding/decoding and
//! mapping of non-success responses to [`ClientError::Api`].

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{trace, warn};

use crate::client::ClientError;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// JSON request bodies with trace logging.
pub trait RequestBuilderExt {
    fn json_logged<T: Serialize + ?Sized>(self, body: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: Serialize + ?Sized>(self, body: &T) -> Self {
        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(text) = serde_json::to_string(body) {
                trace!(body = %text, "request body");
            }
        }
        self.json(body)
    }
}

/// Response handling with trace logging.
#[async_trait]
pub trait ResponseExt: Sized {
    /// Turn a non-2xx response into [`ClientError::Api`].
    async fn ensure_success(self) -> Result<Self, ClientError>;

    /// Read the body as text, logging it.
    async fn text_logged(self) -> Result<String, ClientError>;

    /// Read the body and decode it as JSON, logging the raw text.
    async fn json_logged<T: DeserializeOwned>(self) -> Result<T, ClientError>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn ensure_success(self) -> Result<Self, ClientError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let body = self.text().await.unwrap_or_default();
        warn!(%status, "API request failed");
        Err(handle_error_response(status, &body))
    }

    async fn text_logged(self) -> Result<String, ClientError> {
        let text = self.text().await?;
        trace!(body = %text, "response body");
        Ok(text)
    }

    async fn json_logged<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let text = self.text_logged().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Build the error for a non-success response.
///
/// Falls back to the raw body, or the status reason, when the body is not one
/// of the API's error shapes.
pub fn handle_error_response(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody::Validation { detail }) => detail
            .iter()
            .map(|d| {
                if d.loc.is_empty() {
                    d.msg.clone()
                } else {
                    format!("{}: {}", d.loc.iter().map(location_part).join("."), d.msg)
                }
            })
            .join("; "),
        Ok(ApiErrorBody::Detail { detail }) => detail,
        Ok(ApiErrorBody::Message { message, error_type }) => match error_type {
            Some(error_type) => format!("{} ({})", message, error_type),
            None => message,
        },
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    ClientError::Api { status, message }
}

fn location_part(part: &serde_json::Value) -> String {
    match part {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// --- API Error Types ---

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Validation {
        detail: Vec<ValidationDetail>,
    },
    Detail {
        detail: String,
    },
    Message {
        message: String,
        #[serde(rename = "type")]
        error_type: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct ValidationDetail {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}
