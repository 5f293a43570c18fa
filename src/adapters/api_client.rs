use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiSettings;
use crate::domain::{ApiPort, ApiRequest};
use crate::error::{excerpt, ApiError, ApiResult};

/// Generic HTTP caller with one descriptive error per failure mode.
///
/// Never retries; retrying is the caller's decision.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    default_timeout: Duration,
    excerpt_limit: usize,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            Duration::from_secs(settings.timeout_secs),
            settings.excerpt_limit,
        )
    }

    pub fn with_client(client: reqwest::Client, default_timeout: Duration, excerpt_limit: usize) -> Self {
        Self {
            client,
            default_timeout,
            excerpt_limit,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute `request`, returning `Ok(None)` when the response carries no data.
    pub async fn request(&self, request: ApiRequest) -> ApiResult<Option<Value>> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            ApiError::TransportError {
                url: request.url.clone(),
                method: request.method.clone(),
                detail: format!("invalid HTTP method: {}", e),
            }
        })?;

        debug!("Sending {} {}", request.method, request.url);
        let mut builder = self.client.request(method, &request.url).timeout(timeout);
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(&request, timeout, e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&request, timeout, e))?;
        debug!("{} {} answered {} ({} bytes)", request.method, request.url, status, text.len());

        if status != request.expected_status {
            return Err(ApiError::UnexpectedStatus {
                expected: request.expected_status,
                actual: status,
                url: request.url,
                method: request.method,
                body_excerpt: excerpt(&text, self.excerpt_limit),
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponseBody {
            url: request.url.clone(),
            method: request.method.clone(),
            parse_error: e.to_string(),
            body_excerpt: excerpt(&text, self.excerpt_limit),
        })?;

        Ok(collapse_empty(value))
    }

    pub async fn get(&self, url: &str, expected_status: u16) -> ApiResult<Option<Value>> {
        self.request(ApiRequest::new("GET", url, expected_status)).await
    }

    pub async fn post(&self, url: &str, payload: Value, expected_status: u16) -> ApiResult<Option<Value>> {
        self.request(ApiRequest::new("POST", url, expected_status).with_payload(payload))
            .await
    }

    pub async fn delete(&self, url: &str, expected_status: u16) -> ApiResult<Option<Value>> {
        self.request(ApiRequest::new("DELETE", url, expected_status)).await
    }
}

#[async_trait]
impl ApiPort for ApiClient {
    async fn request(&self, request: ApiRequest) -> ApiResult<Option<Value>> {
        ApiClient::request(self, request).await
    }
}

/// Map empty JSON values to the absence marker.
///
/// `{}`, `[]`, `""` and `null` carry no data. `false` and `0` are answers in
/// their own right and are kept.
pub fn collapse_empty(value: Value) -> Option<Value> {
    let empty = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    if empty {
        None
    } else {
        Some(value)
    }
}

fn transport_error(request: &ApiRequest, timeout: Duration, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::RequestTimeout {
            url: request.url.clone(),
            method: request.method.clone(),
            timeout,
        };
    }

    let mut detail = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }

    ApiError::TransportError {
        url: request.url.clone(),
        method: request.method.clone(),
        detail,
    }
}
