use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{ApiResult, MockResult};

pub mod mock;
pub mod record;
pub mod schema;

/// A single outbound HTTP call issued through an [`ApiPort`]
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub url: String,
    /// Upper-cased before sending
    pub method: String,
    pub expected_status: u16,
    pub payload: Option<Value>,
    /// Falls back to the client's configured timeout when unset
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>, expected_status: u16) -> Self {
        Self {
            url: url.into(),
            method: method.into().to_uppercase(),
            expected_status,
            payload: None,
            timeout: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Identifier of a remote resource, taken from a creation response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    /// Extract the identifier `field` from a creation response body.
    ///
    /// Strings are used verbatim, numbers in their decimal form. Anything else,
    /// including an absent body, yields `None`.
    pub fn from_response(body: Option<&Value>, field: &str) -> Option<Self> {
        match body?.get(field)? {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP execution seam used by the lifecycle manager
#[async_trait]
pub trait ApiPort: Send + Sync {
    /// Returns `Ok(None)` for an empty response (the absence marker).
    async fn request(&self, request: ApiRequest) -> ApiResult<Option<Value>>;
}

/// A request paused by the browser driver, waiting for a routing decision.
///
/// Implemented by the driver layer. Exactly one of `fulfill`, `abort` or
/// `fallback` is called per route.
#[async_trait]
pub trait InterceptedRoute: Send {
    fn method(&self) -> &str;
    fn url(&self) -> &str;
    async fn fulfill(&mut self, status: u16, body: &Value) -> MockResult<()>;
    async fn abort(&mut self) -> MockResult<()>;
    /// Let the request continue to the real network
    async fn fallback(&mut self) -> MockResult<()>;
}
