//! Error types for the fixture runtime
//!
//! Each layer owns one enum. [`FixtureError`] wraps all of them for callers
//! that drive several layers from one test.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the schema registry and the data factory
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema is registered under this name
    #[error("Unknown schema: '{0}'")]
    UnknownSchema(String),

    /// Overrides carried keys the schema does not declare
    #[error("Non-existent fields passed in '{schema}': {}", .extra.join(", "))]
    UnexpectedField { schema: String, extra: Vec<String> },

    /// The merged record failed field-level validation
    #[error("Validation error in '{schema}':\n{}", format_issues(.issues))]
    Validation {
        schema: String,
        issues: Vec<FieldIssue>,
    },

    /// A schema definition is malformed
    #[error("Invalid schema definition '{schema}': {reason}")]
    InvalidDefinition { schema: String, reason: String },

    /// Two definitions share a name within one registry
    #[error("Duplicate schema: '{0}'")]
    DuplicateSchema(String),

    /// A schema file could not be read or parsed
    #[error("Failed to load schema file {path}: {reason}")]
    Load { path: String, reason: String },
}

/// A single field-level validation complaint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors raised while configuring or applying mock routes
#[derive(Debug, Error)]
pub enum MockError {
    /// A textual mock body is not valid JSON even after token normalization
    #[error("Mock body is not valid JSON: {reason}\nBody: {body}")]
    BodyParse { body: String, reason: String },

    /// The URL pattern could not be compiled
    #[error("Invalid URL pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The browser driver rejected a fulfill/abort/fallback call
    #[error("Route handling failed for {method} {url}: {reason}")]
    Route {
        method: String,
        url: String,
        reason: String,
    },
}

/// Errors raised by [`crate::adapters::api_client::ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Timeout exceeded ({} sec).\nURL: {method} {url}", .timeout.as_secs_f64())]
    RequestTimeout {
        url: String,
        method: String,
        timeout: Duration,
    },

    #[error("Error executing request.\nURL: {method} {url}\nError: {detail}")]
    TransportError {
        url: String,
        method: String,
        detail: String,
    },

    #[error(
        "Invalid status code.\nExpect: {expected}\nReceive: {actual}\nURL: {method} {url}\nResponse: {body_excerpt}"
    )]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        url: String,
        method: String,
        body_excerpt: String,
    },

    #[error("Invalid JSON in the response. Error: {parse_error}\nURL: {method} {url}\nResponse: {body_excerpt}")]
    InvalidResponseBody {
        url: String,
        method: String,
        parse_error: String,
        body_excerpt: String,
    },
}

/// Errors raised by the resource lifecycle manager
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The creation response did not carry the identifier field
    #[error("Creation response from {url} has no '{field}' field")]
    MissingIdentifier { url: String, field: String },

    /// Every creation attempt failed
    #[error("All {attempts} creation attempts failed; last error: {last}")]
    CreationExhausted {
        attempts: u32,
        #[source]
        last: Box<LifecycleError>,
    },

    /// The deletion call failed
    #[error("Teardown of resource '{handle}' failed: {source}")]
    Teardown {
        handle: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Umbrella error for code that touches several layers
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Mock(#[from] MockError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

pub type SchemaResult<T> = Result<T, SchemaError>;
pub type MockResult<T> = Result<T, MockError>;
pub type ApiResult<T> = Result<T, ApiError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Truncate `text` to at most `limit` characters, marking the cut.
pub fn excerpt(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
