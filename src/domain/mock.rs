//! Declarative route mocks.
//!
//! A [`MockRule`] pairs a URL pattern and an HTTP method with a canned
//! [`RouteDecision`]. Bodies are normalized to JSON when the rule is built so
//! a malformed body fails at registration, not in the middle of a page load.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MockError, MockResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockAction {
    #[default]
    Fulfill,
    Abort,
}

/// Response body as supplied by the test author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MockBody {
    /// JSON-like text, possibly using `True`/`False`/`None` literals
    Text(String),
    Json(Value),
}

impl MockBody {
    /// Resolve into the JSON value served to the page.
    pub fn resolve(&self) -> MockResult<Value> {
        match self {
            MockBody::Json(value) => Ok(value.clone()),
            MockBody::Text(text) => {
                let normalized = normalize_python_literals(text);
                serde_json::from_str(&normalized).map_err(|e| MockError::BodyParse {
                    body: text.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl Default for MockBody {
    fn default() -> Self {
        MockBody::Json(Value::Object(Map::new()))
    }
}

impl From<Value> for MockBody {
    fn from(value: Value) -> Self {
        MockBody::Json(value)
    }
}

impl From<&str> for MockBody {
    fn from(text: &str) -> Self {
        MockBody::Text(text.to_string())
    }
}

impl From<String> for MockBody {
    fn from(text: String) -> Self {
        MockBody::Text(text)
    }
}

/// Replace bare `True`, `False` and `None` tokens with their JSON spelling.
///
/// Text inside double-quoted string literals is left alone, so a message such
/// as `"True story"` survives untouched.
pub fn normalize_python_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    word.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            out.push_str(match word.as_str() {
                "True" => "true",
                "False" => "false",
                "None" => "null",
                other => other,
            });
        } else {
            out.push(c);
        }
    }

    out
}

/// URL matcher for intercepted requests
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Browser-style glob, anchored against the whole URL
    Glob { source: String, regex: Regex },
    /// Unanchored regular expression search
    Regex(Regex),
}

impl UrlPattern {
    pub fn glob(pattern: &str) -> MockResult<Self> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|e| MockError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(UrlPattern::Glob {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn regex(pattern: &str) -> MockResult<Self> {
        Regex::new(pattern)
            .map(UrlPattern::Regex)
            .map_err(|e| MockError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Glob { regex, .. } | UrlPattern::Regex(regex) => regex.is_match(url),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UrlPattern::Glob { source, .. } => source,
            UrlPattern::Regex(regex) => regex.as_str(),
        }
    }
}

impl TryFrom<&str> for UrlPattern {
    type Error = MockError;

    fn try_from(pattern: &str) -> MockResult<Self> {
        UrlPattern::glob(pattern)
    }
}

impl TryFrom<String> for UrlPattern {
    type Error = MockError;

    fn try_from(pattern: String) -> MockResult<Self> {
        UrlPattern::glob(&pattern)
    }
}

impl TryFrom<Regex> for UrlPattern {
    type Error = MockError;

    fn try_from(regex: Regex) -> MockResult<Self> {
        Ok(UrlPattern::Regex(regex))
    }
}

/// Translate a glob into an anchored regex.
///
/// `**` matches anything, `*` anything but `/`, `?` one character other than
/// `/`, and `{a,b}` either alternative.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();
    let mut in_group = false;

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '{' if !in_group => {
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    out
}

/// What happens to an intercepted request
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    Fulfill { status: u16, body: Value },
    Abort,
    /// No rule applies; the request goes to the real network
    Continue,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

/// Registration parameters for a mock rule.
///
/// Every `MockOptions::default()` call builds a new empty body object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockOptions {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub action: MockAction,
    #[serde(default)]
    pub body: MockBody,
    #[serde(default = "default_status")]
    pub status: u16,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            method: default_method(),
            action: MockAction::default(),
            body: MockBody::default(),
            status: default_status(),
        }
    }
}

impl MockOptions {
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn body(mut self, body: impl Into<MockBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn abort(mut self) -> Self {
        self.action = MockAction::Abort;
        self
    }
}

/// A compiled mock rule
#[derive(Debug, Clone)]
pub struct MockRule {
    pattern: UrlPattern,
    method: String,
    action: MockAction,
    status: u16,
    body: Value,
}

impl MockRule {
    pub fn new(pattern: UrlPattern, options: MockOptions) -> MockResult<Self> {
        // Abort rules carry no payload, so their body is never parsed.
        let body = match options.action {
            MockAction::Fulfill => options.body.resolve()?,
            MockAction::Abort => Value::Null,
        };

        Ok(Self {
            pattern,
            method: options.method.to_uppercase(),
            action: options.action,
            status: options.status,
            body,
        })
    }

    pub fn matches(&self, method: &str, url: &str) -> bool {
        self.method.eq_ignore_ascii_case(method) && self.pattern.matches(url)
    }

    pub fn decision(&self) -> RouteDecision {
        match self.action {
            MockAction::Fulfill => RouteDecision::Fulfill {
                status: self.status,
                body: self.body.clone(),
            },
            MockAction::Abort => RouteDecision::Abort,
        }
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn action(&self) -> MockAction {
        self.action
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}
