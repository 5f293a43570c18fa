use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub mod schema;
pub mod validator;

/// Prefix of environment overrides, e.g. `FIXTURES__RETRY__ATTEMPTS=5`
pub const ENV_PREFIX: &str = "FIXTURES";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub resource: ResourceSettings,
    /// Directory of extra schema files merged over the builtin schemas
    #[serde(default)]
    pub schemas_dir: Option<String>,
    #[serde(default)]
    pub browser: BrowserContextSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum characters of a response body quoted in error messages
    #[serde(default = "default_excerpt_limit")]
    pub excerpt_limit: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            excerpt_limit: default_excerpt_limit(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_excerpt_limit() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RetrySettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

/// HTTP contract of the ephemeral resource
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResourceSettings {
    #[serde(default = "default_create_url")]
    pub create_url: String,
    /// Deletion URL template; `{id}` is replaced by the resource handle
    #[serde(default = "default_delete_url")]
    pub delete_url: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_create_status")]
    pub create_status: u16,
    #[serde(default = "default_delete_status")]
    pub delete_status: u16,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            create_url: default_create_url(),
            delete_url: default_delete_url(),
            id_field: default_id_field(),
            create_status: default_create_status(),
            delete_status: default_delete_status(),
        }
    }
}

fn default_create_url() -> String {
    "https://reqres.in/api/users".to_string()
}

fn default_delete_url() -> String {
    "https://reqres.in/api/users/{id}".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_create_status() -> u16 {
    201
}

fn default_delete_status() -> u16 {
    204
}

/// Browser context arguments handed to the driver when a context is opened
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BrowserContextSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timezone")]
    pub timezone_id: String,
    #[serde(default)]
    pub geolocation: Geolocation,
    #[serde(default = "default_permissions")]
    pub permissions: Vec<String>,
    #[serde(default = "default_extra_headers")]
    pub extra_http_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Geolocation {
    fn default() -> Self {
        // Moscow
        Self {
            latitude: 55.7558,
            longitude: 37.6173,
        }
    }
}

impl Default for BrowserContextSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            timezone_id: default_timezone(),
            geolocation: Geolocation::default(),
            permissions: default_permissions(),
            extra_http_headers: default_extra_headers(),
        }
    }
}

fn default_locale() -> String {
    "ru-RU".to_string()
}

fn default_timezone() -> String {
    "Europe/Moscow".to_string()
}

fn default_permissions() -> Vec<String> {
    vec!["geolocation".to_string()]
}

fn default_extra_headers() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "Accept-Language".to_string(),
        "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
    )])
}

impl BrowserContextSettings {
    /// Merge these settings over the driver's own context arguments.
    ///
    /// Keys set here win; every other key of `base` is kept. A non-object
    /// `base` is treated as empty.
    pub fn overlay(&self, base: &Value) -> Value {
        let mut merged = base.as_object().cloned().unwrap_or_default();
        if let Ok(Value::Object(ours)) = serde_json::to_value(self) {
            merged.extend(ours);
        }
        Value::Object(merged)
    }

    pub fn to_json(&self) -> Value {
        self.overlay(&Value::Object(Map::new()))
    }
}

impl Settings {
    /// Load `fixtures.toml` (or `.yaml`/`.json`) from the working directory.
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Load `<root>/fixtures.*`, then `FIXTURES__*` environment overrides.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("fixtures");
        Self::load(File::from(config_path).required(false))
    }

    /// Load an explicit configuration file, which must exist.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        Self::load(File::from(path.as_ref()).required(true))
    }

    fn load<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("retry.attempts", default_attempts() as i64)?
            .set_default("retry.delay_ms", default_delay_ms() as i64)?
            .set_default("api.timeout_secs", default_timeout_secs() as i64)?
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        validator::ConfigValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;

        tracing::debug!("Loaded fixture settings: {:?}", settings);
        Ok(settings)
    }
}
