//! # fixturekit - fixture runtime for browser end-to-end suites
//!
//! fixturekit supplies the moving parts an end-to-end UI suite needs around
//! the browser itself.
//!
//! ## Features
//!
//! - **Synthetic data**: schema-checked records with faker defaults, where any
//!   unknown override key is a hard error
//! - **Route mocks**: declarative fulfill/abort rules for intercepted requests
//! - **HTTP helper**: one call, one descriptive error per failure mode
//! - **Resource lifecycle**: create with retry, delete exactly once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fixturekit::adapters::data_factory::FixtureParams;
//! use fixturekit::domain::mock::MockOptions;
//! use fixturekit::Fixtures;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fixtures = Fixtures::new()?;
//!
//!     let user = fixtures
//!         .factory()
//!         .build_params(&FixtureParams::new("/api/users").with("name", json!("Test User")))?;
//!
//!     let mut router = fixtures.router();
//!     router.register(
//!         "**/frame/login-submit",
//!         MockOptions::default()
//!             .method("POST")
//!             .body(r#"{"success": False, "message": "mocked"}"#),
//!     )?;
//!
//!     let scoped = fixtures
//!         .lifecycle()
//!         .run(&json!({ "name": "test", "job": "qa" }), |created| async move {
//!             // drive the page with `user` and `router` here
//!             created.handle
//!         })
//!         .await?;
//!     scoped.into_result()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: records, schemas, mock rules and the driver/HTTP ports
//! - **Adapters**: registry, factory, router, HTTP client, lifecycle
//! - **Config**: settings, schema files, validation

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod telemetry;

use serde_json::Value;
use std::sync::Arc;

use crate::adapters::api_client::ApiClient;
use crate::adapters::data_factory::DataFactory;
use crate::adapters::lifecycle::{ResourceEndpoint, ResourceLifecycle};
use crate::adapters::mock_router::MockRouter;
use crate::adapters::retry::RetryPolicy;
use crate::adapters::schema_registry::SchemaRegistry;
use crate::config::Settings;
use crate::error::FixtureError;

pub use crate::error::{ApiError, LifecycleError, MockError, SchemaError};

/// Everything a test needs, wired from one [`Settings`].
///
/// Build once per process; the registry is shared and read-only. Routers
/// are per test, see [`Fixtures::router`].
#[derive(Debug)]
pub struct Fixtures {
    settings: Settings,
    factory: DataFactory,
    api: Arc<ApiClient>,
    lifecycle: ResourceLifecycle,
}

impl Fixtures {
    /// Load [`Settings`] from the working directory and wire everything.
    pub fn new() -> anyhow::Result<Self> {
        let settings = Settings::new()?;
        Ok(Self::from_settings(settings)?)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, FixtureError> {
        let registry = match &settings.schemas_dir {
            Some(dir) => SchemaRegistry::load_dir(dir)?,
            None => SchemaRegistry::builtin()?,
        };
        let factory = DataFactory::new(Arc::new(registry));
        let api = Arc::new(ApiClient::new(&settings.api));
        let lifecycle = ResourceLifecycle::new(
            api.clone(),
            ResourceEndpoint::from(&settings.resource),
            RetryPolicy::from(&settings.retry),
        );

        Ok(Self {
            settings,
            factory,
            api,
            lifecycle,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn factory(&self) -> &DataFactory {
        &self.factory
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn lifecycle(&self) -> &ResourceLifecycle {
        &self.lifecycle
    }

    /// A fresh, empty router for one browser context
    pub fn router(&self) -> MockRouter {
        MockRouter::new()
    }

    /// Driver context arguments with the configured browser settings applied
    pub fn browser_context_args(&self, base: &Value) -> Value {
        self.settings.browser.overlay(base)
    }
}
