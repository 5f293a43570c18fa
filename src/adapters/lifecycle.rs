//! Create → use → delete for ephemeral remote resources.
//!
//! ```text
//! NotCreated ──create ok──▶ Created ──release──▶ Deleted
//!     │
//!     └──every attempt failed──▶ CreationFailed
//! ```
//!
//! Creation is retried under a [`RetryPolicy`]; deletion runs once and is
//! never retried. A [`Lease`] only exists in the `Created` state and is
//! consumed by [`Lease::release`], so a handle can't be deleted twice and a
//! handle that never came back from the create call can't be deleted at all.

use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::adapters::api_client::ApiClient;
use crate::adapters::report::step;
use crate::adapters::retry::{with_retry, RetryPolicy};
use crate::config::ResourceSettings;
use crate::domain::{ApiPort, ApiRequest, ResourceHandle};
use crate::error::{LifecycleError, LifecycleResult};

/// Where and how a resource is created and deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoint {
    pub create_url: String,
    /// Must contain an `{id}` placeholder
    pub delete_url: String,
    pub id_field: String,
    pub create_status: u16,
    pub delete_status: u16,
}

impl ResourceEndpoint {
    pub fn delete_url_for(&self, handle: &ResourceHandle) -> String {
        self.delete_url.replace("{id}", handle.as_str())
    }
}

impl Default for ResourceEndpoint {
    fn default() -> Self {
        Self::from(&ResourceSettings::default())
    }
}

impl From<&ResourceSettings> for ResourceEndpoint {
    fn from(settings: &ResourceSettings) -> Self {
        Self {
            create_url: settings.create_url.clone(),
            delete_url: settings.delete_url.clone(),
            id_field: settings.id_field.clone(),
            create_status: settings.create_status,
            delete_status: settings.delete_status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotCreated,
    Created,
    Deleted,
    CreationFailed,
}

/// The creation response of a live resource
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedResource {
    pub handle: ResourceHandle,
    pub response: Value,
}

/// Output of a scoped run together with the teardown result.
///
/// A teardown failure never replaces `output`; callers decide how to
/// report both.
#[derive(Debug)]
pub struct Scoped<T> {
    pub output: T,
    pub teardown: LifecycleResult<()>,
}

impl<T> Scoped<T> {
    pub fn teardown_ok(&self) -> bool {
        self.teardown.is_ok()
    }

    /// `output` if teardown succeeded, otherwise the teardown error
    pub fn into_result(self) -> LifecycleResult<T> {
        self.teardown.map(|_| self.output)
    }
}

/// A created resource awaiting deletion
pub struct Lease<A: ApiPort = ApiClient> {
    api: Arc<A>,
    endpoint: ResourceEndpoint,
    resource: CreatedResource,
    state: LifecycleState,
}

impl<A: ApiPort> Lease<A> {
    pub fn handle(&self) -> &ResourceHandle {
        &self.resource.handle
    }

    pub fn resource(&self) -> &CreatedResource {
        &self.resource
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Delete the resource. Called at most once, since it consumes the lease.
    pub async fn release(mut self) -> LifecycleResult<()> {
        self.state = LifecycleState::Deleted;
        let handle = self.resource.handle.clone();
        let request = ApiRequest::new(
            "DELETE",
            self.endpoint.delete_url_for(&handle),
            self.endpoint.delete_status,
        );

        let api = self.api.clone();
        step("Delete resource", async move { api.request(request).await })
            .await
            .map(|_| info!("Deleted resource {}", handle))
            .map_err(|source| LifecycleError::Teardown {
                handle: handle.to_string(),
                source,
            })
    }
}

impl<A: ApiPort> Drop for Lease<A> {
    fn drop(&mut self) {
        if self.state == LifecycleState::Created {
            warn!(
                "Resource {} was never released; it is still present at {}",
                self.resource.handle, self.endpoint.create_url
            );
        }
    }
}

/// Creates resources with retry and guarantees one deletion attempt
pub struct ResourceLifecycle<A: ApiPort = ApiClient> {
    api: Arc<A>,
    endpoint: ResourceEndpoint,
    policy: RetryPolicy,
}

impl<A: ApiPort> ResourceLifecycle<A> {
    pub fn new(api: Arc<A>, endpoint: ResourceEndpoint, policy: RetryPolicy) -> Self {
        Self {
            api,
            endpoint,
            policy,
        }
    }

    pub fn endpoint(&self) -> &ResourceEndpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Single creation attempt
    async fn create_once(&self, payload: &Value) -> LifecycleResult<CreatedResource> {
        let request = ApiRequest::new("POST", &self.endpoint.create_url, self.endpoint.create_status)
            .with_payload(payload.clone());
        let body = self.api.request(request).await?;

        let handle = ResourceHandle::from_response(body.as_ref(), &self.endpoint.id_field).ok_or_else(
            || LifecycleError::MissingIdentifier {
                url: self.endpoint.create_url.clone(),
                field: self.endpoint.id_field.clone(),
            },
        )?;

        Ok(CreatedResource {
            handle,
            response: body.unwrap_or(Value::Null),
        })
    }

    /// Create the resource, retrying any failure under the policy.
    pub async fn provision(&self, payload: &Value) -> LifecycleResult<Lease<A>> {
        let created = step(
            "Create resource",
            with_retry(&self.policy, "Create resource", |_| self.create_once(payload)),
        )
        .await;

        match created {
            Ok(resource) => {
                info!("Created resource {} at {}", resource.handle, self.endpoint.create_url);
                Ok(Lease {
                    api: self.api.clone(),
                    endpoint: self.endpoint.clone(),
                    resource,
                    state: LifecycleState::Created,
                })
            }
            Err(exhausted) => Err(LifecycleError::CreationExhausted {
                attempts: exhausted.attempts,
                last: Box::new(exhausted.last),
            }),
        }
    }

    /// Provision, run `body`, then release exactly once.
    ///
    /// Release happens whether `body` returns or panics. A panic is re-raised
    /// after the release attempt. When creation fails, `body` never runs and
    /// no deletion is attempted.
    pub async fn run<T, F, Fut>(&self, payload: &Value, body: F) -> LifecycleResult<Scoped<T>>
    where
        F: FnOnce(CreatedResource) -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.provision(payload).await?;
        let outcome = AssertUnwindSafe(body(lease.resource().clone()))
            .catch_unwind()
            .await;

        let teardown = lease.release().await;
        if let Err(e) = &teardown {
            error!("{}", e);
        }

        match outcome {
            Ok(output) => Ok(Scoped { output, teardown }),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl<A: ApiPort> std::fmt::Debug for Lease<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("resource", &self.resource)
            .field("state", &self.state)
            .finish()
    }
}

impl<A: ApiPort> std::fmt::Debug for ResourceLifecycle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycle")
            .field("endpoint", &self.endpoint)
            .field("policy", &self.policy)
            .finish()
    }
}
