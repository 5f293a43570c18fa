//! In-process stand-in for the reqres-style user API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Calls served so far
#[derive(Default)]
pub struct ServerState {
    pub creates: AtomicUsize,
    pub flaky_calls: AtomicUsize,
    /// Number of leading `/flaky/users` calls answered with 500
    pub flaky_failures: usize,
    pub deleted: Mutex<Vec<String>>,
}

impl ServerState {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_flaky_failures(2).await
    }

    pub async fn with_flaky_failures(flaky_failures: usize) -> Self {
        let state = Arc::new(ServerState {
            flaky_failures,
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/users", post(create_user))
            .route("/api/users/:id", delete(delete_user).get(get_user))
            .route("/flaky/users", post(flaky_create))
            .route("/no-id/users", post(create_without_id))
            .route("/slow", get(slow))
            .route("/missing", get(missing))
            .route("/garbage", get(garbage))
            .route("/empty", get(empty))
            .route("/empty-object", get(empty_object))
            .route("/false", get(falsy))
            .with_state(state.clone());

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_url,
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn create_user(
    State(state): State<Arc<ServerState>>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let id = state.creates.fetch_add(1, Ordering::SeqCst) + 100;
    body["id"] = json!(id.to_string());
    body["createdAt"] = json!("2024-01-01T00:00:00.000Z");
    (StatusCode::CREATED, Json(body))
}

async fn flaky_create(
    State(state): State<Arc<ServerState>>,
    body: Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = state.flaky_calls.fetch_add(1, Ordering::SeqCst);
    if call < state.flaky_failures {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "try again" })),
        );
    }
    create_user(State(state), body).await
}

async fn create_without_id(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(body))
}

async fn delete_user(State(state): State<Arc<ServerState>>, Path(id): Path<String>) -> StatusCode {
    state.deleted.lock().unwrap().push(id);
    StatusCode::NO_CONTENT
}

async fn get_user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "data": { "id": id, "first_name": "Janet" } }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({ "late": true }))
}

async fn missing() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "no such user")
}

async fn garbage() -> &'static str {
    "<html>definitely not json</html>"
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn empty_object() -> Json<Value> {
    Json(json!({}))
}

async fn falsy() -> Json<Value> {
    Json(json!(false))
}
