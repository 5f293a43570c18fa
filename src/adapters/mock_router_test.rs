use super::mock_router::MockRouter;
use crate::domain::mock::{MockOptions, RouteDecision, UrlPattern};
use crate::domain::InterceptedRoute;
use crate::error::{MockError, MockResult};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

/// What a route was told to do
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fulfill(u16, Value),
    Abort,
    Fallback,
}

/// Records driver calls instead of touching a browser or the network
struct RecordingRoute {
    method: String,
    url: String,
    calls: Vec<Call>,
    fail_fulfill: bool,
}

impl RecordingRoute {
    fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            calls: Vec::new(),
            fail_fulfill: false,
        }
    }
}

#[async_trait]
impl InterceptedRoute for RecordingRoute {
    fn method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn fulfill(&mut self, status: u16, body: &Value) -> MockResult<()> {
        if self.fail_fulfill {
            return Err(MockError::Route {
                method: self.method.clone(),
                url: self.url.clone(),
                reason: "page closed".to_string(),
            });
        }
        self.calls.push(Call::Fulfill(status, body.clone()));
        Ok(())
    }

    async fn abort(&mut self) -> MockResult<()> {
        self.calls.push(Call::Abort);
        Ok(())
    }

    async fn fallback(&mut self) -> MockResult<()> {
        self.calls.push(Call::Fallback);
        Ok(())
    }
}

const LOGIN_URL: &str = "https://id.example.ru/frame/login-submit";

#[tokio::test]
async fn test_fulfill_with_status_and_body() {
    let mut router = MockRouter::new();
    router
        .register(
            "**/frame/login-submit",
            MockOptions::default()
                .method("POST")
                .status(403)
                .body(json!({ "x": 1 })),
        )
        .unwrap();

    let mut route = RecordingRoute::new("POST", LOGIN_URL);
    let decision = router.handle(&mut route).await.unwrap();

    assert_eq!(
        decision,
        RouteDecision::Fulfill {
            status: 403,
            body: json!({ "x": 1 })
        }
    );
    assert_eq!(route.calls, vec![Call::Fulfill(403, json!({ "x": 1 }))]);
}

#[tokio::test]
async fn test_textual_body_with_python_literals() {
    let mut router = MockRouter::new();
    router
        .register(
            "**/frame/login-submit",
            MockOptions::default()
                .method("post")
                .body(r#"{"success": False, "captcha": None, "message": "True story"}"#),
        )
        .unwrap();

    let mut route = RecordingRoute::new("POST", LOGIN_URL);
    router.handle(&mut route).await.unwrap();

    assert_eq!(
        route.calls,
        vec![Call::Fulfill(
            200,
            json!({ "success": false, "captcha": null, "message": "True story" })
        )]
    );
}

#[tokio::test]
async fn test_abort_rule() {
    let mut router = MockRouter::new();
    router
        .register("**/*.png", MockOptions::default().abort())
        .unwrap();

    let mut route = RecordingRoute::new("GET", "https://cdn.example.ru/img/logo.png");
    assert_eq!(router.handle(&mut route).await.unwrap(), RouteDecision::Abort);
    assert_eq!(route.calls, vec![Call::Abort]);
}

#[tokio::test]
async fn test_method_mismatch_falls_back() {
    let mut router = MockRouter::new();
    router
        .register("**/frame/login-submit", MockOptions::default().method("POST"))
        .unwrap();

    let mut route = RecordingRoute::new("GET", LOGIN_URL);
    assert_eq!(router.handle(&mut route).await.unwrap(), RouteDecision::Continue);
    assert_eq!(route.calls, vec![Call::Fallback]);
}

#[tokio::test]
async fn test_unmatched_url_falls_back() {
    let mut router = MockRouter::new();
    router.mock("**/api/profile").unwrap();

    let mut route = RecordingRoute::new("GET", "https://example.ru/api/orders");
    router.handle(&mut route).await.unwrap();
    assert_eq!(route.calls, vec![Call::Fallback]);
}

#[test]
fn test_last_registered_rule_wins() {
    let mut router = MockRouter::new();
    router
        .register("**/api/**", MockOptions::default().status(500))
        .unwrap();
    router
        .register("**/api/profile", MockOptions::default().body(json!({ "name": "override" })))
        .unwrap();

    assert_eq!(
        router.decide("GET", "https://example.ru/api/profile"),
        RouteDecision::Fulfill {
            status: 200,
            body: json!({ "name": "override" })
        }
    );
    // The older, broader rule still answers everything else
    assert!(matches!(
        router.decide("GET", "https://example.ru/api/orders"),
        RouteDecision::Fulfill { status: 500, .. }
    ));
}

#[test]
fn test_bad_body_fails_at_registration() {
    let mut router = MockRouter::new();
    let err = router
        .register("**/broken", MockOptions::default().body("{success: False"))
        .unwrap_err();

    assert!(matches!(err, MockError::BodyParse { .. }));
    assert!(router.is_empty());
}

#[test]
fn test_bad_body_ignored_for_abort() {
    let mut router = MockRouter::new();
    router
        .register("**/broken", MockOptions::default().body("not json").abort())
        .unwrap();
    assert_eq!(router.decide("GET", "https://x.ru/broken"), RouteDecision::Abort);
}

#[test]
fn test_default_bodies_are_independent() {
    let mut router = MockRouter::new();
    router.mock("**/a").unwrap();
    router.mock("**/b").unwrap();

    assert_eq!(router.len(), 2);
    assert_eq!(router.rules()[0].body(), &json!({}));
    assert_eq!(router.rules()[1].body(), &json!({}));
    assert_eq!(router.decide("GET", "https://x.ru/a"), router.decide("GET", "https://x.ru/b"));
}

#[test]
fn test_regex_and_prebuilt_patterns() {
    let mut router = MockRouter::new();
    router
        .register(Regex::new(r"/api/users/\d+$").unwrap(), MockOptions::default().status(404))
        .unwrap();
    router
        .register_pattern(
            UrlPattern::glob("https://{id,auth}.example.ru/logout").unwrap(),
            MockOptions::default().abort(),
        )
        .unwrap();

    assert!(matches!(
        router.decide("GET", "https://reqres.in/api/users/2"),
        RouteDecision::Fulfill { status: 404, .. }
    ));
    assert_eq!(router.decide("GET", "https://reqres.in/api/users/me"), RouteDecision::Continue);
    assert_eq!(router.decide("GET", "https://auth.example.ru/logout"), RouteDecision::Abort);
}

#[test]
fn test_invalid_regex_pattern() {
    let err = UrlPattern::regex("(unclosed").unwrap_err();
    assert!(matches!(err, MockError::InvalidPattern { pattern, .. } if pattern == "(unclosed"));

    let mut router = MockRouter::new();
    router.register(String::from("**/ok"), MockOptions::default()).unwrap();
    assert_eq!(router.len(), 1);
}

#[tokio::test]
async fn test_driver_failure_is_reported() {
    let mut router = MockRouter::new();
    router.mock("**/api/profile").unwrap();

    let mut route = RecordingRoute::new("GET", "https://example.ru/api/profile");
    route.fail_fulfill = true;
    let err = router.handle(&mut route).await.unwrap_err();
    assert!(matches!(err, MockError::Route { .. }));
}

#[test]
fn test_clear_removes_rules() {
    let mut router = MockRouter::new();
    router.mock("**/a").unwrap();
    router.clear();
    assert_eq!(router.decide("GET", "https://x.ru/a"), RouteDecision::Continue);
}
