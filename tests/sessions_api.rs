use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use hello_sessions::{
    AppState,
    config::{AppConfig, ResponseShape},
    server::build_router,
};
use serde_json::Value;
use tower::ServiceExt;

fn test_config(shape: ResponseShape, increment: Option<bool>) -> AppConfig {
    let mut config =
        AppConfig::load_from_args(["hello-sessions"]).expect("default config should load");
    config.route.shape = shape;
    config.route.increment = increment;
    config
}

fn app(shape: ResponseShape, increment: Option<bool>) -> Router {
    let state = AppState::new(Arc::new(test_config(shape, increment)), Key::generate());
    build_router(state)
}

/// Minimal cookie-carrying client over the in-process router.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn get(&mut self, path: &str) -> (StatusCode, Value) {
        self.get_with_extra_cookie(path, None).await
    }

    async fn get_with_extra_cookie(
        &mut self,
        path: &str,
        extra: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(path);
        let cookies: Vec<&str> = self.cookie.as_deref().into_iter().chain(extra).collect();
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[tokio::test]
async fn test_first_request_initializes_defaults() {
    let mut client = Client::new(app(ResponseShape::Summary, None));

    let (status, body) = client.get("/sessions/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session accessed for key: hello");
    assert_eq!(body["session"]["hello"], "World");
    assert_eq!(body["session"]["goodnight"], "Moon");
    assert_eq!(body["session"]["count"], 0);
    assert!(client.cookie.as_deref().unwrap().starts_with("session="));
}

#[tokio::test]
async fn test_count_increments_per_session() {
    let mut client = Client::new(app(ResponseShape::Summary, None));

    for expected in 1..=3 {
        let (status, body) = client.get("/sessions/count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["count"], expected);
        assert_eq!(body["session"]["hello"], "World");
        assert_eq!(body["session"]["goodnight"], "Moon");
    }

    // Other keys leave the counter alone.
    let (_, body) = client.get("/sessions/goodnight").await;
    assert_eq!(body["session"]["count"], 3);
    let (_, body) = client.get("/sessions/whatever").await;
    assert_eq!(body["session"]["count"], 3);
}

#[tokio::test]
async fn test_sessions_are_isolated_per_client() {
    let app = app(ResponseShape::Summary, None);
    let mut alice = Client::new(app.clone());
    let mut bob = Client::new(app);

    alice.get("/sessions/count").await;
    alice.get("/sessions/count").await;

    let (_, body) = bob.get("/sessions/count").await;
    assert_eq!(body["session"]["count"], 1);
    assert_ne!(alice.cookie, bob.cookie);
}

#[tokio::test]
async fn test_snapshot_shape_never_counts() {
    let mut client = Client::new(app(ResponseShape::Snapshot, None));

    for _ in 0..3 {
        let (status, body) = client.get("/sessions/count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session data retrieved for key: count");
        assert_eq!(body["session"]["count"], 0);
    }
}

#[tokio::test]
async fn test_increment_override() {
    let mut client = Client::new(app(ResponseShape::Snapshot, Some(true)));
    client.get("/sessions/count").await;
    let (_, body) = client.get("/sessions/count").await;
    assert_eq!(body["session"]["count"], 2);

    let mut client = Client::new(app(ResponseShape::Summary, Some(false)));
    let (_, body) = client.get("/sessions/count").await;
    assert_eq!(body["session"]["count"], 0);
}

#[tokio::test]
async fn test_field_shape_returns_single_value_and_cookies() {
    let mut client = Client::new(app(ResponseShape::Field, None));

    // First request establishes the session cookie.
    let (status, body) = client.get("/sessions/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_key"], "hello");
    assert_eq!(body["session_value"], "World");
    assert_eq!(body["session_accessed"], true);
    assert_eq!(body["cookies"], serde_json::json!({}));

    let (_, body) = client
        .get_with_extra_cookie("/sessions/hello", Some("theme=dark"))
        .await;
    assert_eq!(body["cookies"]["theme"], "dark");
    // The session cookie is echoed with its raw signed value.
    assert!(body["cookies"]["session"].as_str().is_some_and(|v| !v.is_empty()));

    let (_, body) = client.get("/sessions/count").await;
    assert_eq!(body["session_value"], 1);
}

#[tokio::test]
async fn test_field_shape_unknown_key_is_not_found() {
    let mut client = Client::new(app(ResponseShape::Field, None));

    let (status, body) = client.get("/sessions/foo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown session key: foo");

    // The session was still created and its cookie set.
    assert!(client.cookie.is_some());
    let (status, body) = client.get("/sessions/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_value"], 1);
}

#[tokio::test]
async fn test_tampered_cookie_starts_new_session() {
    let mut client = Client::new(app(ResponseShape::Summary, None));
    client.get("/sessions/count").await;
    client.get("/sessions/count").await;

    let original = client.cookie.clone().unwrap();
    // Alter the last character of the session id so the signature no longer matches.
    let mut forged = original.clone();
    let last = forged.pop();
    forged.push(if last == Some('0') { '1' } else { '0' });
    client.cookie = Some(forged);

    let (status, body) = client.get("/sessions/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["count"], 1);
    assert_ne!(client.cookie.as_deref(), Some(original.as_str()));
}

#[tokio::test]
async fn test_cookie_from_another_key_is_rejected() {
    let mut first = Client::new(app(ResponseShape::Summary, None));
    first.get("/sessions/count").await;

    // Same cookie presented to a server signing with a different key.
    let mut second = Client::new(app(ResponseShape::Summary, None));
    second.cookie = first.cookie.clone();
    let (_, body) = second.get("/sessions/count").await;
    assert_eq!(body["session"]["count"], 1);
}
