use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use wheel_db::Database;

use crate::app::SharedState;
use crate::config::AppConfig;
use crate::server::router::create_router;

mod api_wheel;

fn test_state_with(config: AppConfig) -> SharedState {
    let db = Database::open_in_memory().expect("Failed to create test DB");
    SharedState::new(db, config, PathBuf::from(".")).expect("Failed to build state")
}

fn test_state() -> SharedState {
    test_state_with(AppConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn app(state: &SharedState) -> Router {
    create_router(state.clone())
}

#[tokio::test]
async fn health_and_status() {
    let state = test_state();
    let app = app(&state);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let _rx = state.subscribe_ws();
    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["clients"], 1);
}
