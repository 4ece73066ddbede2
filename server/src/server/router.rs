use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use super::{api, sse, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        .route("/events", get(sse::sse_handler))
        // --- Ingress ---
        .route("/webhook", post(api::webhook::receive_webhook))
        .route("/test-webhook", post(api::simulate::simulate_webhook))
        // --- Wheel ---
        .route("/api/wheel", get(api::wheel::get_wheel))
        .route("/api/wheel/participants", post(api::wheel::add_participant))
        .route("/api/wheel/participants/remove-last", post(api::wheel::remove_last_participant))
        .route("/api/wheel/participants/{name}", delete(api::wheel::remove_participant))
        .route("/api/wheel/clear", post(api::wheel::clear_wheel))
        .route("/api/wheel/config", put(api::wheel::update_config))
        .route("/api/wheel/spin", post(api::wheel::spin_wheel))
        // --- Leaderboard ---
        .route("/api/leaderboard", get(api::leaderboard::get_leaderboard))
        .route("/api/leaderboard/reset", post(api::leaderboard::reset_leaderboard))
        // --- Settings ---
        .route("/api/settings", get(api::settings::get_settings).put(api::settings::update_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn status_handler(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "clients": state.ws_sender().receiver_count(),
    }))
}
