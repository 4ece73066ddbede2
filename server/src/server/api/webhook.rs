//! Webhook ingress:
//!   POST /webhook – accept one gift notification from the upstream relay

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use chrono::Utc;
use gift_engine::normalizer;
use serde_json::{Value, json};

use crate::app::SharedState;

use super::{ApiResult, err_json, pipeline_err};

/// POST /webhook
pub async fn receive_webhook(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Rejected webhook with unparseable body: {e}");
        err_json(400, &format!("Invalid JSON body: {e}"))
    })?;

    let event = normalizer::normalize(&payload, Utc::now()).map_err(|e| {
        tracing::warn!("Rejected webhook: {e}");
        err_json(400, &e.to_string())
    })?;

    tracing::info!(
        username = %event.username,
        gift_id = %event.gift_id,
        repeat_count = event.repeat_count,
        coin_value = event.coin_value,
        "Webhook received"
    );
    tracing::debug!(payload = %payload, "Webhook payload");

    let response = json!({
        "success": true,
        "message": "Webhook received",
        "username": event.username,
        "giftCount": event.repeat_count,
        "coinValue": event.coin_value,
    });

    state.pipeline().submit(event).map_err(|e| {
        tracing::error!("Failed to hand gift to pipeline: {e}");
        pipeline_err(e)
    })?;

    Ok(Json(response))
}
