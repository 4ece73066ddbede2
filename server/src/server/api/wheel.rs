//! Wheel API:
//!   GET    /api/wheel                            – roster, limits and mode
//!   POST   /api/wheel/participants               – add one entry
//!   DELETE /api/wheel/participants/{name}        – remove the first entry for a name
//!   POST   /api/wheel/participants/remove-last   – remove the newest entry
//!   POST   /api/wheel/clear                      – empty the roster
//!   PUT    /api/wheel/config                     – update maxLimit / minCoins
//!   POST   /api/wheel/spin                       – draw a winner and plan the spin

use axum::Json;
use axum::extract::{Path, State};
use gift_engine::WheelConfig;
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;
use crate::events;

use super::{ApiResult, err_json, pipeline_err};

#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    #[serde(alias = "username")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub max_limit: Option<u32>,
    pub min_coins: Option<u64>,
}

/// GET /api/wheel
pub async fn get_wheel(State(state): State<SharedState>) -> ApiResult {
    let snapshot = state
        .pipeline()
        .call(|wheel| wheel.snapshot())
        .await
        .map_err(pipeline_err)?;
    Ok(Json(json!(snapshot)))
}

/// POST /api/wheel/participants
pub async fn add_participant(
    State(state): State<SharedState>,
    Json(body): Json<AddParticipantRequest>,
) -> ApiResult {
    let name = body.name.trim().to_string();
    let (added, snapshot) = state
        .pipeline()
        .call(move |wheel| (wheel.add_participant(&name), wheel.snapshot()))
        .await
        .map_err(pipeline_err)?;

    if !added {
        let reason = if snapshot.is_full { "Roster is full" } else { "Name must not be empty" };
        return Err(err_json(400, reason));
    }

    events::broadcast_roster(state.ws_sender(), &snapshot);
    Ok(Json(json!({ "success": true, "wheel": snapshot })))
}

/// DELETE /api/wheel/participants/{name}
pub async fn remove_participant(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> ApiResult {
    let (removed, snapshot) = state
        .pipeline()
        .call(move |wheel| (wheel.remove_participant(&name), wheel.snapshot()))
        .await
        .map_err(pipeline_err)?;

    if removed {
        events::broadcast_roster(state.ws_sender(), &snapshot);
    }
    Ok(Json(json!({ "success": true, "removed": removed, "wheel": snapshot })))
}

/// POST /api/wheel/participants/remove-last
pub async fn remove_last_participant(State(state): State<SharedState>) -> ApiResult {
    let (removed, snapshot) = state
        .pipeline()
        .call(|wheel| (wheel.remove_last_participant(), wheel.snapshot()))
        .await
        .map_err(pipeline_err)?;

    if removed.is_some() {
        events::broadcast_roster(state.ws_sender(), &snapshot);
    }
    Ok(Json(json!({ "success": true, "removed": removed, "wheel": snapshot })))
}

/// POST /api/wheel/clear
pub async fn clear_wheel(State(state): State<SharedState>) -> ApiResult {
    let (removed, snapshot) = state
        .pipeline()
        .call(|wheel| (wheel.clear_participants(), wheel.snapshot()))
        .await
        .map_err(pipeline_err)?;

    tracing::info!(removed, "Wheel cleared");
    events::broadcast_roster(state.ws_sender(), &snapshot);
    Ok(Json(json!({ "success": true, "removed": removed, "wheel": snapshot })))
}

/// PUT /api/wheel/config
pub async fn update_config(
    State(state): State<SharedState>,
    Json(body): Json<UpdateConfigRequest>,
) -> ApiResult {
    let (config, snapshot) = state
        .pipeline()
        .call(move |wheel| {
            let current = wheel.config();
            let next = WheelConfig {
                max_limit: body.max_limit.unwrap_or(current.max_limit),
                min_coins: body.min_coins.unwrap_or(current.min_coins),
            };
            wheel.update_config(next);
            (next, wheel.snapshot())
        })
        .await
        .map_err(pipeline_err)?;

    tracing::info!(max_limit = config.max_limit, min_coins = config.min_coins, "Wheel config updated");
    events::broadcast_roster(state.ws_sender(), &snapshot);
    Ok(Json(json!({ "success": true, "config": config, "wheel": snapshot })))
}

/// POST /api/wheel/spin
pub async fn spin_wheel(State(state): State<SharedState>) -> ApiResult {
    let duration_ms = state.config().await.spin_duration_ms;
    let plan = state
        .pipeline()
        .call(move |wheel| wheel.spin(duration_ms))
        .await
        .map_err(pipeline_err)?
        .map_err(|e| err_json(400, &e.to_string()))?;

    tracing::info!(
        winner = %plan.winner,
        winner_index = plan.winner_index,
        total_entries = plan.total_entries,
        "Wheel spun"
    );
    events::broadcast_spin(state.ws_sender(), &plan);
    Ok(Json(json!(plan)))
}
