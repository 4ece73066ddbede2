//! Settings management API:
//!   GET /api/settings – all settings with defaults filled in
//!   PUT /api/settings – validate, store and apply

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::config::SettingsManager;
use crate::events;

use super::{ApiResult, err_json};

fn settings_map(sm: &SettingsManager) -> Result<HashMap<String, Value>, anyhow::Error> {
    Ok(sm
        .get_all_settings()?
        .into_iter()
        .map(|(key, info)| {
            (
                key,
                json!({
                    "key": info.key,
                    "value": info.value,
                    "required": info.required,
                    "description": info.description,
                    "has_value": info.has_value,
                }),
            )
        })
        .collect())
}

/// GET /api/settings
pub async fn get_settings(State(state): State<SharedState>) -> ApiResult {
    let sm = SettingsManager::new(state.db().clone());
    let settings = settings_map(&sm).map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;

    Ok(Json(json!({ "settings": settings })))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<HashMap<String, String>>,
) -> ApiResult {
    let sm = SettingsManager::new(state.db().clone());
    sm.set_settings(&body).map_err(|e| err_json(400, &e.to_string()))?;

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    let updated = body.len();
    tracing::info!(updated, "Settings updated");
    events::broadcast_settings_updated(state.ws_sender(), updated);

    let settings = settings_map(&sm).map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Updated {updated} setting(s) successfully"),
        "settings": settings,
    })))
}
