//! Leaderboard API:
//!   GET  /api/leaderboard?limit=10|all – ranked gifters
//!   POST /api/leaderboard/reset        – forget balances and statistics

use axum::Json;
use axum::extract::{Query, State};
use gift_engine::leaderboard::{LeaderboardView, TOP_N};
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;
use crate::events;

use super::{ApiResult, pipeline_err};

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<String>,
}

/// GET /api/leaderboard
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult {
    let view = LeaderboardView::parse(query.limit.as_deref());
    let (entries, total_users) = state
        .pipeline()
        .call(move |wheel| (wheel.leaderboard(view), wheel.accounts().len()))
        .await
        .map_err(pipeline_err)?;

    Ok(Json(json!({
        "entries": entries,
        "totalUsers": total_users,
    })))
}

/// POST /api/leaderboard/reset
pub async fn reset_leaderboard(State(state): State<SharedState>) -> ApiResult {
    let entries = state
        .pipeline()
        .call(|wheel| {
            wheel.reset_accounts();
            wheel.leaderboard(LeaderboardView::Top(TOP_N))
        })
        .await
        .map_err(pipeline_err)?;

    tracing::info!("Leaderboard reset");
    events::broadcast_leaderboard(state.ws_sender(), &entries);
    Ok(Json(json!({ "success": true })))
}
