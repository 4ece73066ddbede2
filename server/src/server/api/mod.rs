//! REST API handlers grouped by domain.

pub mod leaderboard;
pub mod settings;
pub mod simulate;
pub mod webhook;
pub mod wheel;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::pipeline::PipelineError;

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "success": false, "error": message })),
    )
}

pub fn pipeline_err(e: PipelineError) -> (StatusCode, Json<Value>) {
    err_json(500, &e.to_string())
}
