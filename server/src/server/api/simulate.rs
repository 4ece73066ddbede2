//! Test endpoint:
//!   POST /test-webhook – replay a realistic combo burst through the pipeline
//!
//! Upstream relays report a combo as a `1x` notification, then the final
//! count, then a duplicate of the final count. This endpoint sends exactly
//! that burst so the combo handling can be checked end to end.

use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use chrono::Utc;
use gift_engine::normalizer;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::pipeline::PipelineHandle;

use super::{ApiResult, err_json};

const DEFAULT_USERNAME: &str = "TestUser";
const DEFAULT_GIFT_ID: &str = "11046";
const DEFAULT_GIFT_NAME: &str = "Galaxy";

/// Delays relative to the request, matching what the relay does in practice.
const BURST_OFFSETS_MS: [u64; 3] = [0, 500, 1000];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SimulateRequest {
    username: Option<String>,
    gift_id: Option<String>,
    gift_name: Option<String>,
    #[serde(alias = "count", alias = "repeatCount")]
    gift_count: Option<u32>,
    /// Total value of the final count.
    #[serde(alias = "coins")]
    coin_value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
struct BurstStep {
    delay_ms: u64,
    payload: Value,
}

/// POST /test-webhook
pub async fn simulate_webhook(State(state): State<SharedState>, body: Bytes) -> ApiResult {
    let request: SimulateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SimulateRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| err_json(400, &format!("Invalid JSON body: {e}")))?
    };

    let steps = build_burst(&request);
    let summary = json!({
        "username": steps[0].payload["username"],
        "giftId": steps[0].payload["giftId"],
        "giftName": steps[0].payload["giftName"],
        "giftCount": steps[2].payload["repeatCount"],
        "coinValue": steps[2].payload["coins"],
        "messages": steps.len(),
    });

    tracing::info!(burst = %summary, "Test webhook triggered");
    tokio::spawn(replay(state.pipeline().clone(), steps));

    Ok(Json(json!({
        "success": true,
        "message": "Test webhook burst scheduled",
        "data": summary,
    })))
}

fn build_burst(request: &SimulateRequest) -> Vec<BurstStep> {
    let username = request
        .username
        .clone()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let gift_id = request.gift_id.clone().unwrap_or_else(|| DEFAULT_GIFT_ID.to_string());
    let gift_name = request
        .gift_name
        .clone()
        .unwrap_or_else(|| DEFAULT_GIFT_NAME.to_string());
    let final_count = request.gift_count.unwrap_or(1).max(1);
    let total_coins = request.coin_value.unwrap_or(0);
    let unit_coins = total_coins / u64::from(final_count);

    let counts = [(1, unit_coins), (final_count, total_coins), (final_count, total_coins)];

    BURST_OFFSETS_MS
        .iter()
        .zip(counts)
        .map(|(&delay_ms, (count, coins))| BurstStep {
            delay_ms,
            payload: json!({
                "event": "gift",
                "username": username,
                "nickname": username,
                "giftId": gift_id,
                "giftName": gift_name,
                "repeatCount": count,
                "coins": coins,
                "value3": gift_id,
                "content": "Add to Wheel",
            }),
        })
        .collect()
}

async fn replay(pipeline: PipelineHandle, steps: Vec<BurstStep>) {
    let start = tokio::time::Instant::now();
    for step in steps {
        tokio::time::sleep_until(start + Duration::from_millis(step.delay_ms)).await;

        let event = match normalizer::normalize(&step.payload, Utc::now()) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Simulated payload rejected: {e}");
                return;
            }
        };
        if let Err(e) = pipeline.submit(event) {
            tracing::error!("Failed to submit simulated gift: {e}");
            return;
        }
    }
}
