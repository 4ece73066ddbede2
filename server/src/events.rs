//! Messages pushed to overlay clients over WebSocket and SSE.
//!
//! Every message is `{ "type": ..., "data": ... }`.

use gift_engine::GiftEvent;
use gift_engine::allocation::AllocationReport;
use gift_engine::draw::SpinPlan;
use gift_engine::leaderboard::LeaderboardEntry;
use gift_engine::wheel::WheelSnapshot;
use serde_json::{Value, json};
use tokio::sync::broadcast;

// -- Message type constants --

pub const CONNECTED: &str = "connected";
pub const GIFT: &str = "gift";
pub const GIFT_IGNORED: &str = "gift_ignored";
pub const COMBO_PENDING: &str = "combo_pending";
pub const ROSTER_UPDATED: &str = "roster_updated";
pub const LEADERBOARD_UPDATED: &str = "leaderboard_updated";
pub const WHEEL_SPIN: &str = "wheel_spin";
pub const SETTINGS_UPDATED: &str = "settings_updated";

pub fn message(kind: &str, data: Value) -> Value {
    json!({ "type": kind, "data": data })
}

fn send(tx: &broadcast::Sender<String>, kind: &str, data: Value) {
    // Err only means there are no subscribers.
    let _ = tx.send(message(kind, data).to_string());
}

/// One canonical gift after combo resolution.
pub fn broadcast_gift(tx: &broadcast::Sender<String>, report: &AllocationReport) {
    let event = &report.event;
    send(
        tx,
        GIFT,
        json!({
            "event": "gift",
            "username": event.username,
            "giftId": event.gift_id,
            "giftName": event.gift_name,
            "giftCount": event.repeat_count,
            "coinValue": event.coin_value,
            "mode": report.mode,
            "entriesEarned": report.entries_earned,
            "entriesAdded": report.entries_added,
            "account": report.account,
            "raw": event.raw_payload,
            "timestamp": event.received_at.timestamp_millis(),
        }),
    );
}

pub fn broadcast_gift_ignored(tx: &broadcast::Sender<String>, event: &GiftEvent, target: &str) {
    send(
        tx,
        GIFT_IGNORED,
        json!({
            "username": event.username,
            "giftId": event.gift_id,
            "giftName": event.gift_name,
            "giftCount": event.repeat_count,
            "coinValue": event.coin_value,
            "targetGift": target,
        }),
    );
}

pub fn broadcast_combo_pending(
    tx: &broadcast::Sender<String>,
    event: &GiftEvent,
    due_at: chrono::DateTime<chrono::Utc>,
) {
    send(
        tx,
        COMBO_PENDING,
        json!({
            "username": event.username,
            "giftId": event.gift_id,
            "giftCount": event.repeat_count,
            "coinValue": event.coin_value,
            "dueAt": due_at.to_rfc3339(),
        }),
    );
}

pub fn broadcast_roster(tx: &broadcast::Sender<String>, snapshot: &WheelSnapshot) {
    send(tx, ROSTER_UPDATED, json!(snapshot));
}

pub fn broadcast_leaderboard(tx: &broadcast::Sender<String>, entries: &[LeaderboardEntry]) {
    send(tx, LEADERBOARD_UPDATED, json!({ "entries": entries }));
}

pub fn broadcast_spin(tx: &broadcast::Sender<String>, plan: &SpinPlan) {
    send(tx, WHEEL_SPIN, json!(plan));
}

pub fn broadcast_settings_updated(tx: &broadcast::Sender<String>, count: usize) {
    send(tx, SETTINGS_UPDATED, json!({ "count": count }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_typed_envelopes() {
        let (tx, mut rx) = broadcast::channel(4);
        broadcast_settings_updated(&tx, 2);

        let raw = rx.try_recv().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], SETTINGS_UPDATED);
        assert_eq!(value["data"]["count"], 2);
    }

    #[test]
    fn send_without_receivers_is_silent() {
        let (tx, rx) = broadcast::channel::<String>(4);
        drop(rx);
        broadcast_leaderboard(&tx, &[]);
    }
}
