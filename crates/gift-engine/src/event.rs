//! Normalized gift events and the keys derived from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One inbound gift notification after field extraction. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftEvent {
    pub username: String,
    pub gift_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_name: Option<String>,
    pub repeat_count: u32,
    pub coin_value: u64,
    pub raw_payload: Value,
    pub received_at: DateTime<Utc>,
}

/// Identity of a combo: one user sending one kind of gift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComboKey {
    pub username: String,
    pub gift_id: String,
}

/// Exact-redelivery key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub username: String,
    pub gift_id: String,
    pub coin_value: u64,
    pub repeat_count: u32,
}

impl GiftEvent {
    pub fn combo_key(&self) -> ComboKey {
        ComboKey {
            username: self.username.clone(),
            gift_id: self.gift_id.clone(),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            username: self.username.clone(),
            gift_id: self.gift_id.clone(),
            coin_value: self.coin_value,
            repeat_count: self.repeat_count,
        }
    }

    /// Whether this gift is the one the host asked for. Compares both the id
    /// and the display name, ignoring case and surrounding whitespace.
    pub fn matches_gift(&self, target: &str) -> bool {
        let target = target.trim();
        if target.is_empty() {
            return true;
        }

        self.gift_id.trim().eq_ignore_ascii_case(target)
            || self
                .gift_name
                .as_deref()
                .is_some_and(|name| name.trim().eq_ignore_ascii_case(target))
    }
}
