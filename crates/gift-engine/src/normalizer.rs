//! Field extraction from heterogeneous upstream webhook payloads.
//!
//! Each field has an ordered table of candidate names. The top level of the
//! payload is searched first, then one level down under `data`, then under
//! `user`. The first candidate holding a usable value wins.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::event::GiftEvent;

pub const USERNAME_FIELDS: &[&str] = &[
    "uniqueId",
    "unique_id",
    "username",
    "user",
    "userName",
    "user_name",
    "nickname",
    "nick",
    "displayName",
    "display_name",
    "name",
    "screenName",
    "screen_name",
];

pub const COIN_FIELDS: &[&str] = &[
    "diamondCount",
    "diamond_count",
    "diamonds",
    "coinValue",
    "coin_value",
    "coins",
    "coinCount",
    "coin_count",
    "value",
    "price",
    "cost",
];

pub const COUNT_FIELDS: &[&str] = &[
    "giftCount",
    "gift_count",
    "count",
    "quantity",
    "amount",
    "combo",
    "repeatCount",
    "repeat_count",
    "num",
];

pub const GIFT_ID_FIELDS: &[&str] = &["giftId", "gift_id", "giftName", "gift_name", "value3"];

pub const GIFT_NAME_FIELDS: &[&str] = &["giftName", "gift_name"];

const NESTED_OBJECTS: &[&str] = &["data", "user"];

pub const UNKNOWN_GIFT_ID: &str = "unknown";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("gift count {0} is out of range")]
    CountOutOfRange(u64),
}

/// Build a [`GiftEvent`] from a raw webhook body.
pub fn normalize(payload: &Value, received_at: DateTime<Utc>) -> Result<GiftEvent, NormalizeError> {
    let Some(object) = payload.as_object() else {
        return Err(NormalizeError::NotAnObject);
    };

    let username = find_field(object, USERNAME_FIELDS, extract_text).unwrap_or_else(|| {
        let generated = synthetic_username(received_at);
        tracing::warn!(username = %generated, "No username in payload, using fallback");
        generated
    });
    let coin_value = find_field(object, COIN_FIELDS, extract_positive).unwrap_or(0);
    let repeat_count = match find_field(object, COUNT_FIELDS, extract_positive) {
        Some(count) => u32::try_from(count).map_err(|_| NormalizeError::CountOutOfRange(count))?,
        None => 1,
    };
    let gift_id = find_field(object, GIFT_ID_FIELDS, extract_text)
        .unwrap_or_else(|| UNKNOWN_GIFT_ID.to_string());
    let gift_name = find_field(object, GIFT_NAME_FIELDS, extract_text);

    Ok(GiftEvent {
        username,
        gift_id,
        gift_name,
        repeat_count,
        coin_value,
        raw_payload: payload.clone(),
        received_at,
    })
}

pub fn synthetic_username(received_at: DateTime<Utc>) -> String {
    format!("User_{}", received_at.timestamp_millis())
}

fn find_field<T>(
    object: &Map<String, Value>,
    fields: &[&str],
    extract: fn(&Value) -> Option<T>,
) -> Option<T> {
    let nested = NESTED_OBJECTS
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_object));

    std::iter::once(object)
        .chain(nested)
        .find_map(|scope| {
            fields
                .iter()
                .find_map(|field| scope.get(*field).and_then(extract))
        })
}

fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts positive numbers and numeric strings. Strings are read like a
/// lenient integer parse: leading digits only, so `"12 coins"` yields 12.
fn extract_positive(value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64)),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<u64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn extracts_tikfinity_style_payload() {
        let payload = json!({
            "uniqueId": "viewer_01",
            "nickname": "Viewer One",
            "giftId": "11046",
            "giftName": "Galaxy",
            "coins": "5000",
            "repeatCount": "5",
        });

        let event = normalize(&payload, at()).unwrap();
        assert_eq!(event.username, "viewer_01");
        assert_eq!(event.gift_id, "11046");
        assert_eq!(event.gift_name.as_deref(), Some("Galaxy"));
        assert_eq!(event.coin_value, 5000);
        assert_eq!(event.repeat_count, 5);
        assert_eq!(event.raw_payload, payload);
        assert_eq!(event.received_at, at());
    }

    #[test]
    fn candidate_order_decides_between_fields() {
        let payload = json!({
            "nickname": "later",
            "username": "first",
            "value": 7,
            "diamondCount": 30,
            "num": 9,
            "giftCount": 2,
        });

        let event = normalize(&payload, at()).unwrap();
        assert_eq!(event.username, "first");
        assert_eq!(event.coin_value, 30);
        assert_eq!(event.repeat_count, 2);
    }

    #[test]
    fn falls_back_to_nested_data_then_user() {
        let payload = json!({
            "event": "gift",
            "data": { "coins": 99, "count": 3 },
            "user": { "uniqueId": "nested_user" },
        });

        let event = normalize(&payload, at()).unwrap();
        assert_eq!(event.username, "nested_user");
        assert_eq!(event.coin_value, 99);
        assert_eq!(event.repeat_count, 3);
    }

    #[test]
    fn zero_and_garbage_values_do_not_match() {
        let payload = json!({
            "username": "   ",
            "nick": "bob",
            "coins": 0,
            "price": "abc",
            "cost": "15",
            "count": -2,
            "amount": "0",
        });

        let event = normalize(&payload, at()).unwrap();
        assert_eq!(event.username, "bob");
        assert_eq!(event.coin_value, 15);
        assert_eq!(event.repeat_count, 1);
    }

    #[test]
    fn missing_fields_use_fallbacks() {
        let event = normalize(&json!({ "event": "gift" }), at()).unwrap();
        assert_eq!(event.username, "User_1700000000000");
        assert_eq!(event.gift_id, UNKNOWN_GIFT_ID);
        assert_eq!(event.gift_name, None);
        assert_eq!(event.coin_value, 0);
        assert_eq!(event.repeat_count, 1);
    }

    #[test]
    fn numeric_username_is_stringified() {
        let event = normalize(&json!({ "user_name": 12345 }), at()).unwrap();
        assert_eq!(event.username, "12345");
    }

    #[test]
    fn object_under_user_is_searched_not_taken_as_name() {
        let event = normalize(&json!({ "user": { "nickname": "carol" } }), at()).unwrap();
        assert_eq!(event.username, "carol");
    }

    #[test]
    fn lenient_integer_strings() {
        assert_eq!(extract_positive(&json!("12 coins")), Some(12));
        assert_eq!(extract_positive(&json!(" 8")), Some(8));
        assert_eq!(extract_positive(&json!(2.9)), Some(2));
        assert_eq!(extract_positive(&json!(0.5)), None);
        assert_eq!(extract_positive(&json!(true)), None);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            normalize(&json!([1, 2, 3]), at()).unwrap_err(),
            NormalizeError::NotAnObject
        );
        assert_eq!(
            normalize(&json!("gift"), at()).unwrap_err(),
            NormalizeError::NotAnObject
        );
    }

    #[test]
    fn oversized_count_is_rejected() {
        let payload = json!({ "uniqueId": "eve", "giftCount": "99999999999" });
        assert_eq!(
            normalize(&payload, at()).unwrap_err(),
            NormalizeError::CountOutOfRange(99_999_999_999)
        );

        let event = normalize(&json!({ "giftCount": u32::MAX }), at()).unwrap();
        assert_eq!(event.repeat_count, u32::MAX);
    }
}
