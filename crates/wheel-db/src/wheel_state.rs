//! Durable wheel state: JSON values stored under fixed keys.
//!
//! Every `save_*` call commits immediately. There is no transaction spanning
//! two keys, so a crash between a roster write and a stats write can leave
//! them out of step.

use std::collections::BTreeMap;

use rusqlite::OptionalExtension;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

pub const ROSTER_KEY: &str = "roster";
pub const MAX_LIMIT_KEY: &str = "max_limit";
pub const MIN_COINS_KEY: &str = "min_coins";
pub const COIN_BALANCES_KEY: &str = "coin_balances";
pub const USER_STATS_KEY: &str = "user_stats";

/// Lifetime statistics persisted per user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_coins: u64,
    pub submissions: u64,
}

impl Database {
    /// Read a JSON value. Returns `None` when the key has never been written
    /// and [`DbError::InvalidData`] when the stored text does not decode.
    pub fn get_state_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let raw = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM wheel_state WHERE key = ?1")?;
            let value = stmt
                .query_row([key], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value)
        })?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| DbError::InvalidData(format!("wheel_state.{key}: {e}")))
        })
        .transpose()
    }

    pub fn set_state_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO wheel_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                rusqlite::params![key, json, now],
            )?;
            Ok(())
        })
    }

    pub fn load_roster(&self) -> Result<Vec<String>, DbError> {
        Ok(self.get_state_value(ROSTER_KEY)?.unwrap_or_default())
    }

    pub fn save_roster(&self, roster: &[String]) -> Result<(), DbError> {
        self.set_state_value(ROSTER_KEY, roster)
    }

    pub fn load_max_limit(&self) -> Result<u32, DbError> {
        Ok(self.get_state_value(MAX_LIMIT_KEY)?.unwrap_or(0))
    }

    pub fn save_max_limit(&self, max_limit: u32) -> Result<(), DbError> {
        self.set_state_value(MAX_LIMIT_KEY, &max_limit)
    }

    pub fn load_min_coins(&self) -> Result<u64, DbError> {
        Ok(self.get_state_value(MIN_COINS_KEY)?.unwrap_or(0))
    }

    pub fn save_min_coins(&self, min_coins: u64) -> Result<(), DbError> {
        self.set_state_value(MIN_COINS_KEY, &min_coins)
    }

    pub fn load_coin_balances(&self) -> Result<BTreeMap<String, u64>, DbError> {
        Ok(self.get_state_value(COIN_BALANCES_KEY)?.unwrap_or_default())
    }

    pub fn save_coin_balances(&self, balances: &BTreeMap<String, u64>) -> Result<(), DbError> {
        self.set_state_value(COIN_BALANCES_KEY, balances)
    }

    pub fn load_user_stats(&self) -> Result<BTreeMap<String, UserStats>, DbError> {
        Ok(self.get_state_value(USER_STATS_KEY)?.unwrap_or_default())
    }

    pub fn save_user_stats(&self, stats: &BTreeMap<String, UserStats>) -> Result<(), DbError> {
        self.set_state_value(USER_STATS_KEY, stats)
    }
}
