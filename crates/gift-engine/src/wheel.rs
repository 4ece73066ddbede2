//! One wheel instance: resolver, roster, accounts and their durable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wheel_db::Database;

use crate::EngineError;
use crate::account::{Accounts, UserAccount};
use crate::allocation::{self, AllocationMode, AllocationReport};
use crate::draw::{self, DrawError, SpinPlan};
use crate::event::GiftEvent;
use crate::leaderboard::{self, LeaderboardEntry, LeaderboardView};
use crate::resolver::{ComboResolver, DropReason, Resolution, ResolverConfig};
use crate::roster::Roster;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelConfig {
    /// 0 means unbounded.
    pub max_limit: u32,
    /// 0 selects count mode.
    pub min_coins: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Not the target gift.
    Filtered,
    Dropped(DropReason),
    Deferred { due_at: DateTime<Utc> },
    Allocated(AllocationReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelSnapshot {
    pub entries: Vec<String>,
    pub total_entries: usize,
    pub max_limit: u32,
    pub min_coins: u64,
    pub mode: AllocationMode,
    pub is_full: bool,
    pub pending_combos: usize,
}

/// Owns all mutable wheel state. Callers serialize access to it; the server
/// keeps it inside a single worker task.
pub struct GiftWheel {
    db: Database,
    resolver: ComboResolver,
    roster: Roster,
    accounts: Accounts,
    min_coins: u64,
    target_gift: String,
}

impl GiftWheel {
    pub fn load(db: Database, resolver_config: ResolverConfig) -> Result<Self, EngineError> {
        let roster = Roster::new(db.load_roster()?, db.load_max_limit()?);
        let min_coins = db.load_min_coins()?;
        let accounts = Accounts::from_persisted(db.load_coin_balances()?, db.load_user_stats()?);

        tracing::info!(
            entries = roster.len(),
            max_limit = roster.max_limit(),
            min_coins,
            accounts = accounts.len(),
            "Wheel state loaded"
        );

        Ok(Self {
            db,
            resolver: ComboResolver::new(resolver_config),
            roster,
            accounts,
            min_coins,
            target_gift: String::new(),
        })
    }

    pub fn ingest(&mut self, event: GiftEvent, now: DateTime<Utc>) -> IngestOutcome {
        if !event.matches_gift(&self.target_gift) {
            tracing::debug!(
                username = %event.username,
                gift_id = %event.gift_id,
                target = %self.target_gift,
                "Gift does not match target, ignored"
            );
            return IngestOutcome::Filtered;
        }

        let username = event.username.clone();
        let gift_id = event.gift_id.clone();
        let repeat_count = event.repeat_count;

        match self.resolver.resolve(event, now) {
            Resolution::Dropped(reason) => {
                tracing::debug!(%username, %gift_id, repeat_count, ?reason, "Gift dropped");
                IngestOutcome::Dropped(reason)
            }
            Resolution::Deferred { due_at } => {
                tracing::debug!(%username, %gift_id, repeat_count, %due_at, "Gift deferred for combo");
                IngestOutcome::Deferred { due_at }
            }
            Resolution::Ready(event) => IngestOutcome::Allocated(self.allocate(event)),
        }
    }

    /// Allocate every deferred combo whose delay has elapsed.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<AllocationReport> {
        self.resolver
            .fire_due(now)
            .into_iter()
            .map(|event| self.allocate(event))
            .collect()
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.resolver.next_deadline()
    }

    pub fn pending_combos(&self) -> usize {
        self.resolver.pending_count()
    }

    fn allocate(&mut self, event: GiftEvent) -> AllocationReport {
        let account = self.accounts.entry(&event.username);
        let report = allocation::allocate(event, self.min_coins, &mut self.roster, account);

        tracing::info!(
            username = %report.event.username,
            gift_id = %report.event.gift_id,
            repeat_count = report.event.repeat_count,
            coin_value = report.event.coin_value,
            mode = ?report.mode,
            entries_added = report.entries_added,
            entries_earned = report.entries_earned,
            "Gift allocated"
        );
        if report.capacity_limited() {
            tracing::info!(
                username = %report.event.username,
                max_limit = self.roster.max_limit(),
                "Roster full, allocation truncated"
            );
        }

        self.persist_accounts();
        self.persist_roster();
        report
    }

    pub fn config(&self) -> WheelConfig {
        WheelConfig {
            max_limit: self.roster.max_limit(),
            min_coins: self.min_coins,
        }
    }

    pub fn update_config(&mut self, config: WheelConfig) {
        self.roster.set_max_limit(config.max_limit);
        self.min_coins = config.min_coins;

        if let Err(e) = self.db.save_max_limit(config.max_limit) {
            tracing::warn!("Failed to persist max limit: {e}");
        }
        if let Err(e) = self.db.save_min_coins(config.min_coins) {
            tracing::warn!("Failed to persist min coins: {e}");
        }
    }

    pub fn set_resolver_config(&mut self, config: ResolverConfig) {
        self.resolver.set_config(config);
    }

    pub fn target_gift(&self) -> &str {
        &self.target_gift
    }

    pub fn set_target_gift(&mut self, target: impl Into<String>) {
        self.target_gift = target.into().trim().to_string();
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            entries: self.roster.entries().to_vec(),
            total_entries: self.roster.len(),
            max_limit: self.roster.max_limit(),
            min_coins: self.min_coins,
            mode: AllocationMode::from_min_coins(self.min_coins),
            is_full: self.roster.is_full(),
            pending_combos: self.resolver.pending_count(),
        }
    }

    pub fn add_participant(&mut self, name: &str) -> bool {
        let added = self.roster.append(name);
        if added {
            self.persist_roster();
        }
        added
    }

    pub fn remove_participant(&mut self, name: &str) -> bool {
        let removed = self.roster.remove_one(name);
        if removed {
            self.persist_roster();
        }
        removed
    }

    pub fn remove_last_participant(&mut self) -> Option<String> {
        let removed = self.roster.remove_last();
        if removed.is_some() {
            self.persist_roster();
        }
        removed
    }

    pub fn clear_participants(&mut self) -> usize {
        let removed = self.roster.clear();
        self.persist_roster();
        removed
    }

    pub fn spin(&self, duration_ms: u64) -> Result<SpinPlan, DrawError> {
        draw::plan_spin(self.roster.entries(), duration_ms)
    }

    pub fn leaderboard(&self, view: LeaderboardView) -> Vec<LeaderboardEntry> {
        leaderboard::view(&self.accounts, view)
    }

    pub fn account(&self, username: &str) -> Option<&UserAccount> {
        self.accounts.get(username)
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Forget every balance and statistic. The roster is left alone.
    pub fn reset_accounts(&mut self) {
        self.accounts.clear();
        self.persist_accounts();
    }

    fn persist_roster(&self) {
        if let Err(e) = self.db.save_roster(self.roster.entries()) {
            tracing::warn!(entries = self.roster.len(), "Failed to persist roster: {e}");
        }
    }

    fn persist_accounts(&self) {
        if let Err(e) = self.db.save_coin_balances(&self.accounts.balances()) {
            tracing::warn!("Failed to persist coin balances: {e}");
        }
        if let Err(e) = self.db.save_user_stats(&self.accounts.stats()) {
            tracing::warn!("Failed to persist user stats: {e}");
        }
    }
}

#[cfg(test)]
#[path = "wheel_tests.rs"]
mod tests;
