//! Deduplication and combo resolution.
//!
//! Turns a burst of notifications for one `(user, gift)` pair into a single
//! canonical event carrying the final repeat count. All state is owned by the
//! resolver instance; time is supplied by the caller.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::event::{ComboKey, Fingerprint, GiftEvent};
use crate::scheduler::{TaskHandle, TaskQueue};

const DEFAULT_DEDUPE_WINDOW_MS: i64 = 5_000;
const DEFAULT_COMBO_LIFETIME_MS: i64 = 30_000;
const DEFAULT_COMBO_DELAY_MS: i64 = 5_000;
const DEFAULT_COMBO_VALUE_THRESHOLD: u64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Exact re-deliveries inside this window are dropped.
    pub dedupe_window_ms: i64,
    /// A combo with no activity for this long starts over.
    pub combo_lifetime_ms: i64,
    /// How long a high-value gift waits for upgrades before it is allocated.
    pub combo_delay_ms: i64,
    /// Gifts worth more than this are deferred; the rest are allocated at once.
    pub combo_value_threshold: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dedupe_window_ms: DEFAULT_DEDUPE_WINDOW_MS,
            combo_lifetime_ms: DEFAULT_COMBO_LIFETIME_MS,
            combo_delay_ms: DEFAULT_COMBO_DELAY_MS,
            combo_value_threshold: DEFAULT_COMBO_VALUE_THRESHOLD,
        }
    }
}

/// Highest known state of a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboRecord {
    pub coin_value: u64,
    pub repeat_count: u32,
    pub last_updated_at: DateTime<Utc>,
    pub processed: bool,
}

#[derive(Debug)]
struct PendingAllocation {
    event: GiftEvent,
    task: TaskHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Same fingerprint seen inside the dedupe window.
    Duplicate,
    /// Lower repeat count than the live combo.
    Stale,
    /// Same repeat count as the live combo.
    AlreadyCounted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Dropped(DropReason),
    /// Waiting for the combo delay; will come out of [`ComboResolver::fire_due`].
    Deferred { due_at: DateTime<Utc> },
    /// Canonical event to allocate now.
    Ready(GiftEvent),
}

#[derive(Debug, Default)]
pub struct ComboResolver {
    config: ResolverConfig,
    fingerprints: HashMap<Fingerprint, DateTime<Utc>>,
    combos: HashMap<ComboKey, ComboRecord>,
    pending: HashMap<ComboKey, PendingAllocation>,
    tasks: TaskQueue<ComboKey>,
}

impl ComboResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// New values apply to events handled after this call. Tasks already
    /// scheduled keep their deadline.
    pub fn set_config(&mut self, config: ResolverConfig) {
        self.config = config;
    }

    pub fn resolve(&mut self, event: GiftEvent, now: DateTime<Utc>) -> Resolution {
        self.purge_expired(now);

        let fingerprint = event.fingerprint();
        if let Some(first_seen) = self.fingerprints.get(&fingerprint) {
            if elapsed_ms(*first_seen, now) < self.config.dedupe_window_ms {
                return Resolution::Dropped(DropReason::Duplicate);
            }
        }
        self.fingerprints.insert(fingerprint, now);

        let key = event.combo_key();
        let fresh_record = self
            .combos
            .get(&key)
            .filter(|record| elapsed_ms(record.last_updated_at, now) < self.config.combo_lifetime_ms)
            .copied();

        if let Some(record) = fresh_record {
            if event.repeat_count < record.repeat_count {
                return Resolution::Dropped(DropReason::Stale);
            }
            if event.repeat_count == record.repeat_count {
                return Resolution::Dropped(DropReason::AlreadyCounted);
            }
            tracing::debug!(
                username = %key.username,
                gift_id = %key.gift_id,
                from = record.repeat_count,
                to = event.repeat_count,
                "Combo upgraded"
            );
            self.cancel_pending(&key);
        }

        self.combos.insert(
            key.clone(),
            ComboRecord {
                coin_value: event.coin_value,
                repeat_count: event.repeat_count,
                last_updated_at: now,
                processed: false,
            },
        );

        if event.coin_value > self.config.combo_value_threshold {
            self.cancel_pending(&key);
            let delay = TimeDelta::milliseconds(self.config.combo_delay_ms.max(0));
            let task = self.tasks.schedule(now, delay, key.clone());
            let due_at = self.tasks.due_at(task).unwrap_or(now + delay);
            self.pending.insert(key, PendingAllocation { event, task });
            return Resolution::Deferred { due_at };
        }

        self.mark_processed(&key);
        Resolution::Ready(event)
    }

    /// Pop every deferred combo whose delay has elapsed, in deadline order.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<GiftEvent> {
        let mut ready = Vec::new();
        for (handle, key) in self.tasks.pop_due(now) {
            let is_current = self
                .pending
                .get(&key)
                .is_some_and(|pending| pending.task == handle);
            if !is_current {
                continue;
            }
            if let Some(pending) = self.pending.remove(&key) {
                self.mark_processed(&key);
                ready.push(pending.event);
            }
        }
        ready
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.tasks.next_deadline()
    }

    /// Drop fingerprints outside the dedupe window and idle combos. A combo
    /// with a pending allocation is kept until that allocation fires.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let dedupe_window = self.config.dedupe_window_ms;
        self.fingerprints
            .retain(|_, first_seen| elapsed_ms(*first_seen, now) < dedupe_window);

        let lifetime = self.config.combo_lifetime_ms;
        let pending = &self.pending;
        self.combos.retain(|key, record| {
            pending.contains_key(key) || elapsed_ms(record.last_updated_at, now) < lifetime
        });
    }

    pub fn combo(&self, key: &ComboKey) -> Option<&ComboRecord> {
        self.combos.get(key)
    }

    pub fn pending_event(&self, key: &ComboKey) -> Option<&GiftEvent> {
        self.pending.get(key).map(|pending| &pending.event)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn combo_count(&self) -> usize {
        self.combos.len()
    }

    fn cancel_pending(&mut self, key: &ComboKey) {
        if let Some(pending) = self.pending.remove(key) {
            self.tasks.cancel(pending.task);
        }
    }

    fn mark_processed(&mut self, key: &ComboKey) {
        if let Some(record) = self.combos.get_mut(key) {
            record.processed = true;
        }
    }
}

fn elapsed_ms(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_milliseconds()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
