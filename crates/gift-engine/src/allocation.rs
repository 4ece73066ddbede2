//! Turns a canonical gift event into roster entries.

use serde::Serialize;

use crate::account::UserAccount;
use crate::event::GiftEvent;
use crate::roster::Roster;

/// Upper bound on entries a single gift can add, whatever its count or value.
pub const MAX_ENTRIES_PER_GIFT: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// One entry per gift in the combo.
    Count,
    /// One entry per `min_coins` coins, remainder carried over.
    Coin,
}

impl AllocationMode {
    pub fn from_min_coins(min_coins: u64) -> Self {
        if min_coins == 0 { Self::Count } else { Self::Coin }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReport {
    pub event: GiftEvent,
    pub mode: AllocationMode,
    /// Entries the gift was worth before capacity was applied, at most
    /// [`MAX_ENTRIES_PER_GIFT`].
    pub entries_earned: u64,
    pub entries_added: u64,
    pub account: UserAccount,
    pub roster_len: usize,
}

impl AllocationReport {
    pub fn capacity_limited(&self) -> bool {
        self.entries_added < self.entries_earned
    }
}

/// Apply `event` to `account` and `roster`. Stops quietly once the roster is
/// full; in coin mode the unplaced coins stay in the balance.
pub fn allocate(
    event: GiftEvent,
    min_coins: u64,
    roster: &mut Roster,
    account: &mut UserAccount,
) -> AllocationReport {
    let mode = AllocationMode::from_min_coins(min_coins);
    account.total_coins = account.total_coins.saturating_add(event.coin_value);

    let (entries_earned, entries_added) = match mode {
        AllocationMode::Count => {
            let earned = capped(u64::from(event.repeat_count), &event.username);
            let mut added = 0;
            while added < earned && roster.append(&event.username) {
                added += 1;
                account.submissions += 1;
            }
            (earned, added)
        }
        AllocationMode::Coin => {
            account.coin_balance = account.coin_balance.saturating_add(event.coin_value);
            let earned = capped(account.coin_balance / min_coins, &event.username);
            let mut added = 0;
            while added < earned && roster.append(&event.username) {
                added += 1;
                account.coin_balance -= min_coins;
                account.submissions += 1;
            }
            (earned, added)
        }
    };

    AllocationReport {
        mode,
        entries_earned,
        entries_added,
        account: account.clone(),
        roster_len: roster.len(),
        event,
    }
}

fn capped(earned: u64, username: &str) -> u64 {
    if earned > MAX_ENTRIES_PER_GIFT {
        tracing::warn!(
            %username,
            earned,
            cap = MAX_ENTRIES_PER_GIFT,
            "Gift worth more entries than one gift may add, capping"
        );
    }
    earned.min(MAX_ENTRIES_PER_GIFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;

    fn gift(username: &str, repeat_count: u32, coin_value: u64) -> GiftEvent {
        GiftEvent {
            username: username.to_string(),
            gift_id: "rose".to_string(),
            gift_name: None,
            repeat_count,
            coin_value,
            raw_payload: Value::Null,
            received_at: Utc::now(),
        }
    }

    fn account(username: &str) -> UserAccount {
        UserAccount {
            username: username.to_string(),
            ..UserAccount::default()
        }
    }

    #[test]
    fn count_mode_adds_one_entry_per_gift() {
        let mut roster = Roster::default();
        let mut alice = account("alice");

        let report = allocate(gift("alice", 5, 5), 0, &mut roster, &mut alice);

        assert_eq!(report.mode, AllocationMode::Count);
        assert_eq!(report.entries_added, 5);
        assert_eq!(roster.count_of("alice"), 5);
        assert_eq!(alice.submissions, 5);
        assert_eq!(alice.total_coins, 5);
        assert_eq!(alice.coin_balance, 0);
    }

    #[test]
    fn coin_mode_carries_remainder() {
        let mut roster = Roster::default();
        let mut alice = account("alice");

        let first = allocate(gift("alice", 1, 60), 100, &mut roster, &mut alice);
        assert_eq!(first.entries_added, 0);
        assert_eq!(alice.coin_balance, 60);

        let second = allocate(gift("alice", 1, 60), 100, &mut roster, &mut alice);
        assert_eq!(second.entries_added, 1);
        assert_eq!(alice.coin_balance, 20);
        assert_eq!(alice.submissions, 1);
        assert_eq!(alice.total_coins, 120);
        assert_eq!(roster.entries(), ["alice"]);
    }

    #[test]
    fn full_roster_adds_nothing_and_keeps_balance() {
        let mut roster = Roster::new(vec!["a".into(), "b".into(), "c".into()], 3);
        let mut bob = account("bob");

        let report = allocate(gift("bob", 1, 500), 100, &mut roster, &mut bob);
        assert_eq!(report.entries_earned, 5);
        assert_eq!(report.entries_added, 0);
        assert!(report.capacity_limited());
        assert_eq!(bob.coin_balance, 500);
        assert_eq!(bob.submissions, 0);
        assert_eq!(bob.total_coins, 500);

        let report = allocate(gift("bob", 4, 4), 0, &mut roster, &mut bob);
        assert_eq!(report.entries_added, 0);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn partial_allocation_stops_at_capacity() {
        let mut roster = Roster::new(vec!["a".into()], 3);
        let mut carol = account("carol");

        let report = allocate(gift("carol", 1, 350), 100, &mut roster, &mut carol);
        assert_eq!(report.entries_earned, 3);
        assert_eq!(report.entries_added, 2);
        assert_eq!(carol.coin_balance, 150);
        assert_eq!(report.roster_len, 3);
        assert_eq!(report.account, carol);
    }

    #[test]
    fn huge_gift_is_capped_per_allocation() {
        let mut roster = Roster::default();
        let mut mallory = account("mallory");

        let report = allocate(gift("mallory", u32::MAX, 1), 0, &mut roster, &mut mallory);
        assert_eq!(report.entries_earned, MAX_ENTRIES_PER_GIFT);
        assert_eq!(report.entries_added, MAX_ENTRIES_PER_GIFT);
        assert_eq!(roster.len() as u64, MAX_ENTRIES_PER_GIFT);

        let mut roster = Roster::default();
        let mut trent = account("trent");
        let report = allocate(gift("trent", 1, u64::MAX), 1, &mut roster, &mut trent);
        assert_eq!(report.entries_added, MAX_ENTRIES_PER_GIFT);
        assert_eq!(trent.coin_balance, u64::MAX - MAX_ENTRIES_PER_GIFT);
        assert_eq!(trent.total_coins, u64::MAX);
    }
}
