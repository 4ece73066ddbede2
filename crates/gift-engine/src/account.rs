//! Per-user balances and lifetime statistics.

use std::collections::BTreeMap;

use serde::Serialize;
use wheel_db::wheel_state::UserStats;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub username: String,
    /// Unspent coins carried over between coin-mode allocations.
    pub coin_balance: u64,
    pub total_coins: u64,
    pub submissions: u64,
}

/// All known accounts, keyed by username. Accounts are created lazily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounts {
    by_user: BTreeMap<String, UserAccount>,
}

impl Accounts {
    /// Rebuild accounts from the two persisted maps. A user present in only
    /// one of them gets zeroes for the other half.
    pub fn from_persisted(
        balances: BTreeMap<String, u64>,
        stats: BTreeMap<String, UserStats>,
    ) -> Self {
        let mut accounts = Self::default();
        for (username, coin_balance) in balances {
            accounts.entry(&username).coin_balance = coin_balance;
        }
        for (username, s) in stats {
            let account = accounts.entry(&username);
            account.total_coins = s.total_coins;
            account.submissions = s.submissions;
        }
        accounts
    }

    pub fn balances(&self) -> BTreeMap<String, u64> {
        self.by_user
            .iter()
            .map(|(name, account)| (name.clone(), account.coin_balance))
            .collect()
    }

    pub fn stats(&self) -> BTreeMap<String, UserStats> {
        self.by_user
            .iter()
            .map(|(name, account)| {
                (
                    name.clone(),
                    UserStats {
                        total_coins: account.total_coins,
                        submissions: account.submissions,
                    },
                )
            })
            .collect()
    }

    pub fn entry(&mut self, username: &str) -> &mut UserAccount {
        self.by_user
            .entry(username.to_string())
            .or_insert_with(|| UserAccount {
                username: username.to_string(),
                ..UserAccount::default()
            })
    }

    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.by_user.get(username)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserAccount> {
        self.by_user.values()
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_user.clear();
    }
}
