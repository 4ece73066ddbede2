//! Ranking derived from account statistics. Always recomputed, never cached.

use serde::Serialize;

use crate::account::{Accounts, UserAccount};

pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub total_coins: u64,
    pub submissions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardView {
    Top(usize),
    Full,
}

impl LeaderboardView {
    /// Parse a `limit` query value: `all`, a positive number, or the default top list.
    pub fn parse(limit: Option<&str>) -> Self {
        match limit.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("all") => Self::Full,
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => Self::Top(n),
                _ => Self::Top(TOP_N),
            },
            None => Self::Top(TOP_N),
        }
    }
}

/// Total coins descending, then username ascending.
pub fn rank(accounts: &Accounts) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&UserAccount> = accounts.iter().collect();
    sorted.sort_by(|a, b| {
        b.total_coins
            .cmp(&a.total_coins)
            .then_with(|| a.username.cmp(&b.username))
    });

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, account)| LeaderboardEntry {
            rank: index + 1,
            username: account.username.clone(),
            total_coins: account.total_coins,
            submissions: account.submissions,
        })
        .collect()
}

pub fn view(accounts: &Accounts, view: LeaderboardView) -> Vec<LeaderboardEntry> {
    let mut ranked = rank(accounts);
    if let LeaderboardView::Top(n) = view {
        ranked.truncate(n);
    }
    ranked
}
