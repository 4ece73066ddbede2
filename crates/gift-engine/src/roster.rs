//! Capacity-bounded participant roster. The same user may hold many slots.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    entries: Vec<String>,
    /// 0 means unbounded.
    max_limit: u32,
}

impl Roster {
    pub fn new(entries: Vec<String>, max_limit: u32) -> Self {
        Self { entries, max_limit }
    }

    pub fn max_limit(&self) -> u32 {
        self.max_limit
    }

    /// Lowering the limit below the current length keeps existing entries;
    /// it only blocks further appends.
    pub fn set_max_limit(&mut self, max_limit: u32) {
        self.max_limit = max_limit;
    }

    pub fn is_full(&self) -> bool {
        self.max_limit > 0 && self.entries.len() >= self.max_limit as usize
    }

    /// Append one entry. Rejects blank names and appends past the limit.
    pub fn append(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.is_full() {
            return false;
        }
        self.entries.push(name.to_string());
        true
    }

    /// Remove the first occurrence of `name`.
    pub fn remove_one(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|entry| entry == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_last(&mut self) -> Option<String> {
        self.entries.pop()
    }

    /// Returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.entries.iter().filter(|entry| *entry == name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_allows_duplicates_until_full() {
        let mut roster = Roster::new(Vec::new(), 3);
        assert!(roster.append("alice"));
        assert!(roster.append("alice"));
        assert!(roster.append(" bob "));
        assert!(roster.is_full());
        assert!(!roster.append("carol"));

        assert_eq!(roster.entries(), ["alice", "alice", "bob"]);
        assert_eq!(roster.count_of("alice"), 2);
    }

    #[test]
    fn zero_limit_is_unbounded() {
        let mut roster = Roster::default();
        for _ in 0..500 {
            assert!(roster.append("alice"));
        }
        assert_eq!(roster.len(), 500);
        assert!(!roster.is_full());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut roster = Roster::default();
        assert!(!roster.append(""));
        assert!(!roster.append("   "));
        assert!(roster.is_empty());
    }

    #[test]
    fn remove_one_takes_first_match_only() {
        let mut roster = Roster::new(vec!["a".into(), "b".into(), "a".into()], 0);
        assert!(roster.remove_one("a"));
        assert_eq!(roster.entries(), ["b", "a"]);
        assert!(!roster.remove_one("zzz"));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn remove_last_and_clear() {
        let mut roster = Roster::new(vec!["a".into(), "b".into()], 0);
        assert_eq!(roster.remove_last().as_deref(), Some("b"));
        assert_eq!(roster.clear(), 1);
        assert_eq!(roster.remove_last(), None);
        assert_eq!(roster.clear(), 0);
    }

    #[test]
    fn lowering_limit_keeps_existing_entries() {
        let mut roster = Roster::new(vec!["a".into(), "b".into(), "c".into()], 0);
        roster.set_max_limit(2);
        assert_eq!(roster.len(), 3);
        assert!(!roster.append("d"));
        assert_eq!(roster.get(2), Some("c"));
    }
}
