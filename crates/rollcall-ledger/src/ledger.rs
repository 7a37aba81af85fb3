//! The ledger map and its uniqueness invariant.

use std::collections::BTreeMap;

use crate::record::InviterRecord;

/// Mapping from inviter id to accrued credit.
///
/// Invariant: a member id appears in at most one record's `invited_users`
/// at a time. Crediting happens only after any prior credit for the same
/// member has been reconciled away, so [`credit`](Self::credit) appends
/// without searching other records.
///
/// Backed by a `BTreeMap` so iteration order is stable; leaderboard ties
/// and the reconciliation scan are deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: BTreeMap<String, InviterRecord>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw records (as loaded from disk).
    pub fn from_records(records: BTreeMap<String, InviterRecord>) -> Self {
        Self { records }
    }

    /// Borrow the raw records (for persistence).
    pub fn records(&self) -> &BTreeMap<String, InviterRecord> {
        &self.records
    }

    /// Get an inviter's record.
    pub fn get(&self, inviter_id: &str) -> Option<&InviterRecord> {
        self.records.get(inviter_id)
    }

    /// An inviter's running count, 0 when no record exists.
    pub fn invite_count(&self, inviter_id: &str) -> i64 {
        self.records.get(inviter_id).map_or(0, |r| r.invites)
    }

    /// Credit a joining member to an inviter, creating the record lazily.
    pub fn credit(&mut self, inviter_id: &str, member_id: &str) {
        self.records
            .entry(inviter_id.to_string())
            .or_default()
            .credit(member_id);
    }

    /// Reverse the credit for a leaving member.
    ///
    /// Scans records in ledger order and stops at the first one holding
    /// the member. Returns the credited inviter's id, or `None` if the
    /// member was never attributed.
    pub fn revoke(&mut self, member_id: &str) -> Option<String> {
        for (inviter_id, record) in self.records.iter_mut() {
            if record.revoke(member_id) {
                return Some(inviter_id.clone());
            }
        }
        None
    }

    /// Find the inviter credited with a member, if any.
    pub fn inviter_of(&self, member_id: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|(_, record)| record.has_credited(member_id))
            .map(|(inviter_id, _)| inviter_id.as_str())
    }

    /// Add a delta to an inviter's count, creating the record if absent.
    /// The count is unbounded in both directions.
    pub fn adjust(&mut self, inviter_id: &str, delta: i64) -> i64 {
        let record = self.records.entry(inviter_id.to_string()).or_default();
        record.invites += delta;
        record.invites
    }

    /// Top inviters by count, descending, truncated to `limit`.
    /// Ties keep ledger iteration order (stable sort).
    pub fn leaderboard(&self, limit: usize) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> = self
            .records
            .iter()
            .map(|(id, record)| (id.clone(), record.invites))
            .collect();
        entries.sort_by_key(|(_, invites)| std::cmp::Reverse(*invites));
        entries.truncate(limit);
        entries
    }

    /// Number of inviter records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_creates_record_lazily() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.invite_count("alice"), 0);

        ledger.credit("alice", "member-1");

        assert_eq!(ledger.invite_count("alice"), 1);
        assert_eq!(ledger.inviter_of("member-1"), Some("alice"));
    }

    #[test]
    fn revoke_reverses_credit() {
        let mut ledger = Ledger::new();
        ledger.credit("alice", "member-1");
        ledger.credit("alice", "member-2");

        let inviter = ledger.revoke("member-1");

        assert_eq!(inviter.as_deref(), Some("alice"));
        assert_eq!(ledger.invite_count("alice"), 1);
        assert_eq!(ledger.inviter_of("member-1"), None);
    }

    #[test]
    fn revoke_without_credit_is_noop() {
        let mut ledger = Ledger::new();
        ledger.credit("alice", "member-1");

        assert_eq!(ledger.revoke("stranger"), None);
        assert_eq!(ledger.invite_count("alice"), 1);
    }

    #[test]
    fn member_credited_to_at_most_one_inviter() {
        let mut ledger = Ledger::new();

        // Join via alice, leave, rejoin via bob.
        ledger.credit("alice", "member-1");
        ledger.revoke("member-1");
        ledger.credit("bob", "member-1");

        let holders: Vec<_> = ledger
            .records()
            .iter()
            .filter(|(_, r)| r.has_credited("member-1"))
            .collect();
        assert_eq!(holders.len(), 1);
        assert_eq!(ledger.inviter_of("member-1"), Some("bob"));
    }

    #[test]
    fn adjust_may_go_negative() {
        let mut ledger = Ledger::new();

        assert_eq!(ledger.adjust("alice", -3), -3);
        assert_eq!(ledger.invite_count("alice"), -3);
        assert_eq!(ledger.adjust("alice", 5), 2);
    }

    #[test]
    fn leaderboard_is_non_increasing() {
        let mut ledger = Ledger::new();
        ledger.adjust("alice", 3);
        ledger.adjust("bob", 7);
        ledger.adjust("carol", 5);
        ledger.adjust("dave", 7);

        let board = ledger.leaderboard(10);

        assert_eq!(board.len(), 4);
        for pair in board.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        // Ties keep ledger (key) order.
        assert_eq!(board[0].0, "bob");
        assert_eq!(board[1].0, "dave");
    }

    #[test]
    fn leaderboard_truncates_to_limit() {
        let mut ledger = Ledger::new();
        for i in 0..20 {
            ledger.adjust(&format!("inviter-{i:02}"), i);
        }

        assert_eq!(ledger.leaderboard(10).len(), 10);
    }
}
