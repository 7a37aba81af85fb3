//! Per-inviter credit record.

use serde::{Deserialize, Serialize};

/// Accrued credit for a single inviter.
///
/// `invites` tracks the running count and may go negative under manual
/// overrides. `invited_users` holds the member ids currently credited to
/// this inviter, in credit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviterRecord {
    /// Running invite count.
    pub invites: i64,

    /// Member ids credited to this inviter.
    pub invited_users: Vec<String>,
}

impl InviterRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a joining member to this inviter.
    pub fn credit(&mut self, member_id: &str) {
        self.invites += 1;
        self.invited_users.push(member_id.to_string());
    }

    /// Reverse the credit for a leaving member.
    /// Returns true if the member was credited here.
    pub fn revoke(&mut self, member_id: &str) -> bool {
        match self.invited_users.iter().position(|m| m == member_id) {
            Some(idx) => {
                self.invited_users.remove(idx);
                self.invites -= 1;
                true
            }
            None => false,
        }
    }

    /// Check whether a member is credited to this inviter.
    pub fn has_credited(&self, member_id: &str) -> bool {
        self.invited_users.iter().any(|m| m == member_id)
    }
}
