//! Invite tracker - composition of the snapshot cache and the ledger.
//!
//! One tracker instance owns all mutable state. Callers in a concurrent
//! runtime must serialize access (the node wraps the tracker in a single
//! mutex); the ledger is rewritten in full on every mutation, so two
//! unserialized writers would clobber each other.

use serde::{Deserialize, Serialize};

use rollcall_ledger::{Ledger, LedgerStore};

use crate::attribution::consumed_link;
use crate::error::{Error, Result};
use crate::gateway::PlatformGateway;
use crate::snapshot::SnapshotCache;

/// The identity invoking an admin or query command, with its permission
/// flags as derived by the command surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Identity of the invoking user.
    pub id: String,

    /// Whether the actor holds the administrative capability.
    pub admin: bool,
}

impl Actor {
    /// Create an actor.
    pub fn new(id: &str, admin: bool) -> Self {
        Self {
            id: id.to_string(),
            admin,
        }
    }
}

/// Attribution, reconciliation, and the query/admin surface over one
/// shared ledger.
pub struct InviteTracker {
    store: LedgerStore,
    ledger: Ledger,
    snapshots: SnapshotCache,
}

impl InviteTracker {
    /// Open a tracker over the given store, loading any persisted ledger.
    pub fn open(store: LedgerStore) -> Result<Self> {
        let ledger = store.load()?;
        Ok(Self {
            store,
            ledger,
            snapshots: SnapshotCache::new(),
        })
    }

    /// Prime the snapshot cache for a community.
    ///
    /// Called once per community at startup. Failures leave the cache
    /// unpopulated for that community; attribution degrades until the
    /// next successful refresh.
    pub fn sync_community(
        &mut self,
        gateway: &dyn PlatformGateway,
        community_id: &str,
    ) -> Result<()> {
        self.snapshots.refresh(gateway, community_id)?;
        tracing::debug!(
            community_id,
            links = self.snapshots.get(community_id).len(),
            "Primed invite snapshot"
        );
        Ok(())
    }

    /// Handle a member-join event: attribute the join to an invite link
    /// and credit its owner.
    ///
    /// Returns the credited inviter's id, or `None` when no link could be
    /// attributed (a normal, silent outcome). The snapshot cache is
    /// replaced with the live list either way; only a fetch failure
    /// leaves it untouched and aborts the event.
    pub fn member_joined(
        &mut self,
        gateway: &dyn PlatformGateway,
        community_id: &str,
        member_id: &str,
    ) -> Result<Option<String>> {
        let new = gateway.list_invites(community_id)?;
        let old = self.snapshots.get(community_id);

        let consumed = consumed_link(old, &new)
            .map(|link| (link.code.clone(), link.owner_id.clone()));

        self.snapshots.replace(community_id, new);

        let Some((code, inviter_id)) = consumed else {
            tracing::debug!(community_id, member_id, "Join with no attributable invite");
            return Ok(None);
        };

        self.ledger.credit(&inviter_id, member_id);
        self.store.save(&self.ledger)?;

        tracing::info!(
            community_id,
            member_id,
            inviter_id = %inviter_id,
            code = %code,
            "Attributed join to invite link"
        );
        Ok(Some(inviter_id))
    }

    /// Handle a member-leave event: reverse the credit for the leaver.
    ///
    /// The search deliberately ignores the community and scans the whole
    /// ledger; a member is credited to at most one inviter. Returns the
    /// inviter whose credit was reversed, `None` when the member was
    /// never attributed.
    pub fn member_left(
        &mut self,
        _community_id: &str,
        member_id: &str,
    ) -> Result<Option<String>> {
        let Some(inviter_id) = self.ledger.revoke(member_id) else {
            return Ok(None);
        };

        self.store.save(&self.ledger)?;
        tracing::info!(member_id, inviter_id = %inviter_id, "Reversed invite credit on leave");
        Ok(Some(inviter_id))
    }

    /// An inviter's running count, 0 when unknown. Never fails.
    pub fn invite_count(&self, user_id: &str) -> i64 {
        self.ledger.invite_count(user_id)
    }

    /// Top inviters by count, descending, truncated to `limit`.
    pub fn leaderboard(&self, limit: usize) -> Vec<(String, i64)> {
        self.ledger.leaderboard(limit)
    }

    /// Admin override: add a delta to a user's count, creating the
    /// record if absent. The count is unbounded in both directions.
    ///
    /// Requires the actor's admin capability; rejected with
    /// [`Error::Unauthorized`] otherwise, leaving the ledger untouched.
    /// Returns the new count.
    pub fn set_invites(&mut self, actor: &Actor, user_id: &str, delta: i64) -> Result<i64> {
        if !actor.admin {
            return Err(Error::Unauthorized(actor.id.clone()));
        }

        let invites = self.ledger.adjust(user_id, delta);
        self.store.save(&self.ledger)?;

        tracing::info!(
            actor_id = %actor.id,
            user_id,
            delta,
            invites,
            "Manual invite count override"
        );
        Ok(invites)
    }

    /// Reverse lookup: the inviter credited with a user's join, if any.
    pub fn who_invited(&self, user_id: &str) -> Option<&str> {
        self.ledger.inviter_of(user_id)
    }

    /// Borrow the ledger (read-only).
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
