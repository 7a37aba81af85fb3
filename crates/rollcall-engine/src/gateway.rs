//! The platform collaborator seam.
//!
//! The engines never talk to a community platform directly; they consume
//! a [`PlatformGateway`] for invite listings and identity lookup, and the
//! node feeds them [`PlatformEvent`]s from whatever session layer it is
//! wired to. Startup authentication against the platform is out of scope.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An invite link as observed on the platform.
///
/// Transient: rebuilt from the gateway on startup and after each join,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteLink {
    /// Platform-assigned code, unique within a community.
    pub code: String,

    /// Identity of the link's owner (the inviter).
    pub owner_id: String,

    /// Use counter. Monotonically non-decreasing on the platform side.
    pub uses: u64,
}

impl InviteLink {
    /// Create a link observation.
    pub fn new(code: &str, owner_id: &str, uses: u64) -> Self {
        Self {
            code: code.to_string(),
            owner_id: owner_id.to_string(),
            uses,
        }
    }
}

/// Membership events delivered by the platform session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// A member joined a community.
    MemberJoined {
        community_id: String,
        member_id: String,
    },
    /// A member left a community.
    MemberLeft {
        community_id: String,
        member_id: String,
    },
}

/// Capabilities the engines consume from the platform.
pub trait PlatformGateway {
    /// Current invite list for a community, in platform-returned order.
    ///
    /// The order matters: attribution breaks diff ties by scanning this
    /// order, so implementations must not re-sort.
    fn list_invites(&self, community_id: &str) -> Result<Vec<InviteLink>>;

    /// Resolve a display name for an identity, `None` when unknown.
    /// Callers fall back to the raw id.
    fn display_name(&self, user_id: &str) -> Option<String>;
}
