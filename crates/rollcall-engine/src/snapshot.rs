//! Per-community invite snapshot cache.

use std::collections::HashMap;

use crate::error::Result;
use crate::gateway::{InviteLink, PlatformGateway};

/// Last-observed invite lists, keyed by community id.
///
/// Purely in-memory; loss on restart only degrades attribution accuracy
/// until the next refresh. Snapshots are replaced wholesale, never
/// merged.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<String, Vec<InviteLink>>,
}

impl SnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
        }
    }

    /// Last cached snapshot for a community, empty if never populated.
    pub fn get(&self, community_id: &str) -> &[InviteLink] {
        self.snapshots
            .get(community_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Replace a community's snapshot.
    pub fn replace(&mut self, community_id: &str, links: Vec<InviteLink>) {
        self.snapshots.insert(community_id.to_string(), links);
    }

    /// Fetch the live invite list and replace the cached snapshot.
    /// Fetch failures propagate without touching the cache.
    pub fn refresh(
        &mut self,
        gateway: &dyn PlatformGateway,
        community_id: &str,
    ) -> Result<()> {
        let links = gateway.list_invites(community_id)?;
        self.replace(community_id, links);
        Ok(())
    }

    /// Number of communities with a cached snapshot.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
