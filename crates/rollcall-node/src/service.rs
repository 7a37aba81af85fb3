//! The service node: startup sync, event loop, and socket wiring.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use rollcall_engine::{InviteTracker, PlatformEvent, PlatformGateway};
use rollcall_ledger::LedgerStore;

use crate::command::CommandSocket;
use crate::config::NodeConfig;
use crate::error::Result;

/// Capacity of the platform event channel.
const EVENT_QUEUE_DEPTH: usize = 64;

/// A rollcall service node.
///
/// Owns the tracker behind a single mutex and applies events strictly
/// one at a time, which is what keeps full-file ledger persistence safe.
pub struct ServiceNode {
    config: NodeConfig,
    tracker: Arc<Mutex<InviteTracker>>,
    gateway: Arc<dyn PlatformGateway + Send + Sync>,
}

impl ServiceNode {
    /// Create a new node over the given gateway.
    pub fn new(
        config: NodeConfig,
        gateway: Arc<dyn PlatformGateway + Send + Sync>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let store = LedgerStore::new(config.ledger_path());
        let tracker = InviteTracker::open(store)?;

        Ok(Self {
            config,
            tracker: Arc::new(Mutex::new(tracker)),
            gateway,
        })
    }

    /// Get the shared tracker (for embedding and tests).
    pub fn tracker(&self) -> Arc<Mutex<InviteTracker>> {
        Arc::clone(&self.tracker)
    }

    /// Prime invite snapshots for every configured community.
    /// Per-community failures are logged and skipped, never fatal.
    pub async fn sync_communities(&self) {
        let mut tracker = self.tracker.lock().await;
        for community_id in &self.config.communities {
            if let Err(e) = tracker.sync_community(self.gateway.as_ref(), community_id) {
                tracing::warn!(community_id, "Startup invite sync failed: {}", e);
            }
        }
    }

    /// Apply one platform event to the tracker.
    ///
    /// Failures abort that event's handling only; the node keeps
    /// running.
    pub async fn handle_event(&self, event: PlatformEvent) {
        let mut tracker = self.tracker.lock().await;
        let result = match &event {
            PlatformEvent::MemberJoined {
                community_id,
                member_id,
            } => tracker
                .member_joined(self.gateway.as_ref(), community_id, member_id)
                .map(|_| ()),
            PlatformEvent::MemberLeft {
                community_id,
                member_id,
            } => tracker.member_left(community_id, member_id).map(|_| ()),
        };

        if let Err(e) = result {
            tracing::warn!(event = ?event, "Event handling failed: {}", e);
        }
    }

    /// Run the node: startup sync, command socket, then the event loop.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Rollcall node starting");
        tracing::info!("  Data:   {}", self.config.data_dir.display());
        tracing::info!("  Socket: {}", self.config.admin_socket.display());
        tracing::info!("  Communities: {:?}", self.config.communities);

        self.sync_communities().await;

        let (events_tx, mut events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

        let socket = CommandSocket::new(
            Arc::clone(&self.tracker),
            Arc::clone(&self.gateway),
            self.config.admin_socket.clone(),
            events_tx,
        );
        tokio::spawn(async move {
            if let Err(e) = socket.run().await {
                tracing::error!("Command socket error: {}", e);
            }
        });

        // Single consumer: one event at a time, in arrival order.
        while let Some(event) = events_rx.recv().await {
            self.handle_event(event).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use crate::file_gateway::FileGateway;

    use super::*;

    fn write_listing(data_dir: &Path, community_id: &str, json: &str) {
        let invites = data_dir.join("invites");
        fs::create_dir_all(&invites).unwrap();
        fs::write(invites.join(format!("{community_id}.json")), json).unwrap();
    }

    fn node_in(data_dir: &Path, communities: &[&str]) -> ServiceNode {
        let config = NodeConfig {
            data_dir: data_dir.to_path_buf(),
            admin_socket: data_dir.join("admin.sock"),
            communities: communities.iter().map(|c| c.to_string()).collect(),
        };
        let gateway = Arc::new(FileGateway::new(data_dir));
        ServiceNode::new(config, gateway).unwrap()
    }

    #[tokio::test]
    async fn join_event_attributes_through_the_file_gateway() {
        let dir = tempdir().unwrap();
        write_listing(
            dir.path(),
            "community-1",
            r#"[{"code":"ABC","owner_id":"alice","uses":5},
                {"code":"XYZ","owner_id":"bob","uses":2}]"#,
        );

        let node = node_in(dir.path(), &["community-1"]);
        node.sync_communities().await;

        write_listing(
            dir.path(),
            "community-1",
            r#"[{"code":"ABC","owner_id":"alice","uses":6},
                {"code":"XYZ","owner_id":"bob","uses":2}]"#,
        );
        node.handle_event(PlatformEvent::MemberJoined {
            community_id: "community-1".to_string(),
            member_id: "member-1".to_string(),
        })
        .await;

        let tracker = node.tracker();
        let tracker = tracker.lock().await;
        assert_eq!(tracker.invite_count("alice"), 1);
        assert_eq!(tracker.who_invited("member-1"), Some("alice"));
    }

    #[tokio::test]
    async fn leave_event_reverses_the_credit() {
        let dir = tempdir().unwrap();
        write_listing(
            dir.path(),
            "community-1",
            r#"[{"code":"ABC","owner_id":"alice","uses":5}]"#,
        );

        let node = node_in(dir.path(), &["community-1"]);
        node.sync_communities().await;

        write_listing(
            dir.path(),
            "community-1",
            r#"[{"code":"ABC","owner_id":"alice","uses":6}]"#,
        );
        node.handle_event(PlatformEvent::MemberJoined {
            community_id: "community-1".to_string(),
            member_id: "member-1".to_string(),
        })
        .await;
        node.handle_event(PlatformEvent::MemberLeft {
            community_id: "community-1".to_string(),
            member_id: "member-1".to_string(),
        })
        .await;

        let tracker = node.tracker();
        let tracker = tracker.lock().await;
        assert_eq!(tracker.invite_count("alice"), 0);
        assert_eq!(tracker.who_invited("member-1"), None);
    }

    #[tokio::test]
    async fn startup_sync_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        write_listing(dir.path(), "broken", "not json");

        let node = node_in(dir.path(), &["broken"]);
        // Must not panic or error out.
        node.sync_communities().await;
    }

    #[tokio::test]
    async fn node_reopens_persisted_ledger() {
        let dir = tempdir().unwrap();
        write_listing(
            dir.path(),
            "community-1",
            r#"[{"code":"ABC","owner_id":"alice","uses":5}]"#,
        );

        {
            let node = node_in(dir.path(), &["community-1"]);
            node.sync_communities().await;
            write_listing(
                dir.path(),
                "community-1",
                r#"[{"code":"ABC","owner_id":"alice","uses":6}]"#,
            );
            node.handle_event(PlatformEvent::MemberJoined {
                community_id: "community-1".to_string(),
                member_id: "member-1".to_string(),
            })
            .await;
        }

        let node = node_in(dir.path(), &[]);
        let tracker = node.tracker();
        assert_eq!(tracker.lock().await.invite_count("alice"), 1);
    }
}
