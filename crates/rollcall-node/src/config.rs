//! Node configuration.

use std::path::PathBuf;

/// Configuration for a rollcall node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory (ledger file, invite listings, socket).
    pub data_dir: PathBuf,

    /// Admin/command socket path (for rollcall-admin and adapters).
    pub admin_socket: PathBuf,

    /// Communities whose invite snapshots are primed at startup.
    pub communities: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("ROLLCALL_DATA_DIR").unwrap_or_else(|_| "./rollcall-data".to_string()),
        );

        let admin_socket = std::env::var("ROLLCALL_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("admin.sock"));

        let communities = std::env::var("ROLLCALL_COMMUNITIES")
            .map(|s| {
                s.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            data_dir,
            admin_socket,
            communities,
        }
    }

    /// Path of the ledger file inside the data directory.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("joins.json")
    }
}
