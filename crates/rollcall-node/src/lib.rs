//! Rollcall Node - service wiring around the attribution engines.
//!
//! The node owns the single serialized event stream: platform join/leave
//! events and admin commands all funnel through one mutex-guarded
//! [`rollcall_engine::InviteTracker`], so ledger read-modify-write
//! sequences never interleave.
//!
//! # Architecture
//!
//! - **Config**: environment-variable configuration with defaults
//! - **Service**: startup sync, the event loop, task spawning
//! - **Command socket**: Unix-socket JSON-lines command surface
//!   (queries, admin overrides, and event injection), served to the
//!   `rollcall-admin` CLI and platform adapters
//! - **File gateway**: a [`rollcall_engine::PlatformGateway`] backed by
//!   JSON files under the data directory, for local operation; embedders
//!   supply their own gateway
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollcall_node::{FileGateway, NodeConfig, ServiceNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::default();
//!     let gateway = Arc::new(FileGateway::new(&config.data_dir));
//!     let node = ServiceNode::new(config, gateway)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod file_gateway;
pub mod service;

pub use command::{Command, CommandSocket, Response};
pub use config::NodeConfig;
pub use error::{Error, Result};
pub use file_gateway::FileGateway;
pub use service::ServiceNode;
