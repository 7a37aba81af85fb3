//! Rollcall node binary
//!
//! Invite attribution daemon for community platforms.

use std::sync::Arc;

use rollcall_node::{FileGateway, NodeConfig, ServiceNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rollcall_node=info,rollcall_engine=info,rollcall_ledger=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rollcall Node");

    let config = NodeConfig::default();
    let gateway = Arc::new(FileGateway::new(&config.data_dir));

    let node = ServiceNode::new(config, gateway)?;
    node.run().await?;

    Ok(())
}
