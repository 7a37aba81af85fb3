//! Error types for the node.

use thiserror::Error;

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur running the node.
#[derive(Debug, Error)]
pub enum Error {
    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] rollcall_engine::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
