//! Error types for the attribution engines.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur handling events and commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Platform fetch failure. Aborts the current event's handling only.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Ledger persistence failure.
    #[error("Persistence error: {0}")]
    Persistence(#[from] rollcall_ledger::Error),

    /// Admin command from an actor without the admin capability.
    /// Reported to the invoking actor, not a system fault.
    #[error("actor {0} is not an administrator")]
    Unauthorized(String),
}
