//! Rollcall Engine - invite attribution for community platforms.
//!
//! When a member joins, the engine diffs the community's live invite list
//! against the last-observed snapshot to find the link that was consumed,
//! and credits its owner in the ledger. When an attributed member later
//! leaves, the credit is reversed.
//!
//! # Architecture
//!
//! - **Gateway**: the platform collaborator seam ([`PlatformGateway`])
//! - **Snapshot cache**: per-community last-observed invite use counts
//! - **Attribution**: the snapshot diff locating the consumed link
//! - **Tracker**: composition of cache + ledger, join/leave handling and
//!   the query/admin surface
//!
//! Attribution is a best-effort heuristic: it assumes at most one link's
//! use count increased between snapshots. Concurrent joins through
//! different links in the same interval can misattribute; that ambiguity
//! is inherent to the counter-diff approach and is deliberately not
//! papered over.

pub mod attribution;
pub mod error;
pub mod gateway;
pub mod snapshot;
pub mod tracker;

pub use error::{Error, Result};
pub use gateway::{InviteLink, PlatformEvent, PlatformGateway};
pub use snapshot::SnapshotCache;
pub use tracker::{Actor, InviteTracker};
