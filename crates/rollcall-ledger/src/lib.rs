//! Rollcall Ledger - durable inviter credit bookkeeping.
//!
//! The ledger is the sole source of truth for invite counts. It maps an
//! inviter id to an [`InviterRecord`]: the running count plus the set of
//! member ids currently credited to that inviter. A member id appears in
//! at most one record's credited set at a time.
//!
//! Persistence is a single JSON object file, rewritten wholesale on every
//! mutation through [`LedgerStore`]. Writes go through a temp-file rename
//! so a failed save never corrupts the previous state on disk.

pub mod error;
pub mod ledger;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use ledger::Ledger;
pub use record::InviterRecord;
pub use store::LedgerStore;
