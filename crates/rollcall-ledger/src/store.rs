//! Ledger persistence as a single JSON object file.
//!
//! The whole ledger is rewritten on every save; readers only ever see a
//! complete previous or complete new state because the write lands in a
//! temp file first and is renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ledger::Ledger;
use crate::record::InviterRecord;

/// File-backed store for the ledger.
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// Create a store backed by the given file path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger from disk.
    ///
    /// An absent file, an empty file, or unparseable content all yield an
    /// empty ledger; corruption is recovered, not fatal.
    pub fn load(&self) -> Result<Ledger> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Ledger::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Ledger::new());
        }

        match serde_json::from_str::<BTreeMap<String, InviterRecord>>(&content) {
            Ok(records) => Ok(Ledger::from_records(records)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e,
                    "Ledger file is corrupt, starting from an empty ledger");
                Ok(Ledger::new())
            }
        }
    }

    /// Persist the full ledger, atomically replacing the previous file.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(ledger.records())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
