//! File-backed platform gateway for local operation.
//!
//! The real platform session protocol is out of scope; this gateway lets
//! the shipped binary run against invite listings materialized on disk by
//! an external adapter. Listings live at `<data_dir>/invites/<community>.json`
//! as a JSON array of links; display names come from an optional
//! `<data_dir>/names.json` object.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rollcall_engine::{Error, InviteLink, PlatformGateway, Result};

/// Gateway serving invite listings from JSON files.
pub struct FileGateway {
    invites_dir: PathBuf,
    names_path: PathBuf,
}

impl FileGateway {
    /// Create a gateway rooted at the node's data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            invites_dir: data_dir.join("invites"),
            names_path: data_dir.join("names.json"),
        }
    }

    fn listing_path(&self, community_id: &str) -> Result<PathBuf> {
        // Community ids become file names; keep them inside invites/.
        if community_id.contains('/') || community_id.contains('\\') || community_id.contains("..") {
            return Err(Error::Platform(format!(
                "invalid community id: {community_id}"
            )));
        }
        Ok(self.invites_dir.join(format!("{community_id}.json")))
    }
}

impl PlatformGateway for FileGateway {
    fn list_invites(&self, community_id: &str) -> Result<Vec<InviteLink>> {
        let path = self.listing_path(community_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            // No listing materialized yet reads as no invites, which is
            // how a community without links looks on the platform.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Platform(format!(
                    "reading invite listing {}: {e}",
                    path.display()
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            Error::Platform(format!("parsing invite listing {}: {e}", path.display()))
        })
    }

    fn display_name(&self, user_id: &str) -> Option<String> {
        let content = fs::read_to_string(&self.names_path).ok()?;
        let names: HashMap<String, String> = serde_json::from_str(&content).ok()?;
        names.get(user_id).cloned()
    }
}
