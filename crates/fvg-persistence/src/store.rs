//! Atomic JSON snapshot store for the risk gate state.

use crate::error::PersistenceResult;
use fvg_risk::RiskSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Saves and loads the date-stamped risk snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot atomically: serialize to a sibling temp file,
    /// then rename over the target so a crash mid-write never leaves a
    /// torn file.
    pub fn save(&self, snapshot: &RiskSnapshot) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), date = %snapshot.date, "risk snapshot saved");
        Ok(())
    }

    /// Load the last snapshot. A missing file is a normal first run; a
    /// corrupt or unreadable file is logged and treated the same way.
    /// The caller decides whether the snapshot's date is still current.
    pub fn load(&self) -> Option<RiskSnapshot> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no risk snapshot, starting fresh");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "risk snapshot unreadable, starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "risk snapshot corrupt, starting fresh");
                None
            }
        }
    }
}
