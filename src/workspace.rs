//! # Scan Workspace
//!
//! The dedicated directory that holds one local repository copy per
//! scanned location. Acquired once at pipeline start and released on
//! every exit path: the default workspace is a `TempDir` whose `Drop`
//! removes it whether the scan succeeds, fails, or is cancelled. When the
//! caller asks to keep downloads, the workspace is a persistent directory
//! named after the scan label instead, and `Drop` leaves it alone.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;
use crate::source::RepositoryLocation;

/// The per-run fetch workspace.
pub struct ScanWorkspace {
    root: PathBuf,
    /// Present only for throwaway workspaces; its Drop is the cleanup.
    _temp: Option<TempDir>,
}

impl ScanWorkspace {
    /// Acquire the workspace for one run.
    ///
    /// With `keep_in: Some(base)` the workspace is `base/<label>` and is
    /// retained after the run; otherwise it is a fresh temp directory
    /// removed on drop.
    pub fn acquire(keep_in: Option<&Path>, label: &str) -> Result<Self> {
        match keep_in {
            Some(base) => {
                let dir = base.join(sanitize_label(label));
                fs::create_dir_all(&dir)?;
                log::info!("keeping downloads under {}", dir.display());
                Ok(Self {
                    root: dir,
                    _temp: None,
                })
            }
            None => {
                let temp = tempfile::Builder::new().prefix("authorscan-").tempdir()?;
                log::debug!("scan workspace at {}", temp.path().display());
                Ok(Self {
                    root: temp.path().to_path_buf(),
                    _temp: Some(temp),
                })
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetch destination for a location.
    ///
    /// Keyed by the full location, not the short name alone: duplicate
    /// short names within a scan set must not clobber each other.
    pub fn destination_for(&self, location: &RepositoryLocation) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        location.address.hash(&mut hasher);
        self.root
            .join(format!("{}-{:x}", location.short_name, hasher.finish()))
    }
}

/// Make a scan label filesystem-safe (labels may contain `/` from
/// shorthand targets or `+` joins from batch mode).
fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "scan".to_string()
    } else {
        cleaned
    }
}
