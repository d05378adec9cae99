//! # Repository Fetcher
//!
//! Ensures a local, queryable copy of a repository exists at a destination
//! path: clone if absent, optionally update if present, and never re-fetch
//! unnecessarily. Repeated scans of the same target with retained downloads
//! are cheap because the default path reuses an existing copy without any
//! network access.
//!
//! ## Design
//!
//! Git actions go through the [`GitOperations`] trait so tests can swap in
//! mock implementations and simulate empty remotes, failed updates, and
//! clone recovery without touching the network. The main application uses
//! [`DefaultGitOperations`], which wraps the system `git` command.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::git::{self, ProbeResult};
use crate::source::RepositoryLocation;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Lightweight existence probe, no clone required.
    fn probe(&self, location: &str) -> Result<ProbeResult>;

    /// Bare, no-checkout clone into `target_dir`.
    fn clone_bare(&self, url: &str, target_dir: &Path) -> Result<()>;

    /// Fast-forward an existing copy to the remote heads.
    fn update_heads(&self, repo_dir: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn probe(&self, location: &str) -> Result<ProbeResult> {
        git::probe(location)
    }

    fn clone_bare(&self, url: &str, target_dir: &Path) -> Result<()> {
        git::clone_bare(url, target_dir)
    }

    fn update_heads(&self, repo_dir: &Path) -> Result<()> {
        git::update_heads(repo_dir)
    }
}

/// Outcome of ensuring a local copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A queryable local path, ready for extraction.
    Local(PathBuf),
    /// The remote exists but has no history; extraction is skipped.
    SkippedEmpty,
}

/// Fetches repositories into a scan workspace.
pub struct Fetcher {
    git_ops: Box<dyn GitOperations>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Creates a `Fetcher` with a custom `GitOperations` implementation.
    ///
    /// This is primarily used for testing to inject mock operations.
    #[cfg(test)]
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Ensure a local copy of `location` exists at `dest`.
    ///
    /// - `file://` locations are returned unchanged and never touched.
    /// - A missing destination triggers a probe-then-clone; an empty remote
    ///   is a soft skip, not an error.
    /// - An existing destination is reused as-is unless `update` was
    ///   requested, in which case a failed in-place update falls back to a
    ///   fresh clone that atomically replaces the old copy. A corrupted or
    ///   diverged copy must not block the scan.
    pub fn ensure_local(
        &self,
        location: &RepositoryLocation,
        dest: &Path,
        update: bool,
    ) -> Result<FetchOutcome> {
        if let Some(local) = location.local_path() {
            return Ok(FetchOutcome::Local(local.to_path_buf()));
        }

        if dest.exists() {
            if update {
                if let Err(err) = self.git_ops.update_heads(dest) {
                    log::warn!(
                        "update failed for {}, falling back to fresh clone: {}",
                        location.address,
                        err
                    );
                    self.replace_with_fresh_clone(&location.address, dest)?;
                }
            } else {
                log::debug!("reusing existing copy at {}", dest.display());
            }
            return Ok(FetchOutcome::Local(dest.to_path_buf()));
        }

        match self.git_ops.probe(&location.address)? {
            ProbeResult::Empty => {
                log::info!("repository empty, skipping: {}", location.address);
                Ok(FetchOutcome::SkippedEmpty)
            }
            ProbeResult::Missing => Err(Error::RepositoryUnreachable {
                url: location.address.clone(),
                message: "remote is not reachable".to_string(),
                hint: None,
            }),
            ProbeResult::NonEmpty => {
                self.git_ops.clone_bare(&location.address, dest)?;
                Ok(FetchOutcome::Local(dest.to_path_buf()))
            }
        }
    }

    /// Clone into a side-by-side path, then atomically replace the old
    /// destination (remove old, rename new into place).
    fn replace_with_fresh_clone(&self, url: &str, dest: &Path) -> Result<()> {
        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "clone".to_string());
        let side = dest.with_file_name(format!("{}.new", file_name));

        self.git_ops.clone_bare(url, &side)?;
        fs::remove_dir_all(dest)?;
        fs::rename(&side, dest)?;
        Ok(())
    }
}
