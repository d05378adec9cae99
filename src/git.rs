//! # Git Process Helpers
//!
//! Low-level wrappers around the system `git` command. Using the system
//! binary (rather than an embedded libgit2) automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! Everything here is a thin `std::process::Command` wrapper that captures
//! stderr and maps failures into [`crate::error::Error`]. Higher-level
//! policy (when to probe, when to skip, when a failure is fatal) lives in
//! the `source` and `fetch` modules.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Maximum directory depth (in levels below the target) at which local
/// repositories are discovered.
pub const MAX_DISCOVERY_DEPTH: usize = 3;

/// Outcome of a lightweight remote existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The location does not resolve to a repository at all.
    Missing,
    /// The location is a repository but advertises zero refs.
    Empty,
    /// The location is a repository with at least one ref.
    NonEmpty,
}

/// Probe whether `location` resolves to a reachable repository and whether
/// it has any refs, without cloning anything.
///
/// Works for local paths, `file://` URLs, and remote clone URLs alike;
/// `git ls-remote` handles all three.
pub fn probe(location: &str) -> Result<ProbeResult> {
    let output = Command::new("git")
        .args(["ls-remote", location])
        .output()
        .map_err(|e| Error::GitCommand {
            command: "ls-remote".to_string(),
            target: location.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        log::debug!(
            "ls-remote probe failed for {}: {}",
            location,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(ProbeResult::Missing);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.lines().any(|line| !line.trim().is_empty()) {
        Ok(ProbeResult::NonEmpty)
    } else {
        Ok(ProbeResult::Empty)
    }
}

/// Clone a repository into `target_dir` as a bare (no-checkout) copy.
///
/// The caller is expected to have confirmed the remote is reachable and
/// non-empty; a failure here is therefore reported as fatal by the fetcher.
pub fn clone_bare(url: &str, target_dir: &Path) -> Result<()> {
    // git won't clone into an existing non-empty directory
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .args(["clone", "--bare", "--quiet", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::RepositoryUnreachable {
            url: url.to_string(),
            message: e.to_string(),
            hint: None,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some(
                "make sure you have access to the repository: SSH key added to \
                 ssh-agent, git credentials configured, or a personal access token set up"
                    .to_string(),
            )
        } else {
            None
        };

        return Err(Error::RepositoryUnreachable {
            url: url.to_string(),
            message: stderr.trim().to_string(),
            hint,
        });
    }

    Ok(())
}

/// Fast-forward an existing bare copy to the remote's current heads.
pub fn update_heads(repo_dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args([
            "fetch",
            "--quiet",
            "--prune",
            "origin",
            "+refs/heads/*:refs/heads/*",
        ])
        .output()
        .map_err(|e| Error::GitCommand {
            command: "fetch".to_string(),
            target: repo_dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: "fetch".to_string(),
            target: repo_dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(())
}

/// Check whether a local repository has any refs at all.
pub fn has_refs(repo_dir: &Path) -> Result<bool> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .arg("show-ref")
        .output()
        .map_err(|e| Error::GitCommand {
            command: "show-ref".to_string(),
            target: repo_dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    // show-ref exits 1 (with no output) when the repository has no refs
    Ok(output.status.success() && !output.stdout.is_empty())
}

/// List `(email, name)` author pairs, one per commit, across all refs.
///
/// Output is verbatim from `git log`; no normalization happens here. A
/// repository with no commits yields an empty list.
pub fn log_authors(repo_dir: &Path) -> Result<Vec<(String, String)>> {
    if !has_refs(repo_dir)? {
        return Ok(Vec::new());
    }

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(["log", "--all", "--format=%ae\u{1f}%an"])
        .output()
        .map_err(|e| Error::GitCommand {
            command: "log".to_string(),
            target: repo_dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: "log --all".to_string(),
            target: repo_dir.display().to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let authors = stdout
        .lines()
        .map(|line| {
            // Unit separator: emails cannot contain it, and unlike a tab it
            // cannot appear in a configured user.name either.
            match line.split_once('\u{1f}') {
                Some((email, name)) => (email.to_string(), name.to_string()),
                None => (line.to_string(), String::new()),
            }
        })
        .collect();

    Ok(authors)
}

/// Recursively locate Git repositories under `root`, bounded to
/// [`MAX_DISCOVERY_DEPTH`] levels.
///
/// A repository is identified by a non-empty `.git` metadata directory.
/// Returns the repository working directories (the parents of the markers)
/// in sorted order so that resolution is independent of traversal order.
pub fn discover_repositories(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(MAX_DISCOVERY_DEPTH + 1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if entry.file_name() != ".git" || !entry.file_type().is_dir() {
            continue;
        }

        // Never descend *into* repository metadata
        walker.skip_current_dir();

        let marker_is_empty = fs::read_dir(entry.path())?.next().is_none();
        if marker_is_empty {
            log::debug!("ignoring empty .git marker at {}", entry.path().display());
            continue;
        }

        if let Some(repo_dir) = entry.path().parent() {
            found.push(repo_dir.to_path_buf());
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

#[cfg(test)]
pub(crate) fn init_test_repo(dir: &Path) {
    let status = Command::new("git")
        .args(["init", "--quiet"])
        .arg(dir)
        .status()
        .expect("git init failed to spawn");
    assert!(status.success());
}

#[cfg(test)]
pub(crate) fn commit_as(dir: &Path, email: &str, name: &str, message: &str) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            &format!("user.email={}", email),
            "-c",
            &format!("user.name={}", name),
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "--allow-empty",
            "-m",
            message,
        ])
        .status()
        .expect("git commit failed to spawn");
    assert!(status.success());
}
