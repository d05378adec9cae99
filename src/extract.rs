//! # Author Extraction
//!
//! Walks the full commit history of a local repository copy across all
//! refs and emits one raw [`AuthorRecord`] per commit, verbatim. No
//! normalization and no deduplication happen here; both belong to the
//! aggregation engine. This is a pure read operation and never mutates
//! the local copy.

use std::path::Path;

use crate::error::Result;
use crate::git;

/// One raw `(email, name)` pair extracted from a single commit.
///
/// Multiple commits by the same author yield multiple identical records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    /// Author email, possibly empty.
    pub email: String,
    /// Author display name, possibly empty.
    pub name: String,
    /// Whether the originating repository is a fork.
    pub from_fork: bool,
}

impl AuthorRecord {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            from_fork: false,
        }
    }

    #[cfg(test)]
    pub fn forked(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            from_fork: true,
            ..Self::new(email, name)
        }
    }
}

/// Extract the raw author records of `repo_path`, stamping each with the
/// originating repository's fork flag.
///
/// A repository with no commits produces an empty sequence.
pub fn extract(repo_path: &Path, from_fork: bool) -> Result<Vec<AuthorRecord>> {
    let pairs = git::log_authors(repo_path)?;
    log::debug!(
        "extracted {} raw author records from {}",
        pairs.len(),
        repo_path.display()
    );
    Ok(pairs
        .into_iter()
        .map(|(email, name)| AuthorRecord {
            email,
            name,
            from_fork,
        })
        .collect())
}
