//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `authorscan` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! Every resolution-time and pipeline error is fatal: the scan aborts,
//! the workspace is cleaned up, and the process exits non-zero. The one
//! deliberate non-error is the empty-repository skip inside the fetcher,
//! which never surfaces here.

use thiserror::Error;

/// Main error type for authorscan operations
#[derive(Error, Debug)]
pub enum Error {
    /// No target classification matched, or a platform listing came back
    /// empty for a reason other than fork exclusion.
    #[error("Target not found: '{target}' is not a directory, reachable repository, or known account")]
    TargetNotFound { target: String },

    /// A directory target contained no repository markers at all.
    #[error("Empty target: no Git repositories found under {path}")]
    EmptyTarget { path: String },

    /// A specific repository target resolved but has no history.
    #[error("Empty repository: {url} is reachable but contains no refs")]
    EmptyRepository { url: String },

    /// A local repository marker did not correspond to a valid, non-empty
    /// repository.
    #[error("Not a repository: {path}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    NotARepository {
        path: String,
        /// Optional hint for how to resolve the issue
        hint: Option<String>,
    },

    /// An account exists but exposes zero repositories.
    #[error("Account '{account}' has no repositories")]
    AccountHasNoRepositories { account: String },

    /// An account has repositories, but fork exclusion removed all of them.
    #[error("No matching repositories for '{account}': only forks were found and forks are excluded")]
    NoMatchingRepositories { account: String },

    /// A clone or update failed against a remote that was confirmed
    /// reachable and non-empty.
    #[error("Repository unreachable: {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    RepositoryUnreachable {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// The output file could not be created or written.
    #[error("Could not write results to {path}: {message}")]
    DestinationWriteFailed { path: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {target}: {command} - {stderr}")]
    GitCommand {
        command: String,
        target: String,
        stderr: String,
    },

    /// An error occurred during a platform API operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            message: err.to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
