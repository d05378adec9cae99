//! Shared helpers for CLI end-to-end tests.
//!
//! The tests build real throwaway Git repositories with the system `git`
//! binary, the same way the tool itself talks to git.

use std::path::Path;
use std::process::Command;

/// Initialize an empty repository at `dir`.
pub fn init_repo(dir: &Path) {
    let status = Command::new("git")
        .args(["init", "--quiet"])
        .arg(dir)
        .status()
        .expect("git init failed to spawn");
    assert!(status.success(), "git init failed");
}

/// Create an empty commit authored by `email`/`name`.
pub fn commit(dir: &Path, email: &str, name: &str, message: &str) {
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
    assert!(status.success(), "git commit failed");
}

/// Create an empty commit whose author has a blank email.
///
/// Git rejects a blank committer ident, so the committer stays valid and
/// only the author is overridden.
pub fn commit_without_email(dir: &Path, name: &str, message: &str) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.email=committer@test.invalid",
            "-c",
            "user.name=Committer",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "--allow-empty",
            "-m",
            message,
            &format!("--author={} <>", name),
        ])
        .status()
        .expect("git commit failed to spawn");
    assert!(status.success(), "git commit with blank author email failed");
}
