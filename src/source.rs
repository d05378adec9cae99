//! # Repository Source Resolution
//!
//! Turns an ambiguous target string into a concrete [`ScanSet`]: a list of
//! fetchable repository locations plus a human-readable scan label.
//!
//! Classification is attempted in a fixed order, first successful existence
//! check wins:
//!
//! 1. Local directory (recursive discovery, bounded depth)
//! 2. Remote repository URL (ls-remote probe)
//! 3. Shorthand `owner/repo` (platform clone URL, probed)
//! 4. Hosting-platform account (listing with fork/private criteria)
//!
//! The ordering is significant: a bare directory name that happens to look
//! like `owner/repo` must resolve locally first, and a reachable URL must
//! win over shorthand construction, which assumes a specific host.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::git::{self, ProbeResult};
use crate::platform::{self, PlatformClient};

/// A resolved, fetchable repository address. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocation {
    /// `file://` absolute path or a clone URL.
    pub address: String,
    /// Basename with a trailing `.git` stripped. Not guaranteed unique
    /// within a scan set; fetch destinations never rely on it alone.
    pub short_name: String,
    /// Whether the platform reported this repository as a fork.
    pub is_fork: bool,
}

impl RepositoryLocation {
    pub fn new(address: impl Into<String>, is_fork: bool) -> Self {
        let address = address.into();
        let short_name = short_name_of(&address);
        Self {
            address,
            short_name,
            is_fork,
        }
    }

    /// Whether this location points at the local filesystem.
    pub fn is_local(&self) -> bool {
        self.address.starts_with("file://")
    }

    /// The local path for a `file://` location.
    pub fn local_path(&self) -> Option<&Path> {
        self.address.strip_prefix("file://").map(Path::new)
    }
}

/// The resolved, immutable list of repositories plus a label, produced once
/// per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSet {
    pub label: String,
    pub locations: Vec<RepositoryLocation>,
}

impl ScanSet {
    /// Merge several scan sets (batch mode): locations concatenate in
    /// order, labels join with `+`.
    pub fn merge(sets: Vec<ScanSet>) -> ScanSet {
        let label = sets
            .iter()
            .map(|s| s.label.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let locations = sets.into_iter().flat_map(|s| s.locations).collect();
        ScanSet { label, locations }
    }
}

/// Criteria applied when listing an account's repositories.
#[derive(Debug, Clone, Copy)]
pub struct ResolveCriteria {
    pub include_forks: bool,
    pub include_private: bool,
}

impl Default for ResolveCriteria {
    fn default() -> Self {
        Self {
            include_forks: true,
            include_private: false,
        }
    }
}

/// Derive the short name of a location: last path segment, trailing `.git`
/// stripped.
pub fn short_name_of(address: &str) -> String {
    let trimmed = address.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// Derive the scan label for a URL target: the path after the host with a
/// trailing `.git` stripped.
fn url_label(target: &str) -> String {
    let path = match url::Url::parse(target) {
        Ok(parsed) => parsed.path().to_string(),
        // scp-like syntax (git@host:owner/repo.git)
        Err(_) => target
            .rsplit_once(':')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_else(|| target.to_string()),
    };
    let path = path.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

fn shorthand_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$").expect("shorthand pattern is valid")
    })
}

/// Whether a target string matches the `owner/repo` shorthand pattern.
pub fn is_shorthand(target: &str) -> bool {
    shorthand_regex().is_match(target)
}

/// Resolve a target string into a [`ScanSet`].
pub fn resolve(
    target: &str,
    criteria: ResolveCriteria,
    platform: &PlatformClient,
) -> Result<ScanSet> {
    let path = Path::new(target);
    if path.is_dir() {
        return resolve_local_directory(target, path);
    }

    // A reachable URL wins over shorthand interpretation.
    if git::probe(target)? == ProbeResult::NonEmpty {
        log::info!("target resolved as remote repository URL: {}", target);
        let is_fork = single_repo_fork_flag(&url_label(target), criteria, platform);
        return Ok(ScanSet {
            label: url_label(target),
            locations: vec![RepositoryLocation::new(target, is_fork)],
        });
    }

    if is_shorthand(target) {
        let clone_url = platform::shorthand_clone_url(target);
        log::info!("target matched shorthand, probing {}", clone_url);
        // Shorthand construction commits to the platform host: a failed
        // probe is terminal, never a fallback to account resolution.
        return match git::probe(&clone_url)? {
            ProbeResult::NonEmpty => {
                let is_fork = single_repo_fork_flag(target, criteria, platform);
                Ok(ScanSet {
                    label: target.to_string(),
                    locations: vec![RepositoryLocation::new(clone_url, is_fork)],
                })
            }
            ProbeResult::Empty | ProbeResult::Missing => {
                Err(Error::EmptyRepository { url: clone_url })
            }
        };
    }

    resolve_account(target, criteria, platform)
}

fn resolve_local_directory(target: &str, path: &Path) -> Result<ScanSet> {
    let root = path.canonicalize()?;
    let repos = git::discover_repositories(&root)?;
    if repos.is_empty() {
        return Err(Error::EmptyTarget {
            path: root.display().to_string(),
        });
    }

    let mut locations = Vec::with_capacity(repos.len());
    for repo in &repos {
        let repo_str = repo.display().to_string();
        match git::probe(&repo_str)? {
            ProbeResult::NonEmpty => {
                locations.push(RepositoryLocation::new(format!("file://{}", repo_str), false));
            }
            ProbeResult::Empty => {
                return Err(Error::NotARepository {
                    path: repo_str,
                    hint: Some("the repository has no commits".to_string()),
                });
            }
            ProbeResult::Missing => {
                return Err(Error::NotARepository {
                    path: repo_str,
                    hint: Some(
                        "a .git marker was found but git does not recognize the repository"
                            .to_string(),
                    ),
                });
            }
        }
    }

    let label = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| target.to_string());
    log::info!(
        "target resolved as local directory with {} repositories",
        locations.len()
    );
    Ok(ScanSet { label, locations })
}

fn resolve_account(
    target: &str,
    criteria: ResolveCriteria,
    platform: &PlatformClient,
) -> Result<ScanSet> {
    if !platform.account_exists(target)? {
        return Err(Error::TargetNotFound {
            target: target.to_string(),
        });
    }

    let all = platform.list_repositories(target, criteria.include_private)?;
    if all.is_empty() {
        return Err(Error::AccountHasNoRepositories {
            account: target.to_string(),
        });
    }

    let visible: Vec<_> = all
        .into_iter()
        .filter(|r| criteria.include_private || !r.private)
        .collect();
    let selected: Vec<_> = visible
        .iter()
        .filter(|r| criteria.include_forks || !r.fork)
        .collect();

    if selected.is_empty() {
        // Distinguish "everything was a fork" from other emptiness.
        if !visible.is_empty() {
            return Err(Error::NoMatchingRepositories {
                account: target.to_string(),
            });
        }
        return Err(Error::TargetNotFound {
            target: target.to_string(),
        });
    }

    let locations = selected
        .iter()
        .map(|r| RepositoryLocation::new(r.clone_url.clone(), r.fork))
        .collect();
    log::info!(
        "target resolved as account {} with {} repositories",
        target,
        selected.len()
    );
    Ok(ScanSet {
        label: target.to_string(),
        locations,
    })
}

/// Fork flag for a single-repository target, looked up best-effort: a
/// failed platform lookup must not abort a scan that never needed the
/// platform in the first place.
fn single_repo_fork_flag(
    owner_repo: &str,
    criteria: ResolveCriteria,
    platform: &PlatformClient,
) -> bool {
    if !criteria.include_forks || !is_shorthand(owner_repo) {
        return false;
    }
    match platform.is_fork(owner_repo) {
        Ok(fork) => fork,
        Err(err) => {
            log::warn!("fork lookup failed for {}: {}", owner_repo, err);
            false
        }
    }
}
