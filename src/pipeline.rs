//! # Scan Pipeline
//!
//! Wires the stages together for one invocation:
//! resolve → (for each location) fetch → extract → accumulate →
//! aggregate/filter → render.
//!
//! The pipeline is single-threaded and strictly sequential: each location
//! is fully fetched and extracted before the next one starts, and the raw
//! record accumulator is an explicit value threaded through the loop. The
//! scan workspace is acquired up front and released by RAII on every exit
//! path, including errors.

use std::env;
use std::path::PathBuf;

use crate::aggregate::{self, FilterConfig};
use crate::error::Result;
use crate::extract::{self, AuthorRecord};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::output::{self, OutputConfig};
use crate::platform::PlatformClient;
use crate::source::{self, ResolveCriteria, ScanSet};
use crate::workspace::ScanWorkspace;

/// Everything one scan invocation needs.
pub struct ScanOptions {
    /// One or more targets (more than one in batch mode).
    pub targets: Vec<String>,
    pub criteria: ResolveCriteria,
    pub filter: FilterConfig,
    /// Update previously downloaded copies before scanning.
    pub update: bool,
    /// Retain the fetch workspace after the run.
    pub keep_downloads: bool,
    /// Write to this file instead of the terminal.
    pub output_file: Option<PathBuf>,
    /// Raw mode: no banner, pipeable output.
    pub raw: bool,
    pub output_config: OutputConfig,
    /// Platform API token, when available.
    pub token: Option<String>,
}

/// Run the whole pipeline for one invocation.
pub fn run(options: &ScanOptions) -> Result<()> {
    let platform = PlatformClient::public(options.token.clone());

    let mut sets = Vec::with_capacity(options.targets.len());
    for target in &options.targets {
        sets.push(source::resolve(target, options.criteria, &platform)?);
    }
    let scan_set = ScanSet::merge(sets);
    log::info!(
        "scanning {} repositories for '{}'",
        scan_set.locations.len(),
        scan_set.label
    );

    let keep_base = if options.keep_downloads {
        Some(env::current_dir()?)
    } else {
        None
    };
    let workspace = ScanWorkspace::acquire(keep_base.as_deref(), &scan_set.label)?;
    let fetcher = Fetcher::new();

    let mut raw_records: Vec<AuthorRecord> = Vec::new();
    for location in &scan_set.locations {
        let dest = workspace.destination_for(location);
        match fetcher.ensure_local(location, &dest, options.update)? {
            FetchOutcome::Local(path) => {
                let records = extract::extract(&path, location.is_fork)?;
                log::debug!(
                    "{}: {} raw records",
                    location.short_name,
                    records.len()
                );
                raw_records.extend(records);
            }
            FetchOutcome::SkippedEmpty => {
                println!("repository empty, skipped: {}", location.short_name);
            }
        }
    }

    let merged = aggregate::aggregate(raw_records, &options.filter);
    if merged.is_empty() {
        // An empty result is reported, never written to a file.
        println!("No matching authors found for '{}'.", scan_set.label);
        return Ok(());
    }

    match &options.output_file {
        Some(path) => output::render_to_file(&merged, path, &options.filter)?,
        None => {
            let banner = if options.raw {
                None
            } else {
                Some(scan_set.label.as_str())
            };
            output::render_to_console(&merged, banner, &options.filter, &options.output_config);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{commit_as, init_test_repo};
    use tempfile::TempDir;

    fn options_for(target: &str, output_file: Option<PathBuf>) -> ScanOptions {
        ScanOptions {
            targets: vec![target.to_string()],
            criteria: ResolveCriteria::default(),
            filter: FilterConfig::default(),
            update: false,
            keep_downloads: false,
            output_file,
            raw: false,
            output_config: OutputConfig::from_env_and_flag("never"),
            token: None,
        }
    }

    #[test]
    fn test_local_directory_scan_end_to_end() {
        let temp = TempDir::new().unwrap();
        let repo1 = temp.path().join("repo1");
        let repo2 = temp.path().join("repo2");
        std::fs::create_dir_all(&repo1).unwrap();
        std::fs::create_dir_all(&repo2).unwrap();
        init_test_repo(&repo1);
        init_test_repo(&repo2);
        commit_as(&repo1, "a@x.com", "Alice", "one");
        commit_as(&repo1, "a@x.com", "Alice", "two");
        commit_as(&repo2, "b@x.com", "Bob", "one");

        let out_dir = TempDir::new().unwrap();
        let out_file = out_dir.path().join("authors.txt");
        let options = options_for(temp.path().to_str().unwrap(), Some(out_file.clone()));

        run(&options).unwrap();

        let contents = std::fs::read_to_string(&out_file).unwrap();
        assert_eq!(contents, "email,names\na@x.com,Alice\nb@x.com,Bob\n");
    }

    #[test]
    fn test_filtered_to_nothing_writes_no_file() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        std::fs::create_dir_all(&repo).unwrap();
        init_test_repo(&repo);
        commit_as(&repo, "actions@github.com", "CI", "bot commit");

        let out_dir = TempDir::new().unwrap();
        let out_file = out_dir.path().join("authors.txt");
        let options = options_for(temp.path().to_str().unwrap(), Some(out_file.clone()));

        run(&options).unwrap();

        assert!(!out_file.exists());
    }

    #[test]
    fn test_unresolvable_target_fails_before_workspace_creation() {
        let temp = TempDir::new().unwrap();
        let options = options_for(temp.path().to_str().unwrap(), None);
        // Empty directory: resolution fails before any workspace exists
        assert!(run(&options).is_err());
    }
}
