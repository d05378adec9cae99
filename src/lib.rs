//! # Authorscan Library
//!
//! This library provides the core functionality for discovering Git
//! repositories and harvesting the author identities recorded in their
//! commit history. It is designed to be used by the `authorscan`
//! command-line tool but can also be integrated into other applications.
//!
//! ## Core Concepts
//!
//! - **Source resolution (`source`)**: classifies a target string (local
//!   directory, repository URL, `owner/repo` shorthand, or platform
//!   account) into a [`source::ScanSet`] of fetchable locations.
//! - **Fetching (`fetch`, `git`, `workspace`)**: ensures a local,
//!   queryable copy of each location exists exactly once inside a scoped
//!   scan workspace, cloning or updating only when needed.
//! - **Extraction (`extract`)**: walks the full commit history across all
//!   refs and emits one raw author record per commit.
//! - **Aggregation (`aggregate`)**: merges, filters, and sorts the raw
//!   records into the deterministic final set.
//! - **Rendering (`output`)**: writes the result set to a file or the
//!   terminal.
//! - **Platform client (`platform`)**: the account-listing capability of
//!   the hosting platform.
//!
//! ## Execution Flow
//!
//! The main entry point is [`pipeline::run`], which executes the stages
//! strictly sequentially:
//!
//! 1. Resolve every target into a merged `ScanSet`.
//! 2. Acquire the scan workspace (released on all exit paths).
//! 3. For each location: fetch, extract, accumulate raw records.
//! 4. Aggregate and filter into merged records.
//! 5. Render to the terminal or the output file.

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod git;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod source;
pub mod workspace;
