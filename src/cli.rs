//! CLI argument parsing and dispatch

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use authorscan::aggregate::FilterConfig;
use authorscan::output::OutputConfig;
use authorscan::pipeline::{self, ScanOptions};
use authorscan::source::ResolveCriteria;

/// Harvest the author identities recorded in Git repositories
#[derive(Parser, Debug)]
#[command(name = "authorscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// What to scan: a directory, a repository URL, an owner/repo
    /// shorthand, or a hosting-platform account
    #[arg(value_name = "TARGET", required_unless_present = "input")]
    target: Option<String>,

    /// Write results to FILE instead of the terminal
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read targets from FILE, one per line (batch mode)
    #[arg(short, long, value_name = "FILE", conflicts_with = "target")]
    input: Option<PathBuf>,

    /// Exclude records containing this literal substring (repeatable)
    #[arg(short = 'f', long = "filter", value_name = "PATTERN")]
    filters: Vec<String>,

    /// Disable the built-in filters and the banner
    #[arg(long)]
    raw: bool,

    /// Exclude display names from the output
    #[arg(long)]
    no_name: bool,

    /// Exclude emails from the output
    #[arg(long, conflicts_with = "no_name")]
    no_email: bool,

    /// Exclude forked repositories from account scans
    #[arg(long)]
    no_forks: bool,

    /// Include private repositories (requires a token)
    #[arg(long)]
    private: bool,

    /// Keep downloaded repositories after the scan
    #[arg(long)]
    keep: bool,

    /// Update previously downloaded copies before scanning
    #[arg(long)]
    update: bool,

    /// Hosting-platform API token
    #[arg(long, value_name = "TOKEN", env = "AUTHORSCAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the scan described by the parsed arguments.
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();

        let targets = match (&self.input, &self.target) {
            (Some(input), _) => read_target_list(input)?,
            (None, Some(target)) => vec![target.clone()],
            (None, None) => unreachable!("clap enforces target or input"),
        };

        let options = ScanOptions {
            targets,
            criteria: ResolveCriteria {
                include_forks: !self.no_forks,
                include_private: self.private,
            },
            filter: FilterConfig {
                use_builtin_filters: !self.raw,
                include_name: !self.no_name,
                include_email: !self.no_email,
                include_fork_annotation: !self.no_forks,
                user_patterns: self.filters,
            },
            update: self.update,
            keep_downloads: self.keep,
            output_file: self.output,
            raw: self.raw,
            output_config: OutputConfig::from_env_and_flag(&self.color),
            token: self.token,
        };

        pipeline::run(&options)?;
        Ok(())
    }
}

/// Read one target per line; blank lines and `#` comments are ignored.
fn read_target_list(path: &PathBuf) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read target list {}", path.display()))?;
    let targets: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    if targets.is_empty() {
        anyhow::bail!("target list {} contains no targets", path.display());
    }
    Ok(targets)
}
