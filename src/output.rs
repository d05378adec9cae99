//! # Result Rendering
//!
//! Terminal/file rendering of the merged record set, plus the output
//! color configuration.
//!
//! ## Respecting User Preferences
//!
//! Color handling respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Rendering never alters the record ordering produced by the
//! aggregation engine.

use std::env;
use std::fs;
use std::path::Path;

use console::style;

use crate::aggregate::{FilterConfig, MergedRecord};
use crate::error::{Error, Result};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Marker appended to records whose contributors include a fork.
const FORK_MARKER: &str = "[fork]";

/// Placeholder for a blank display name, applied at render time only.
const NO_NAME_PLACEHOLDER: &str = "(no name)";

/// Header line for the file format, reflecting the included columns.
pub fn header_line(config: &FilterConfig) -> String {
    match (config.include_email, config.include_name) {
        (true, true) => "email,names".to_string(),
        (true, false) => "email".to_string(),
        (false, _) => "names".to_string(),
    }
}

/// One comma-separated file row for a merged record.
pub fn file_line(record: &MergedRecord, config: &FilterConfig) -> String {
    let mut columns: Vec<String> = Vec::with_capacity(2);
    if config.include_email {
        columns.push(record.email.clone());
    }
    if config.include_name || !config.include_email {
        columns.push(record.joined_names());
    }
    let mut line = columns.join(",");
    if record.from_fork {
        line.push(' ');
        line.push_str(FORK_MARKER);
    }
    line
}

/// Write the record set as two-column tabular text. Fail-fast and
/// non-retrying: any creation or write error aborts the run.
pub fn render_to_file(
    records: &[MergedRecord],
    destination: &Path,
    config: &FilterConfig,
) -> Result<()> {
    let mut contents = String::new();
    contents.push_str(&header_line(config));
    contents.push('\n');
    for record in records {
        contents.push_str(&file_line(record, config));
        contents.push('\n');
    }

    fs::write(destination, contents).map_err(|e| Error::DestinationWriteFailed {
        path: destination.display().to_string(),
        message: e.to_string(),
    })?;
    log::info!(
        "wrote {} records to {}",
        records.len(),
        destination.display()
    );
    Ok(())
}

/// Print the record set to the terminal with decorative formatting.
///
/// `banner` carries the scan label; it is `None` in raw mode, which keeps
/// the output pipeable.
pub fn render_to_console(
    records: &[MergedRecord],
    banner: Option<&str>,
    filter_config: &FilterConfig,
    output_config: &OutputConfig,
) {
    console::set_colors_enabled(output_config.use_color);

    if let Some(label) = banner {
        println!();
        println!(
            "  {} {}",
            style("authorscan results for").bold(),
            style(label).bold().cyan()
        );
        println!(
            "  {}",
            style(format!(
                "{} identit{}",
                records.len(),
                if records.len() == 1 { "y" } else { "ies" }
            ))
            .dim()
        );
        println!();
    }

    let email_width = records
        .iter()
        .map(|r| r.email.len())
        .max()
        .unwrap_or(0)
        .max(5);

    for record in records {
        println!("{}", console_line(record, email_width, filter_config).trim_end());
    }
}

/// One decorated terminal row for a merged record.
fn console_line(record: &MergedRecord, email_width: usize, config: &FilterConfig) -> String {
    let mut line = String::new();
    if config.include_email {
        // Pad the plain email, then style: the escape codes wrapping a
        // styled string would otherwise count toward the column width.
        let email = if config.include_name {
            format!("{:<width$}", record.email, width = email_width + 2)
        } else {
            record.email.clone()
        };
        line.push_str(&format!("  {}", style(email).cyan()));
    }
    if config.include_name || !config.include_email {
        if record.names.is_empty() {
            line.push_str(&format!("{}", style(NO_NAME_PLACEHOLDER).dim()));
        } else {
            line.push_str(&record.joined_names());
        }
    }
    if record.from_fork {
        line.push(' ');
        line.push_str(&format!("{}", style(FORK_MARKER).yellow()));
    }
    line
}
