//! # Authorscan CLI
//!
//! This is the binary entry point for the `authorscan` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the scan pipeline.
//! - Translating classified errors into user-friendly output and a
//!   non-zero exit code.
//!
//! The core application logic lives in the library crate, keeping the
//! binary a thin wrapper around reusable functionality.

mod cli;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = cli.execute() {
        eprintln!("Error: {:#}", err);
        eprintln!();
        eprintln!("Run 'authorscan --help' for usage.");
        std::process::exit(1);
    }
}
