//! `ripple` reports the downstream impact of API surface changes in
//! TypeScript and JavaScript projects.
//!
//! A change is analyzed in five steps: both sides of the edited file are
//! captured as [`snapshot::Snapshot`]s, the snapshots are diffed into rule
//! findings, the project's reverse-import [`graph::DependencyGraph`] is
//! walked to find downstream files, tests are matched by proof of usage, and
//! everything is assembled into a deterministic [`report::ImpactReport`].

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod graph;
pub mod impact;
pub mod logging;
pub mod paths;
pub mod ports;
pub mod report;
pub mod rules;
pub mod snapshot;

use clap::error::ErrorKind;
use clap::Parser;

pub use commands::Outcome;
pub use error::{Result, RippleError};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
/// `--help` and `--version` print to stdout and succeed.
pub fn run<I, T>(args: I) -> std::result::Result<Outcome, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(Outcome::Success);
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.verbose);
    commands::dispatch(&cli.command)
}
