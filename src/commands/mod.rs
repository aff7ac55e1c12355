//! Command dispatch and handlers.

pub mod analyze;
pub mod dependents;
pub mod snapshot;

use std::path::{Path, PathBuf};

use crate::cli::Command;
use crate::context::ServiceContext;
use crate::error::{Result, RippleError};

/// How a successful command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to flag.
    Success,
    /// `--fail-on-breaking` was set and a breaking change was found.
    BreakingChanges,
}

/// Dispatch a parsed command to its handler using live adapters.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> std::result::Result<Outcome, String> {
    dispatch_with_context(command, &ServiceContext::live())
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
) -> std::result::Result<Outcome, String> {
    match command {
        Command::Analyze(args) => analyze::run(ctx, args),
        Command::Snapshot { file, format } => snapshot::run(ctx, file, *format),
        Command::Dependents { file, root } => dependents::run(ctx, file, root),
    }
}

/// Makes a command-line path absolute against the working directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| RippleError::read(".", e.into()))?;
    Ok(cwd.join(path))
}

/// Reads a file through the context's filesystem.
pub(crate) fn read(ctx: &ServiceContext, path: &Path) -> Result<String> {
    ctx.fs.read_to_string(path).map_err(|e| RippleError::read(path, e))
}
