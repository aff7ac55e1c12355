//! `ripple snapshot` command.

use std::path::Path;

use crate::cli::SnapshotFormat;
use crate::commands::{absolute, read, Outcome};
use crate::config::AnalyzerConfig;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::paths;
use crate::snapshot::SnapshotBuilder;

/// Execute the `snapshot` command.
///
/// Prints the API surface of `file` as extracted from its current content.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or serialized.
pub fn run(ctx: &ServiceContext, file: &Path, format: SnapshotFormat) -> std::result::Result<Outcome, String> {
    let rendered = render(ctx, file, format).map_err(|e| e.to_string())?;
    print!("{rendered}");
    Ok(Outcome::Success)
}

/// Builds and serializes the snapshot of `file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the configuration is
/// invalid, or serialization fails.
pub fn render(ctx: &ServiceContext, file: &Path, format: SnapshotFormat) -> Result<String> {
    let path = ctx.fs.canonicalize(&absolute(file)?);
    let source = read(ctx, &path)?;
    let config = AnalyzerConfig::load(ctx.fs.as_ref(), &absolute(Path::new("."))?)?;

    let snapshot = SnapshotBuilder::new(&config)
        .build(&paths::to_slash(file), &source)
        .stamped(ctx.clock.now());
    if snapshot.is_failed() {
        tracing::warn!(file = %file.display(), "file could not be parsed; snapshot is empty");
    }

    Ok(match format {
        SnapshotFormat::Json => serde_json::to_string_pretty(&snapshot)? + "\n",
        SnapshotFormat::Yaml => serde_yaml::to_string(&snapshot)?,
    })
}
