//! Error types for conditions that propagate out of the analysis.
//!
//! Most failure modes inside the pipeline are recovered locally (a file that
//! does not parse yields an empty snapshot, an unresolvable import is skipped).
//! Only the conditions below reach the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for `ripple` operations.
#[derive(Debug, Error)]
pub enum RippleError {
    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// The project configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A git query failed.
    #[error("git error: {0}")]
    Git(String),

    /// The project root does not exist or is not a directory.
    #[error("project root {0} is not a directory")]
    ProjectRoot(PathBuf),

    /// The command-line arguments are inconsistent.
    #[error("{0}")]
    Usage(String),

    /// JSON serialization failed.
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization or parsing failed.
    #[error("failed to process YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RippleError {
    /// Wraps a port error raised while reading `path`.
    pub fn read(path: impl Into<PathBuf>, source: PortError) -> Self {
        Self::Read { path: path.into(), source }
    }

    /// Wraps a port error raised while writing `path`.
    pub fn write(path: impl Into<PathBuf>, source: PortError) -> Self {
        Self::Write { path: path.into(), source }
    }
}

/// Result type alias for `ripple` operations.
pub type Result<T> = std::result::Result<T, RippleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_names_the_path() {
        let err = RippleError::read("src/a.ts", "permission denied".into());
        assert_eq!(err.to_string(), "failed to read src/a.ts: permission denied");
    }

    #[test]
    fn usage_error_displays_message_verbatim() {
        let err = RippleError::Usage("--before needs exactly one FILE".to_string());
        assert_eq!(err.to_string(), "--before needs exactly one FILE");
    }
}
