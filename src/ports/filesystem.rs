//! Filesystem port used for project walks and file reads.

use std::path::{Path, PathBuf};

use crate::error::PortError;

/// Provides the filesystem operations the analysis needs.
///
/// Graph builds, test scans and config loading all go through this trait, so
/// a project tree can be served from memory in tests.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Writes the given contents to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError>;

    /// Returns `true` if the path exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError>;

    /// Resolves a path to the canonical form used as a graph key.
    ///
    /// Symlinks are followed where the backing store has them. Paths that do
    /// not exist are normalized lexically instead of failing.
    fn canonicalize(&self, path: &Path) -> PathBuf;
}
