//! Git port for reading file contents at a revision.

use std::path::Path;

use crate::error::PortError;

/// Provides read access to a git repository.
///
/// The analysis only needs the "before" side of an edit, so the port is
/// limited to reading blobs and listing changed paths.
pub trait GitRepo: Send + Sync {
    /// Returns the contents of `path` at `rev`, or `None` if the file did not
    /// exist at that revision.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or the revision is invalid.
    fn show_file(&self, root: &Path, rev: &str, path: &Path)
        -> Result<Option<String>, PortError>;

    /// Lists the paths (relative to `root`) that differ between `rev` and the
    /// working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the diff cannot be computed.
    fn changed_files(&self, root: &Path, rev: &str) -> Result<Vec<String>, PortError>;
}
