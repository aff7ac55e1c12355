//! In-memory adapters: a project tree held in a map, a scripted git history
//! and a fixed clock.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::error::PortError;
use crate::paths;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;

/// Filesystem that serves files from memory.
///
/// Directories exist implicitly as ancestors of stored files. Paths are
/// normalized lexically, so `a/./b/../c.ts` and `a/c.ts` are the same file.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filesystem from `(path, contents)` pairs.
    #[must_use]
    pub fn with_files<P: AsRef<Path>>(files: &[(P, &str)]) -> Self {
        let fs = Self::new();
        for (path, contents) in files {
            fs.insert(path.as_ref(), contents);
        }
        fs
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: &Path, contents: &str) {
        let key = paths::normalize_lexically(path);
        self.files.lock().unwrap_or_else(PoisonError::into_inner).insert(key, contents.to_string());
    }

    /// Removes a file, returning `true` if it existed.
    pub fn remove(&self, path: &Path) -> bool {
        let key = paths::normalize_lexically(path);
        self.files.lock().unwrap_or_else(PoisonError::into_inner).remove(&key).is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let key = paths::normalize_lexically(path);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| format!("no such file: {}", key.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        self.insert(path, contents);
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        let key = paths::normalize_lexically(path);
        self.files.lock().unwrap_or_else(PoisonError::into_inner).contains_key(&key)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let key = paths::normalize_lexically(path);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .any(|file| file != &key && file.starts_with(&key))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let key = paths::normalize_lexically(path);
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let entries: BTreeSet<String> = files
            .keys()
            .filter_map(|file| file.strip_prefix(&key).ok())
            .filter_map(|rest| rest.components().next())
            .map(|first| first.as_os_str().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(format!("not a directory: {}", key.display()).into());
        }
        Ok(entries.into_iter().collect())
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        paths::normalize_lexically(path)
    }
}

/// Git history holding file contents per revision.
///
/// Paths are stored relative to the repository root with `/` separators.
#[derive(Default)]
pub struct MemoryGitRepo {
    blobs: BTreeMap<(String, String), String>,
    changed: Vec<String>,
}

impl MemoryGitRepo {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `contents` as the blob of `path` at `rev`.
    #[must_use]
    pub fn with_file(mut self, rev: &str, path: &str, contents: &str) -> Self {
        self.blobs.insert((rev.to_string(), path.to_string()), contents.to_string());
        self
    }

    /// Marks `path` as differing from every revision.
    #[must_use]
    pub fn with_changed(mut self, path: &str) -> Self {
        self.changed.push(path.to_string());
        self
    }
}

impl GitRepo for MemoryGitRepo {
    fn show_file(&self, root: &Path, rev: &str, path: &Path) -> Result<Option<String>, PortError> {
        let relative = paths::relative_to(root, path);
        Ok(self.blobs.get(&(rev.to_string(), relative)).cloned())
    }

    fn changed_files(&self, _root: &Path, _rev: &str) -> Result<Vec<String>, PortError> {
        Ok(self.changed.clone())
    }
}

/// Clock that always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// A clock frozen at the Unix epoch.
    #[must_use]
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
