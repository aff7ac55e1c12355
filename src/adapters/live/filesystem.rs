//! Live filesystem adapter using `std::fs`.

use std::path::{Path, PathBuf};

use crate::error::PortError;
use crate::paths;
use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        let resolved = std::fs::canonicalize(path)
            .map_or_else(|_| paths::normalize_lexically(path), paths::strip_verbatim);
        paths::fold_case(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_dir_is_sorted_and_canonicalize_resolves_dots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();
        std::fs::write(dir.path().join("a.ts"), "").unwrap();

        let fs = LiveFileSystem;
        assert_eq!(fs.list_dir(dir.path()).unwrap(), vec!["a.ts", "b.ts"]);

        let dotted = dir.path().join(".").join("a.ts");
        let expected = fs.canonicalize(&dir.path().join("a.ts"));
        assert_eq!(fs.canonicalize(&dotted), expected);
        assert!(fs.is_file(&dotted));
        assert!(fs.is_dir(dir.path()));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("report.json");

        LiveFileSystem.write(&target, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
    }
}
