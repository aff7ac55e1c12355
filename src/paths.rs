//! Path normalization shared by the graph, the resolver and the report.

use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Renders a path with `/` separators regardless of platform.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Renders `path` relative to `root` with `/` separators.
///
/// Paths outside `root` are rendered in full.
#[must_use]
pub fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).map_or_else(|_| to_slash(path), to_slash)
}

/// Lowercases a path on platforms whose default filesystems are
/// case-insensitive, so one physical file maps to one key.
#[must_use]
pub fn fold_case(path: PathBuf) -> PathBuf {
    if cfg!(any(windows, target_os = "macos")) {
        PathBuf::from(path.to_string_lossy().to_lowercase())
    } else {
        path
    }
}

/// Strips the verbatim prefix that `std::fs::canonicalize` adds on Windows.
#[must_use]
pub fn strip_verbatim(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_prefix(r"\\?\") {
        Some(rest) => PathBuf::from(rest),
        None => path,
    }
}

/// Returns the file name without any of the given extensions.
///
/// `foo.test.ts` with extension list containing `.ts` yields `foo.test`;
/// declaration files (`foo.d.ts`) yield `foo`.
#[must_use]
pub fn file_stem(path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    for suffix in [".d.ts", ".d.mts", ".d.cts"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            return stem.to_string();
        }
    }
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}
