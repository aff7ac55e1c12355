//! Relative import specifier resolution.

use std::path::{Path, PathBuf};

use crate::paths;
use crate::ports::filesystem::FileSystem;
use crate::snapshot::language::{is_source_file, RESOLUTION_EXTENSIONS};

/// Script extensions that TypeScript projects write in specifiers while the
/// file on disk carries the typed counterpart.
const TYPED_COUNTERPARTS: &[(&str, &[&str])] = &[
    ("js", &["ts", "tsx"]),
    ("jsx", &["tsx"]),
    ("mjs", &["mts"]),
    ("cjs", &["cts"]),
];

/// `true` for `./x`, `../x`, `.` and `..`.
#[must_use]
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolves `specifier`, written in `importer`, to a canonical file path.
///
/// Tries the literal path, then each source extension appended, then an
/// `index` file inside the directory. Returns `None` for bare package
/// specifiers and for relative specifiers that match no file.
#[must_use]
pub fn resolve(fs: &dyn FileSystem, importer: &Path, specifier: &str) -> Option<PathBuf> {
    candidate_paths(importer, specifier)
        .into_iter()
        .find(|candidate| fs.is_file(candidate))
        .map(|found| fs.canonicalize(&found))
}

/// Every path `specifier` could resolve to, in preference order. Empty for
/// bare specifiers.
#[must_use]
pub fn candidate_paths(importer: &Path, specifier: &str) -> Vec<PathBuf> {
    if !is_relative(specifier) {
        return Vec::new();
    }
    let dir = importer.parent().unwrap_or_else(|| Path::new(""));
    candidates(&paths::normalize_lexically(&dir.join(specifier)))
}

/// Candidate files for a specifier base path, in preference order.
fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if is_source_file(base) {
        out.push(base.to_path_buf());
    }
    if let Some(ext) = base.extension().and_then(|e| e.to_str()) {
        for (script, typed) in TYPED_COUNTERPARTS {
            if ext == *script {
                out.extend(typed.iter().map(|t| base.with_extension(t)));
            }
        }
    }
    let text = base.to_string_lossy();
    out.extend(RESOLUTION_EXTENSIONS.iter().map(|ext| PathBuf::from(format!("{text}.{ext}"))));
    out.extend(RESOLUTION_EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    fn fs() -> MemoryFileSystem {
        MemoryFileSystem::with_files(&[
            ("/p/src/a.ts", ""),
            ("/p/src/a.js", ""),
            ("/p/src/util/index.js", ""),
            ("/p/src/types.d.ts", ""),
            ("/p/src/esm.ts", ""),
            ("/p/lib/b.mjs", ""),
        ])
    }

    #[test]
    fn typed_extension_is_preferred() {
        let found = resolve(&fs(), Path::new("/p/src/main.ts"), "./a");
        assert_eq!(found, Some(PathBuf::from("/p/src/a.ts")));
    }

    #[test]
    fn directory_resolves_to_index() {
        let found = resolve(&fs(), Path::new("/p/src/main.ts"), "./util");
        assert_eq!(found, Some(PathBuf::from("/p/src/util/index.js")));
    }

    #[test]
    fn declaration_files_resolve() {
        let found = resolve(&fs(), Path::new("/p/src/main.ts"), "./types");
        assert_eq!(found, Some(PathBuf::from("/p/src/types.d.ts")));
    }

    #[test]
    fn js_specifier_finds_typescript_source() {
        let found = resolve(&fs(), Path::new("/p/src/main.ts"), "./esm.js");
        assert_eq!(found, Some(PathBuf::from("/p/src/esm.ts")));
    }

    #[test]
    fn parent_relative_with_explicit_extension() {
        let found = resolve(&fs(), Path::new("/p/src/main.ts"), "../lib/b.mjs");
        assert_eq!(found, Some(PathBuf::from("/p/lib/b.mjs")));
    }

    #[test]
    fn bare_and_missing_specifiers_do_not_resolve() {
        assert_eq!(resolve(&fs(), Path::new("/p/src/main.ts"), "react"), None);
        assert_eq!(resolve(&fs(), Path::new("/p/src/main.ts"), "./missing"), None);
    }
}
