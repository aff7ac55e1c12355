//! Source language detection from file extensions.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions tried, in order, when resolving an extensionless import.
pub const RESOLUTION_EXTENSIONS: &[&str] =
    &["ts", "tsx", "d.ts", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Language a source file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceLanguage {
    /// `.ts`, `.mts`, `.cts`, `.d.ts`
    TypeScript,
    /// `.tsx`
    Tsx,
    /// `.js`, `.mjs`, `.cjs`
    JavaScript,
    /// `.jsx`
    Jsx,
}

impl SourceLanguage {
    /// Detects the language from `path`'s extension.
    ///
    /// Returns `None` for files that are not analyzable sources.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            _ => None,
        }
    }

    /// Carries type annotations and is parsed into a syntax tree.
    #[must_use]
    pub fn is_typed(self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }
}

/// `path` is a file the analyzer understands.
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    SourceLanguage::from_path(path).is_some()
}
