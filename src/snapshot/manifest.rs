//! The slice of `package.json` that affects a package's public surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value of the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestType {
    /// `"type": "module"`
    Module,
    /// `"type": "commonjs"`
    CommonJs,
    /// Field absent; Node treats the package as CommonJS.
    Missing,
}

/// Value of the `exports` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportsField {
    /// `"exports": "./index.js"`
    Path(String),
    /// Subpath or condition map.
    Map(BTreeMap<String, serde_json::Value>),
    /// Fallback array.
    List(Vec<serde_json::Value>),
}

impl ExportsField {
    /// The field exposes at least one entry point.
    #[must_use]
    pub fn has_entries(&self) -> bool {
        match self {
            Self::Path(path) => !path.trim().is_empty(),
            Self::Map(map) => !map.is_empty(),
            Self::List(list) => !list.is_empty(),
        }
    }

    /// Top-level subpaths (or `.` for a bare path or list).
    #[must_use]
    pub fn subpaths(&self) -> Vec<String> {
        match self {
            Self::Path(_) | Self::List(_) if self.has_entries() => vec![".".to_string()],
            Self::Map(map) if map.keys().any(|k| k.starts_with('.')) => map.keys().cloned().collect(),
            Self::Map(map) if !map.is_empty() => vec![".".to_string()],
            _ => Vec::new(),
        }
    }
}

/// Parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package module type.
    pub module_type: ManifestType,
    /// Export map, if declared.
    pub exports: Option<ExportsField>,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(rename = "type")]
    module_type: Option<String>,
    exports: Option<ExportsField>,
}

impl PackageManifest {
    /// Parses manifest JSON.
    ///
    /// Malformed manifests are logged and ignored rather than failing the
    /// snapshot.
    #[must_use]
    pub fn parse(json: &str) -> Option<Self> {
        let raw: RawManifest = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unparseable package.json");
                return None;
            }
        };
        let module_type = match raw.module_type.as_deref() {
            Some("module") => ManifestType::Module,
            Some("commonjs") => ManifestType::CommonJs,
            _ => ManifestType::Missing,
        };
        Some(Self { module_type, exports: raw.exports })
    }

    /// The manifest declares a non-empty `exports` field.
    #[must_use]
    pub fn has_exports_map(&self) -> bool {
        self.exports.as_ref().is_some_and(ExportsField::has_entries)
    }

    /// Effective module type, with a missing field meaning CommonJS.
    #[must_use]
    pub fn effective_type(&self) -> ManifestType {
        match self.module_type {
            ManifestType::Missing => ManifestType::CommonJs,
            other => other,
        }
    }
}
