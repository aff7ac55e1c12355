//! Package-level changes: the manifest `exports` map, the manifest `type`
//! field and the module system a file is written in.

use crate::rules::Severity;
use crate::snapshot::{ManifestType, ModuleSystem, PackageManifest};

/// A change to the package surface, independent of individual exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageChange {
    /// The `exports` map had entries and now has none.
    ExportsMapRemoved {
        /// Subpaths that were exposed.
        subpaths: Vec<String>,
    },
    /// The effective `type` field flipped between module and CommonJS.
    TypeChanged {
        /// Effective type before.
        before: ManifestType,
        /// Effective type after.
        after: ManifestType,
    },
}

/// A change in how the file itself exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSystemChange {
    /// Classification before.
    pub before: ModuleSystem,
    /// Classification after.
    pub after: ModuleSystem,
    /// How disruptive the transition is.
    pub severity: Severity,
}

/// Compares two manifests. A side without a manifest contributes nothing
/// except that an exports map can only be lost if the after side exists.
#[must_use]
pub fn diff_manifests(
    before: Option<&PackageManifest>,
    after: Option<&PackageManifest>,
) -> Vec<PackageChange> {
    let (Some(before), Some(after)) = (before, after) else {
        return Vec::new();
    };
    let mut changes = Vec::new();
    if before.has_exports_map() && !after.has_exports_map() {
        let subpaths = before.exports.as_ref().map(|e| e.subpaths()).unwrap_or_default();
        changes.push(PackageChange::ExportsMapRemoved { subpaths });
    }
    if before.effective_type() != after.effective_type() {
        changes.push(PackageChange::TypeChanged {
            before: before.effective_type(),
            after: after.effective_type(),
        });
    }
    changes
}

/// Classifies a module-system transition. Transitions to or from an unknown
/// classification carry no signal and are ignored.
#[must_use]
pub fn diff_module_system(before: ModuleSystem, after: ModuleSystem) -> Option<ModuleSystemChange> {
    use ModuleSystem::{CommonJs, Esm, Mixed, Unknown};

    let severity = match (before, after) {
        _ if before == after => return None,
        (Unknown, _) | (_, Unknown) => return None,
        (Esm, CommonJs) | (CommonJs, Esm) => Severity::Breaking,
        (Mixed, _) => Severity::Warning,
        (_, Mixed) => Severity::Info,
        _ => return None,
    };
    Some(ModuleSystemChange { before, after, severity })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> PackageManifest {
        PackageManifest::parse(json).unwrap()
    }

    #[test]
    fn removed_exports_map_is_one_change() {
        let before = manifest(r#"{"exports": {".": "./index.js", "./utils": "./utils.js"}}"#);
        let after = manifest(r#"{"name": "pkg"}"#);
        assert_eq!(
            diff_manifests(Some(&before), Some(&after)),
            vec![PackageChange::ExportsMapRemoved { subpaths: vec![".".into(), "./utils".into()] }]
        );
    }

    #[test]
    fn emptied_exports_map_counts_as_removed() {
        let before = manifest(r#"{"exports": "./index.js"}"#);
        let after = manifest(r#"{"exports": {}}"#);
        assert_eq!(diff_manifests(Some(&before), Some(&after)).len(), 1);
    }

    #[test]
    fn missing_after_manifest_reports_nothing() {
        let before = manifest(r#"{"exports": "./index.js"}"#);
        assert!(diff_manifests(Some(&before), None).is_empty());
    }

    #[test]
    fn type_flip_is_reported_but_missing_equals_commonjs() {
        let module = manifest(r#"{"type": "module"}"#);
        let missing = manifest("{}");
        let commonjs = manifest(r#"{"type": "commonjs"}"#);
        assert!(diff_manifests(Some(&missing), Some(&commonjs)).is_empty());
        assert_eq!(
            diff_manifests(Some(&missing), Some(&module)),
            vec![PackageChange::TypeChanged { before: ManifestType::CommonJs, after: ManifestType::Module }]
        );
    }

    #[test]
    fn module_system_transitions() {
        use ModuleSystem::{CommonJs, Esm, Mixed, Unknown};
        assert_eq!(diff_module_system(Esm, CommonJs).map(|c| c.severity), Some(Severity::Breaking));
        assert_eq!(diff_module_system(Mixed, Esm).map(|c| c.severity), Some(Severity::Warning));
        assert_eq!(diff_module_system(Esm, Mixed).map(|c| c.severity), Some(Severity::Info));
        assert_eq!(diff_module_system(Unknown, Esm), None);
        assert_eq!(diff_module_system(Esm, Esm), None);
    }
}
