//! Snapshot differ.
//!
//! Compares two snapshots of one file at three levels: declarations
//! ([`symbols`]), the export surface ([`exports`]) and the package surface
//! ([`package`]). Rule and severity assignment happens in the report.

pub mod exports;
pub mod package;
pub mod symbols;

use std::collections::BTreeSet;

use crate::snapshot::Snapshot;

pub use exports::{diff_exports, ExportChanges, ExportModification, ModifiedExport, RemovedExport};
pub use package::{diff_manifests, diff_module_system, ModuleSystemChange, PackageChange};
pub use symbols::{diff_symbols, ParamChange, SymbolChange, SymbolDiff, SymbolModification};

/// Everything that differs between two snapshots of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    /// Declaration changes.
    pub symbols: SymbolDiff,
    /// Export surface changes.
    pub exports: ExportChanges,
    /// Manifest changes.
    pub package: Vec<PackageChange>,
    /// Module system transition, if any.
    pub module_system: Option<ModuleSystemChange>,
    /// Both sides went through the typed extraction path.
    pub typed: bool,
}

impl SnapshotDiff {
    /// Nothing changed at any level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
            && self.exports.is_empty()
            && self.package.is_empty()
            && self.module_system.is_none()
    }

    /// Names of every symbol and export touched by a removal or modification,
    /// sorted. Additions are excluded: nothing downstream can depend on them
    /// yet.
    #[must_use]
    pub fn changed_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        names.extend(self.symbols.removed.iter().map(|s| s.name.clone()));
        names.extend(self.symbols.modified.iter().map(|m| m.before.name.clone()));
        for removed in &self.exports.removed {
            names.insert(removed.export.display_name().to_string());
            names.insert(removed.export.name.clone());
        }
        for modified in &self.exports.modified {
            names.insert(modified.before.display_name().to_string());
            names.insert(modified.before.name.clone());
        }
        names.retain(|n| n != "*");
        names.into_iter().collect()
    }
}

/// Diffs two snapshots of the same file.
///
/// Snapshots of different files, snapshots of byte-identical content, and
/// snapshots where either side could not be analyzed short-circuit to an
/// empty diff without running any comparison.
#[must_use]
pub fn diff_snapshots(before: &Snapshot, after: &Snapshot, pairing_threshold: u8) -> SnapshotDiff {
    if before.file_path != after.file_path {
        tracing::debug!(
            before = %before.file_path,
            after = %after.file_path,
            "snapshots belong to different files; nothing to compare"
        );
        return SnapshotDiff::default();
    }
    if before.fingerprint == after.fingerprint && before.manifest == after.manifest {
        return SnapshotDiff::default();
    }
    if before.is_failed() || after.is_failed() {
        tracing::debug!(file = %before.file_path, "unanalyzable snapshot; nothing to compare");
        return SnapshotDiff::default();
    }

    let typed = before.language.is_typed() && after.language.is_typed();
    SnapshotDiff {
        symbols: diff_symbols(before, after, typed),
        exports: diff_exports(before, after, pairing_threshold),
        package: diff_manifests(before.manifest.as_ref(), after.manifest.as_ref()),
        module_system: diff_module_system(before.module_system, after.module_system),
        typed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PAIRING_THRESHOLD;
    use crate::snapshot::{build_snapshot, SnapshotBuilder};

    const SOURCES: &[(&str, &str)] = &[
        ("a.ts", "export function f(a: string, b?: number): void {}\nexport interface I { x: string }\n"),
        ("a.js", "export function f(a, b) {}\nmodule.exports.g = () => 1;\n"),
        ("a.tsx", "export default function App() { return <div/>; }\n"),
        ("a.js", ""),
        ("a.ts", "export enum E { A = 1, B }\nexport * from './x';\n"),
    ];

    #[test]
    fn identical_sources_produce_no_changes() {
        for (path, source) in SOURCES {
            let diff = diff_snapshots(
                &build_snapshot(path, source),
                &build_snapshot(path, source),
                DEFAULT_PAIRING_THRESHOLD,
            );
            assert!(diff.is_empty(), "{path}: {source}");
        }
    }

    #[test]
    fn different_files_short_circuit() {
        let diff = diff_snapshots(
            &build_snapshot("a.js", "export function f() {}"),
            &build_snapshot("b.js", ""),
            DEFAULT_PAIRING_THRESHOLD,
        );
        assert!(diff.is_empty());
    }

    #[test]
    fn removal_is_reported_at_both_levels() {
        let diff = diff_snapshots(
            &build_snapshot("a.js", "export function foo(a) {}"),
            &build_snapshot("a.js", ""),
            DEFAULT_PAIRING_THRESHOLD,
        );
        assert_eq!(diff.symbols.removed.len(), 1);
        assert_eq!(diff.exports.removed.len(), 1);
        assert_eq!(diff.changed_names(), vec!["foo".to_string()]);
        assert!(!diff.typed);
    }

    #[test]
    fn manifest_only_change_is_compared() {
        let builder = SnapshotBuilder::default();
        let before = builder.build_with_manifest("index.js", "", Some(r#"{"exports": "./index.js"}"#));
        let after = builder.build_with_manifest("index.js", "", Some("{}"));
        let diff = diff_snapshots(&before, &after, DEFAULT_PAIRING_THRESHOLD);
        assert_eq!(diff.package.len(), 1);
    }

    #[test]
    fn module_system_flip_is_detected() {
        let diff = diff_snapshots(
            &build_snapshot("a.js", "export const a = 1;\n"),
            &build_snapshot("a.js", "module.exports = { a: 1 };\n"),
            DEFAULT_PAIRING_THRESHOLD,
        );
        assert!(diff.module_system.is_some());
    }
}
