//! Export-surface diff keyed by `(type, name, source_module)`.
//!
//! Before a removed export and an added export are reported independently,
//! named/default transitions are paired through a small confidence score.
//! Pairing only happens when it is unambiguous.

use std::collections::BTreeMap;

use crate::rules::Rule;
use crate::snapshot::{Export, ExportKey, ExportKind, ExportStyle, ExportType, Snapshot};

/// Score for a pair declared on the same line.
pub const LINE_MATCH_WEIGHT: u8 = 2;
/// Score for a pair of the same export kind.
pub const KIND_MATCH_WEIGHT: u8 = 1;
/// Score for a pair where neither side is a re-export.
pub const NO_SOURCE_MODULE_WEIGHT: u8 = 1;

/// An export present only before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedExport {
    /// The export as it was.
    pub export: Export,
    /// The export named a class declared in the file.
    pub refers_to_class: bool,
}

impl RemovedExport {
    /// Most specific removal rule that applies.
    #[must_use]
    pub fn rule(&self) -> Rule {
        let export = &self.export;
        if self.refers_to_class {
            Rule::ExportedClassRemoved
        } else if export.kind == ExportKind::Star {
            Rule::ExportStarRemoved
        } else if export.export_type == ExportType::Default {
            Rule::DefaultExportRemoved
        } else if export.style == ExportStyle::Assignment {
            Rule::CjsExportRemoved
        } else if export.is_aliased() {
            Rule::AliasedExportRemoved
        } else if export.source_module.is_some() {
            Rule::ReexportRemoved
        } else {
            Rule::ExportRemoved
        }
    }
}

/// Why an export counts as modified rather than removed and re-added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportModification {
    /// Same identity key, different export kind.
    KindChanged,
    /// A named export became the default export.
    NamedToDefault,
    /// The default export became a named export.
    DefaultToNamed,
}

/// An export present on both sides, or a paired named/default transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedExport {
    /// Export before.
    pub before: Export,
    /// Export after.
    pub after: Export,
    /// What changed.
    pub reason: ExportModification,
}

impl ModifiedExport {
    /// Rule for this modification.
    #[must_use]
    pub fn rule(&self) -> Rule {
        match self.reason {
            ExportModification::KindChanged => Rule::ExportKindChanged,
            ExportModification::NamedToDefault => Rule::ExportNamedToDefault,
            ExportModification::DefaultToNamed => Rule::ExportDefaultToNamed,
        }
    }
}

/// Added, removed and modified exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportChanges {
    /// Present only after.
    pub added: Vec<Export>,
    /// Present only before.
    pub removed: Vec<RemovedExport>,
    /// Kind changes and paired type transitions.
    pub modified: Vec<ModifiedExport>,
}

impl ExportChanges {
    /// Nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Compares the export lists of two snapshots.
///
/// `pairing_threshold` is the minimum [`pairing_score`] for a named/default
/// transition to be reported as one modification.
#[must_use]
pub fn diff_exports(before: &Snapshot, after: &Snapshot, pairing_threshold: u8) -> ExportChanges {
    let old: BTreeMap<ExportKey, &Export> = before.exports.iter().map(|e| (e.key(), e)).collect();
    let new: BTreeMap<ExportKey, &Export> = after.exports.iter().map(|e| (e.key(), e)).collect();

    let mut changes = ExportChanges::default();
    let mut removed: Vec<&Export> = Vec::new();
    for (key, export) in &old {
        match new.get(key) {
            None => removed.push(export),
            Some(current) if kinds_differ(export.kind, current.kind) => {
                changes.modified.push(ModifiedExport {
                    before: (*export).clone(),
                    after: (*current).clone(),
                    reason: ExportModification::KindChanged,
                });
            }
            Some(_) => {}
        }
    }
    let added: Vec<&Export> = new.iter().filter(|(k, _)| !old.contains_key(*k)).map(|(_, e)| *e).collect();

    let pairs = pair_type_changes(&removed, &added, pairing_threshold);
    for &(r, a) in &pairs {
        let (before, after) = (removed[r], added[a]);
        let reason = if before.export_type == ExportType::Named {
            ExportModification::NamedToDefault
        } else {
            ExportModification::DefaultToNamed
        };
        changes.modified.push(ModifiedExport { before: before.clone(), after: after.clone(), reason });
    }

    changes.removed = removed
        .iter()
        .enumerate()
        .filter(|(i, _)| !pairs.iter().any(|(r, _)| r == i))
        .map(|(_, export)| RemovedExport {
            export: (*export).clone(),
            refers_to_class: refers_to_class(before, export),
        })
        .collect();
    changes.added = added
        .iter()
        .enumerate()
        .filter(|(i, _)| !pairs.iter().any(|(_, a)| a == i))
        .map(|(_, export)| (*export).clone())
        .collect();
    changes
}

/// Confidence that `removed` and `added` are the same binding changing
/// between named and default export. Zero when the types do not flip.
#[must_use]
pub fn pairing_score(removed: &Export, added: &Export) -> u8 {
    if removed.export_type == added.export_type {
        return 0;
    }
    let mut score = 0;
    if removed.line == added.line {
        score += LINE_MATCH_WEIGHT;
    }
    if removed.kind == added.kind {
        score += KIND_MATCH_WEIGHT;
    }
    if removed.source_module.is_none() && added.source_module.is_none() {
        score += NO_SOURCE_MODULE_WEIGHT;
    }
    score
}

/// Index pairs `(removed, added)` where each side has exactly one candidate
/// at or above the threshold.
fn pair_type_changes(removed: &[&Export], added: &[&Export], threshold: u8) -> Vec<(usize, usize)> {
    let eligible = |e: &Export| e.source_module.is_none() && e.kind != ExportKind::Star;
    let qualifies = |r: &Export, a: &Export| eligible(r) && eligible(a) && pairing_score(r, a) >= threshold;

    let mut pairs = Vec::new();
    for (r, old) in removed.iter().enumerate() {
        let candidates: Vec<usize> =
            (0..added.len()).filter(|&a| qualifies(old, added[a])).collect();
        match candidates[..] {
            [] => {}
            [a] => {
                let rivals = removed.iter().filter(|other| qualifies(other, added[a])).count();
                if rivals == 1 {
                    pairs.push((r, a));
                } else {
                    tracing::debug!(
                        export = added[a].display_name(),
                        candidates = rivals,
                        "ambiguous named/default pairing; reporting removal and addition"
                    );
                }
            }
            _ => tracing::debug!(
                export = old.display_name(),
                candidates = candidates.len(),
                "ambiguous named/default pairing; reporting removal and addition"
            ),
        }
    }
    pairs
}

fn kinds_differ(before: ExportKind, after: ExportKind) -> bool {
    let comparable = |k| !matches!(k, ExportKind::Unknown | ExportKind::Star);
    before != after && comparable(before) && comparable(after)
}

fn refers_to_class(snapshot: &Snapshot, export: &Export) -> bool {
    if export.kind == ExportKind::Class {
        return true;
    }
    let local = export.source_name.as_deref().unwrap_or(&export.name);
    export.source_module.is_none() && snapshot.classes.iter().any(|c| c.name == local)
}
