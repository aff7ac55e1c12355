//! Impact report assembly.
//!
//! Turns a [`SnapshotDiff`] plus the propagation results into a flat,
//! deduplicated list of findings and the serializable [`ImpactReport`].
//! Output is deterministic: every list is sorted and nothing time- or
//! run-dependent is included.

pub mod text;

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::diff::{
    ExportModification, ModifiedExport, PackageChange, ParamChange, RemovedExport, SnapshotDiff,
    SymbolChange, SymbolModification,
};
use crate::impact::affinity::AffectedTest;
use crate::impact::downstream::DownstreamFile;
use crate::paths;
use crate::rules::{Rule, Severity};
use crate::snapshot::{Export, ExportKind, ExportType, Symbol, SymbolKind};

/// Appended to messages of findings derived from pattern matching.
pub const HEURISTIC_DISCLAIMER: &str = " (heuristic: derived from source patterns, not type checking)";

/// Words that already mark a message as uncertain.
const HEDGES: &[&str] = &["likely", "potential", "possibly"];

/// One classified change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Stable rule identifier.
    pub rule_id: Rule,
    /// Severity.
    pub severity: Severity,
    /// Affected symbol, qualified for members (`Store.get`).
    pub symbol: String,
    /// Human-readable description.
    pub message: String,
    /// Signature or declaration before the change.
    pub before: Option<String>,
    /// Signature or declaration after the change.
    pub after: Option<String>,
    /// Line in the after text, or in the before text for removals.
    pub line: Option<usize>,
    /// Top-level declaration the finding belongs to.
    #[serde(skip)]
    pub owner: Option<(SymbolKind, String)>,
}

impl Finding {
    fn new(rule: Rule, severity: Severity, symbol: impl Into<String>, message: String) -> Self {
        Self {
            rule_id: rule,
            severity,
            symbol: symbol.into(),
            message,
            before: None,
            after: None,
            line: None,
            owner: None,
        }
    }

    fn before(mut self, text: impl Into<String>) -> Self {
        self.before = Some(text.into());
        self
    }

    fn after(mut self, text: impl Into<String>) -> Self {
        self.after = Some(text.into());
        self
    }

    fn line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn owned_by(mut self, kind: SymbolKind, name: &str) -> Self {
        self.owner = Some((kind, name.to_string()));
        self
    }
}

/// Outcome of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    /// No structural change (or identical content).
    Unchanged,
    /// One side could not be analyzed; nothing is reported for the file.
    Unanalyzable,
    /// Changes found, but nothing in the project provably depends on them.
    NoProvenDependencies,
    /// Changes found with proven dependents.
    Impacted,
}

/// Counts over the findings and the propagation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Breaking findings.
    pub breaking: usize,
    /// Warning findings.
    pub warnings: usize,
    /// Informational findings.
    pub info: usize,
    /// Downstream source files.
    pub downstream_files: usize,
    /// Affected tests.
    pub tests: usize,
}

/// The final report for one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// Project-relative path of the changed file.
    pub source_file: String,
    /// Outcome.
    pub status: ReportStatus,
    /// Changed function names.
    pub functions: Vec<String>,
    /// Changed class names.
    pub classes: Vec<String>,
    /// Project-relative downstream source files.
    pub downstream_files: Vec<String>,
    /// Best-known import line per downstream file (tests included).
    pub downstream_lines: BTreeMap<String, Option<usize>>,
    /// Project-relative affected test files.
    pub tests: Vec<String>,
    /// Classified changes, one per symbol.
    pub findings: Vec<Finding>,
    /// Symbols named by the findings.
    pub impacted_symbols: Vec<String>,
    /// Counts.
    pub summary: Summary,
}

impl ImpactReport {
    fn empty(source_file: &str, status: ReportStatus) -> Self {
        Self {
            source_file: source_file.to_string(),
            status,
            functions: Vec::new(),
            classes: Vec::new(),
            downstream_files: Vec::new(),
            downstream_lines: BTreeMap::new(),
            tests: Vec::new(),
            findings: Vec::new(),
            impacted_symbols: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report for a file whose surface did not change.
    #[must_use]
    pub fn unchanged(source_file: &str) -> Self {
        Self::empty(source_file, ReportStatus::Unchanged)
    }

    /// Report for a file that could not be analyzed.
    #[must_use]
    pub fn unanalyzable(source_file: &str) -> Self {
        Self::empty(source_file, ReportStatus::Unanalyzable)
    }

    /// At least one finding is breaking.
    #[must_use]
    pub fn has_breaking(&self) -> bool {
        self.summary.breaking > 0
    }

    /// Pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self).map(|json| json + "\n")
    }
}

/// Assembles the report for `source_file`.
///
/// Paths are rendered relative to `root`. Downstream test files are listed in
/// `downstream_lines` but not in `downstream_files`; `tests` comes from the
/// affinity resolver alone.
#[must_use]
pub fn format(
    source_file: &str,
    diff: &SnapshotDiff,
    root: &Path,
    downstream: &[DownstreamFile],
    tests: &[AffectedTest],
) -> ImpactReport {
    if diff.is_empty() {
        return ImpactReport::unchanged(source_file);
    }
    let findings = finalize(collect_findings(diff), diff.typed);

    let names_of = |wanted: SymbolKind| -> Vec<String> {
        let mut names: Vec<String> = findings
            .iter()
            .filter(|f| !matches!(f.rule_id, Rule::SymbolAdded | Rule::ExportAdded))
            .filter_map(|f| f.owner.as_ref())
            .filter(|(kind, _)| *kind == wanted)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    };
    let functions = names_of(SymbolKind::Function);
    let classes = names_of(SymbolKind::Class);

    let relative = |path: &Path| paths::relative_to(root, path);
    let downstream_files: Vec<String> =
        downstream.iter().filter(|d| !d.is_test).map(|d| relative(&d.path)).collect();
    let downstream_lines = downstream.iter().map(|d| (relative(&d.path), d.line)).collect();
    let tests: Vec<String> = tests.iter().map(|t| relative(&t.path)).collect();

    let mut impacted_symbols: Vec<String> = findings.iter().map(|f| f.symbol.clone()).collect();
    impacted_symbols.sort();
    impacted_symbols.dedup();

    let count = |severity| findings.iter().filter(|f| f.severity == severity).count();
    let summary = Summary {
        breaking: count(Severity::Breaking),
        warnings: count(Severity::Warning),
        info: count(Severity::Info),
        downstream_files: downstream_files.len(),
        tests: tests.len(),
    };
    let status = if downstream.is_empty() && tests.is_empty() {
        ReportStatus::NoProvenDependencies
    } else {
        ReportStatus::Impacted
    };

    ImpactReport {
        source_file: source_file.to_string(),
        status,
        functions,
        classes,
        downstream_files,
        downstream_lines,
        tests,
        findings,
        impacted_symbols,
        summary,
    }
}

/// Keeps the highest-priority finding per symbol, applies the heuristic
/// disclaimer and sorts by symbol.
fn finalize(findings: Vec<Finding>, typed: bool) -> Vec<Finding> {
    let mut best: BTreeMap<String, Finding> = BTreeMap::new();
    for finding in findings {
        match best.get(&finding.symbol) {
            Some(kept) if rank(kept) >= rank(&finding) => {
                tracing::trace!(
                    symbol = %finding.symbol,
                    kept = %kept.rule_id,
                    dropped = %finding.rule_id,
                    "deduplicated finding"
                );
            }
            _ => {
                best.insert(finding.symbol.clone(), finding);
            }
        }
    }
    best.into_values()
        .map(|mut finding| {
            if needs_disclaimer(&finding, typed) {
                finding.message.push_str(HEURISTIC_DISCLAIMER);
            }
            finding
        })
        .collect()
}

/// Severity first, so a milder change never hides a breaking one on the
/// same symbol; rule priority orders findings of equal severity.
fn rank(finding: &Finding) -> (Reverse<Severity>, u16) {
    (Reverse(finding.severity), finding.rule_id.priority())
}

fn needs_disclaimer(finding: &Finding, typed: bool) -> bool {
    let rule = finding.rule_id;
    if rule.skips_disclaimer() || !(rule.is_heuristic() || !typed) {
        return false;
    }
    let message = finding.message.to_lowercase();
    !HEDGES.iter().any(|hedge| message.contains(hedge))
}

/// Every finding the diff implies, before deduplication.
fn collect_findings(diff: &SnapshotDiff) -> Vec<Finding> {
    let mut findings = Vec::new();
    for symbol in &diff.symbols.removed {
        findings.push(symbol_removed(symbol));
    }
    for symbol in &diff.symbols.added {
        findings.push(
            Finding::new(
                Rule::SymbolAdded,
                Severity::Info,
                &symbol.name,
                format!("{} `{}` was added", symbol.kind, symbol.name),
            )
            .after(&symbol.signature)
            .line(symbol.line)
            .owned_by(symbol.kind, &symbol.name),
        );
    }
    for modification in &diff.symbols.modified {
        for change in &modification.changes {
            findings.push(symbol_changed(modification, change, diff.typed));
        }
    }
    for removed in &diff.exports.removed {
        findings.push(export_removed(removed));
    }
    for modified in &diff.exports.modified {
        findings.push(export_modified(modified));
    }
    for export in &diff.exports.added {
        let name = export_symbol(export);
        findings.push(
            Finding::new(Rule::ExportAdded, Severity::Info, &name, format!("export `{name}` was added"))
                .after(describe_export(export))
                .line(export.line),
        );
    }
    for change in &diff.package {
        findings.push(package_changed(change));
    }
    if let Some(change) = diff.module_system {
        findings.push(Finding::new(
            Rule::ModuleSystemChanged,
            change.severity,
            "<module>",
            format!("module system changed from {} to {}", change.before, change.after),
        )
        .before(change.before.to_string())
        .after(change.after.to_string()));
    }
    findings
}

fn symbol_removed(symbol: &Symbol) -> Finding {
    let rule = match symbol.kind {
        SymbolKind::Function | SymbolKind::Method => Rule::FunctionRemoved,
        SymbolKind::Class => Rule::ClassRemoved,
        SymbolKind::Interface => Rule::InterfaceRemoved,
        SymbolKind::Type => Rule::TypeAliasRemoved,
        SymbolKind::Enum => Rule::EnumRemoved,
        SymbolKind::Variable => Rule::VariableRemoved,
    };
    Finding::new(rule, Severity::Breaking, &symbol.name, format!("{} `{}` was removed", symbol.kind, symbol.name))
        .before(&symbol.signature)
        .line(symbol.line)
        .owned_by(symbol.kind, &symbol.name)
}

fn symbol_changed(modification: &SymbolModification, change: &SymbolChange, typed: bool) -> Finding {
    let SymbolModification { before, after, .. } = modification;
    let name = after.name.as_str();
    let member = |m: &str| format!("{name}.{m}");
    // Untyped sources cannot prove a call site breaks.
    let strict = if typed { Severity::Breaking } else { Severity::Warning };

    let finding = match change {
        SymbolChange::Params(param) => {
            param_finding(param, name, "", strict, Rule::FunctionSignatureChanged, name.to_string())
        }
        SymbolChange::Constructor(param) => param_finding(
            param,
            name,
            " constructor",
            strict,
            Rule::ClassConstructorChanged,
            member("constructor"),
        ),
        SymbolChange::ReturnTypeChanged { before: b, after: a, narrowing } => Finding::new(
            Rule::FunctionReturnTypeChanged,
            if *narrowing { Severity::Info } else { Severity::Breaking },
            name,
            format!("return type of `{name}` changed from `{b}` to `{a}`"),
        ),
        SymbolChange::AsyncChanged { now_async } => Finding::new(
            Rule::FunctionSignatureChanged,
            Severity::Warning,
            name,
            if *now_async {
                format!("`{name}` is now async; callers may need to await its result")
            } else {
                format!("`{name}` is no longer async; callers awaiting it may behave differently")
            },
        ),
        SymbolChange::MethodRemoved { name: method } => Finding::new(
            Rule::ClassMethodRemoved,
            Severity::Breaking,
            member(method),
            format!("method `{method}` was removed from class `{name}`"),
        ),
        SymbolChange::ConstructorRemoved => Finding::new(
            Rule::ClassConstructorRemoved,
            strict,
            member("constructor"),
            format!("explicit constructor of class `{name}` was removed"),
        ),
        SymbolChange::PropertyRemoved { name: property } => Finding::new(
            Rule::InterfacePropertyRemoved,
            Severity::Breaking,
            member(property),
            format!("property `{property}` was removed from interface `{name}`"),
        ),
        SymbolChange::PropertyAddedRequired { name: property } => Finding::new(
            Rule::InterfacePropertyAddedRequired,
            Severity::Breaking,
            member(property),
            format!("interface `{name}` gained required property `{property}`"),
        ),
        SymbolChange::PropertyBecameRequired { name: property } => Finding::new(
            Rule::InterfacePropertyBecameRequired,
            Severity::Breaking,
            member(property),
            format!("property `{property}` of interface `{name}` is now required"),
        ),
        SymbolChange::PropertyTypeChanged { name: property, before: b, after: a } => Finding::new(
            Rule::InterfacePropertyTypeChanged,
            Severity::Warning,
            member(property),
            format!("property `{property}` of interface `{name}` changed type from `{b}` to `{a}`"),
        ),
        SymbolChange::DefinitionChanged { before: b, after: a } => Finding::new(
            Rule::TypeAliasChanged,
            Severity::Warning,
            name,
            format!("type alias `{name}` changed from `{b}` to `{a}`"),
        ),
        SymbolChange::EnumMemberRemoved { name: variant } => Finding::new(
            Rule::EnumMemberRemoved,
            Severity::Breaking,
            member(variant),
            format!("member `{variant}` was removed from enum `{name}`"),
        ),
    };
    finding
        .before(&before.signature)
        .after(&after.signature)
        .line(after.line)
        .owned_by(after.kind, name)
}

fn param_finding(
    change: &ParamChange,
    owner: &str,
    what: &str,
    strict: Severity,
    signature_rule: Rule,
    symbol: String,
) -> Finding {
    let constructor = !what.is_empty();
    let pick = |function_rule: Rule| if constructor { Rule::ClassConstructorChanged } else { function_rule };
    let (rule, severity, message) = match change {
        ParamChange::CountDecreased { before, after } => (
            signature_rule,
            strict,
            format!("`{owner}`{what} now takes {after} parameter(s) instead of {before}"),
        ),
        ParamChange::RestRemoved => {
            (signature_rule, strict, format!("`{owner}`{what} no longer accepts a rest parameter"))
        }
        ParamChange::RequiredAdded { name } => (
            pick(Rule::FunctionRequiredParamAdded),
            Severity::Breaking,
            format!("`{owner}`{what} gained required parameter `{name}`"),
        ),
        ParamChange::BecameRequired { name } => (
            pick(Rule::FunctionParamBecameRequired),
            strict,
            format!("parameter `{name}` of `{owner}`{what} is now required"),
        ),
        ParamChange::TypeChanged { name, before, after, widening } => (
            pick(Rule::FunctionParamTypeChanged),
            if *widening { Severity::Info } else { Severity::Breaking },
            format!("parameter `{name}` of `{owner}`{what} changed type from `{before}` to `{after}`"),
        ),
    };
    Finding::new(rule, severity, symbol, message)
}

fn export_removed(removed: &RemovedExport) -> Finding {
    let export = &removed.export;
    let name = export_symbol(export);
    let rule = removed.rule();
    let message = match rule {
        Rule::ExportedClassRemoved => format!("exported class `{name}` was removed"),
        Rule::ExportStarRemoved => format!("`{}` was removed", describe_export(export)),
        Rule::DefaultExportRemoved => format!("default export `{name}` was removed"),
        Rule::CjsExportRemoved => format!("CommonJS export `{name}` was removed"),
        Rule::AliasedExportRemoved => format!(
            "export `{name}` (alias of `{}`) was removed",
            export.source_name.as_deref().unwrap_or(&export.name)
        ),
        Rule::ReexportRemoved => format!(
            "re-export `{name}` from `{}` was removed",
            export.source_module.as_deref().unwrap_or_default()
        ),
        _ => format!("export `{name}` was removed"),
    };
    let mut finding = Finding::new(rule, Severity::Breaking, &name, message)
        .before(describe_export(export))
        .line(export.line);
    if let Some(kind) = owner_kind(export.kind, removed.refers_to_class) {
        finding = finding.owned_by(kind, &name);
    }
    finding
}

fn export_modified(modified: &ModifiedExport) -> Finding {
    let ModifiedExport { before, after, reason } = modified;
    let name = export_symbol(before);
    let message = match reason {
        ExportModification::KindChanged => {
            format!("export `{name}` changed from {} to {}", kind_label(before.kind), kind_label(after.kind))
        }
        ExportModification::NamedToDefault => {
            format!("`{name}` changed from a named export to the default export")
        }
        ExportModification::DefaultToNamed => {
            format!("`{name}` changed from the default export to a named export")
        }
    };
    let mut finding = Finding::new(modified.rule(), Severity::Breaking, &name, message)
        .before(describe_export(before))
        .after(describe_export(after))
        .line(after.line);
    if let Some(kind) = owner_kind(before.kind, false) {
        finding = finding.owned_by(kind, &name);
    }
    finding
}

fn package_changed(change: &PackageChange) -> Finding {
    match change {
        PackageChange::ExportsMapRemoved { subpaths } => Finding::new(
            Rule::PackageExportsRemoved,
            Severity::Breaking,
            "package.json#exports",
            format!(
                "package.json `exports` map was removed; entry points no longer exposed: {}",
                subpaths.join(", ")
            ),
        )
        .before(subpaths.join(", ")),
        PackageChange::TypeChanged { before, after } => Finding::new(
            Rule::PackageTypeChanged,
            Severity::Breaking,
            "package.json#type",
            format!("package.json `type` changed from {before:?} to {after:?}"),
        )
        .before(format!("{before:?}"))
        .after(format!("{after:?}")),
    }
}

/// Symbol name a finding about `export` is filed under.
fn export_symbol(export: &Export) -> String {
    if export.kind == ExportKind::Star && export.name == "*" {
        format!("* from {}", export.source_module.as_deref().unwrap_or_default())
    } else {
        export.display_name().to_string()
    }
}

/// Export statement text for `before`/`after` fields.
fn describe_export(export: &Export) -> String {
    let mut out = String::from("export ");
    let from = export.source_module.as_deref().map(|m| format!(" from '{m}'")).unwrap_or_default();
    match (export.export_type, export.kind) {
        (ExportType::Default, _) => {
            let _ = write!(out, "default {}", export.display_name());
        }
        (ExportType::Named, ExportKind::Star) if export.name == "*" => {
            let _ = write!(out, "*{from}");
        }
        (ExportType::Named, ExportKind::Star) => {
            let _ = write!(out, "* as {}{from}", export.name);
        }
        (ExportType::Named, _) if export.is_aliased() => {
            let local = export.source_name.as_deref().unwrap_or_default();
            let _ = write!(out, "{{ {local} as {} }}{from}", export.name);
        }
        (ExportType::Named, _) => {
            let _ = write!(out, "{{ {} }}{from}", export.name);
        }
    }
    out
}

fn owner_kind(kind: ExportKind, refers_to_class: bool) -> Option<SymbolKind> {
    if refers_to_class {
        return Some(SymbolKind::Class);
    }
    match kind {
        ExportKind::Function => Some(SymbolKind::Function),
        ExportKind::Class => Some(SymbolKind::Class),
        _ => None,
    }
}

fn kind_label(kind: ExportKind) -> &'static str {
    match kind {
        ExportKind::Function => "function",
        ExportKind::Class => "class",
        ExportKind::Object => "object",
        ExportKind::Variable => "variable",
        ExportKind::Interface => "interface",
        ExportKind::TypeAlias => "type alias",
        ExportKind::Enum => "enum",
        ExportKind::Star => "star re-export",
        ExportKind::Unknown => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PAIRING_THRESHOLD;
    use crate::diff::diff_snapshots;
    use crate::snapshot::{build_snapshot, SnapshotBuilder};

    fn report(path: &str, before: &str, after: &str) -> ImpactReport {
        let diff = diff_snapshots(
            &build_snapshot(path, before),
            &build_snapshot(path, after),
            DEFAULT_PAIRING_THRESHOLD,
        );
        format(path, &diff, Path::new("/p"), &[], &[])
    }

    #[test]
    fn removed_function_is_one_breaking_export_finding() {
        let report = report("src/a.js", "export function foo(a) {}", "");
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.rule_id, Rule::ExportRemoved);
        assert_eq!(finding.severity, Severity::Breaking);
        assert_eq!(finding.symbol, "foo");
        assert_eq!(report.functions, vec!["foo"]);
        assert_eq!(report.impacted_symbols, vec!["foo"]);
        assert_eq!(report.status, ReportStatus::NoProvenDependencies);
    }

    #[test]
    fn breaking_change_outranks_milder_change_on_same_symbol() {
        let report = report(
            "src/a.ts",
            "export function f(a: string): string { return a; }\n",
            "export function f(a: string | number): number { return 1; }\n",
        );
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.rule_id, Rule::FunctionReturnTypeChanged);
        assert_eq!(finding.severity, Severity::Breaking);
        assert_eq!(report.summary.breaking, 1);
        assert!(report.has_breaking());
    }

    #[test]
    fn untyped_param_narrowing_is_a_disclaimed_warning() {
        let report = report("src/a.js", "export function f(a, b) {}", "export function f(a) {}");
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.rule_id, Rule::FunctionSignatureChanged);
        assert_eq!(finding.severity, Severity::Warning);
        assert!(finding.message.ends_with(HEURISTIC_DISCLAIMER));
        assert!(finding.before.as_deref().is_some_and(|b| b.contains("f(a, b)")));
    }

    #[test]
    fn typed_findings_carry_no_disclaimer() {
        let report = report("src/a.ts", "export function f(a: string) {}", "export function f(a: number) {}");
        let finding = &report.findings[0];
        assert_eq!(finding.rule_id, Rule::FunctionParamTypeChanged);
        assert_eq!(finding.severity, Severity::Breaking);
        assert!(!finding.message.contains("heuristic"));
    }

    #[test]
    fn hedged_messages_are_not_disclaimed() {
        let finding = Finding::new(Rule::CjsExportRemoved, Severity::Breaking, "x", "likely broken".into());
        assert!(!needs_disclaimer(&finding, true));
        let finding = Finding::new(Rule::CjsExportRemoved, Severity::Breaking, "x", "removed".into());
        assert!(needs_disclaimer(&finding, true));
        let finding = Finding::new(Rule::PackageTypeChanged, Severity::Breaking, "x", "flipped".into());
        assert!(!needs_disclaimer(&finding, false));
    }

    #[test]
    fn default_to_named_is_a_single_finding() {
        let report = report("src/a.js", "export default function foo(){}", "export function foo(){}");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, Rule::ExportDefaultToNamed);
        assert_eq!(report.findings[0].symbol, "foo");
    }

    #[test]
    fn member_findings_are_qualified_and_owned_by_their_class() {
        let report = report(
            "src/a.ts",
            "export class Store {\n  get() {}\n  put() {}\n}\n",
            "export class Store {\n  get() {}\n}\n",
        );
        assert_eq!(report.findings[0].symbol, "Store.put");
        assert_eq!(report.classes, vec!["Store"]);
        assert_eq!(report.impacted_symbols, vec!["Store.put"]);
    }

    #[test]
    fn exports_map_removal_is_one_breaking_finding() {
        let builder = SnapshotBuilder::default();
        let before = builder.build_with_manifest("index.js", "", Some(r#"{"exports": {".": "./index.js"}}"#));
        let after = builder.build_with_manifest("index.js", "", Some(r#"{"name": "pkg"}"#));
        let diff = diff_snapshots(&before, &after, DEFAULT_PAIRING_THRESHOLD);
        let report = format("index.js", &diff, Path::new("/p"), &[], &[]);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, Rule::PackageExportsRemoved);
        assert!(report.has_breaking());
    }

    #[test]
    fn serialized_report_uses_camel_case_and_rule_ids() {
        let report = report("src/a.js", "export function foo(a) {}", "");
        let json = report.to_json().unwrap();
        assert!(json.contains("\"sourceFile\": \"src/a.js\""));
        assert!(json.contains("\"ruleId\": \"export-removed\""));
        assert!(json.contains("\"status\": \"no-proven-dependencies\""));
        assert!(!json.contains("owner"));
    }

    #[test]
    fn identical_content_is_unchanged() {
        let report = report("src/a.ts", "export const a = 1;", "export const a = 1;");
        assert_eq!(report, ImpactReport::unchanged("src/a.ts"));
    }
}
