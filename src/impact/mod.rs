//! The analysis pipeline: snapshot both sides, diff, propagate, report.

pub mod affinity;
pub mod downstream;

use std::path::{Path, PathBuf};

use crate::config::AnalyzerConfig;
use crate::diff::{diff_manifests, diff_snapshots, SnapshotDiff};
use crate::graph::DependencyGraph;
use crate::paths;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::report::{self, ImpactReport, ReportStatus};
use crate::snapshot::{PackageManifest, Snapshot, SnapshotBuilder};

pub use affinity::{AffectedTest, AffinityReason, AffinityResolver};
pub use downstream::{find_downstream, DownstreamFile};

/// Before and after content of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    /// The changed file, absolute or relative to `project_root`.
    pub file_path: PathBuf,
    /// Content before the edit.
    pub before_text: String,
    /// Content after the edit.
    pub after_text: String,
    /// Project root the graph was built for.
    pub project_root: PathBuf,
    /// Companion `package.json` before the edit.
    pub before_manifest: Option<String>,
    /// Companion `package.json` after the edit.
    pub after_manifest: Option<String>,
}

/// Runs analyses against a built dependency graph.
pub struct Analyzer<'a> {
    fs: &'a dyn FileSystem,
    clock: &'a dyn Clock,
    config: &'a AnalyzerConfig,
}

impl<'a> Analyzer<'a> {
    /// Creates an analyzer.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, clock: &'a dyn Clock, config: &'a AnalyzerConfig) -> Self {
        Self { fs, clock, config }
    }

    /// Analyzes one edit.
    ///
    /// Never fails: a side that cannot be parsed yields an
    /// [`ReportStatus::Unanalyzable`] report.
    #[must_use]
    pub fn analyze(&self, input: &AnalysisInput, graph: &DependencyGraph) -> ImpactReport {
        let changed_file = self.locate(input);
        let source_file = paths::relative_to(graph.root(), &changed_file);
        let _span = tracing::info_span!("analyze", file = %source_file).entered();

        if input.before_text == input.after_text && input.before_manifest == input.after_manifest {
            tracing::debug!("content identical; skipping diff");
            return ImpactReport::unchanged(&source_file);
        }

        let before = self.snapshot(&source_file, &input.before_text, input.before_manifest.as_deref());
        let after = self.snapshot(&source_file, &input.after_text, input.after_manifest.as_deref());
        if before.is_failed() || after.is_failed() {
            tracing::warn!("file could not be analyzed; reporting it as unanalyzable");
            return ImpactReport::unanalyzable(&source_file);
        }

        let diff = diff_snapshots(&before, &after, self.config.pairing_threshold);
        if diff.is_empty() {
            return ImpactReport::unchanged(&source_file);
        }

        let changed_names = diff.changed_names();
        let downstream = find_downstream(graph, &changed_file, &changed_names, self.config);
        let tests = AffinityResolver::new(self.fs, graph, self.config).find_affected_tests(
            &changed_file,
            &changed_names,
            &downstream,
        );
        let report = report::format(&source_file, &diff, graph.root(), &downstream, &tests);

        if report.status == ReportStatus::NoProvenDependencies {
            tracing::info!(
                findings = report.findings.len(),
                "no proven dependencies: no downstream files or tests reference the change"
            );
        } else {
            tracing::info!(
                findings = report.findings.len(),
                downstream = report.summary.downstream_files,
                tests = report.summary.tests,
                "analysis finished"
            );
        }
        if graph.is_truncated() {
            tracing::warn!("dependency graph was truncated; downstream results may be incomplete");
        }
        report
    }

    /// Analyzes several edits. One unanalyzable file never stops the batch.
    #[must_use]
    pub fn analyze_all(&self, inputs: &[AnalysisInput], graph: &DependencyGraph) -> Vec<ImpactReport> {
        inputs.iter().map(|input| self.analyze(input, graph)).collect()
    }

    fn snapshot(&self, source_file: &str, text: &str, manifest: Option<&str>) -> Snapshot {
        SnapshotBuilder::new(self.config)
            .build_with_manifest(source_file, text, manifest)
            .stamped(self.clock.now())
    }

    /// Canonical path of the changed file.
    fn locate(&self, input: &AnalysisInput) -> PathBuf {
        let path: &Path = &input.file_path;
        if path.is_absolute() {
            self.fs.canonicalize(path)
        } else {
            self.fs.canonicalize(&input.project_root.join(path))
        }
    }
}

/// Analyzes a package manifest edit on its own.
///
/// Package-level changes concern every consumer of the package rather than
/// one source file, so they get a single report of their own. Nothing in the
/// project imports a manifest, so the report never lists dependents.
#[must_use]
pub fn analyze_manifest(manifest_file: &str, before: Option<&str>, after: Option<&str>) -> ImpactReport {
    let _span = tracing::info_span!("analyze_manifest", file = manifest_file).entered();
    if before == after {
        return ImpactReport::unchanged(manifest_file);
    }

    let before = before.and_then(PackageManifest::parse);
    let after = after.and_then(PackageManifest::parse);
    let diff = SnapshotDiff {
        package: diff_manifests(before.as_ref(), after.as_ref()),
        ..SnapshotDiff::default()
    };
    if diff.is_empty() {
        return ImpactReport::unchanged(manifest_file);
    }

    let report = report::format(manifest_file, &diff, Path::new(""), &[], &[]);
    tracing::info!(findings = report.findings.len(), "package manifest changed");
    report
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapters::memory::{FixedClock, MemoryFileSystem};
    use crate::rules::Rule;

    fn project() -> MemoryFileSystem {
        MemoryFileSystem::with_files(&[
            ("/p/src/math.ts", "export function add(a: number, b: number): number { return a + b; }\n"),
            ("/p/src/calc.ts", "import { add } from './math';\nexport const total = add(1, 2);\n"),
            ("/p/src/app.ts", "import { total } from './calc';\nconsole.log(total);\n"),
            ("/p/test/math.test.ts", "import { add } from '../src/math';\ntest('add', () => add(1, 1));\n"),
            ("/p/test/other.test.ts", "import { x } from '../src/other';\n"),
            ("/p/src/other.ts", "export const x = 1;\n"),
        ])
    }

    fn input(before: &str, after: &str) -> AnalysisInput {
        AnalysisInput {
            file_path: "src/math.ts".into(),
            before_text: before.to_string(),
            after_text: after.to_string(),
            project_root: "/p".into(),
            ..AnalysisInput::default()
        }
    }

    #[test]
    fn removal_reaches_transitive_dependents_and_proven_tests() {
        let fs = project();
        let config = AnalyzerConfig::default();
        let graph = DependencyGraph::build(&fs, Path::new("/p"), &config).unwrap();
        let clock = FixedClock::epoch();
        let analyzer = Analyzer::new(&fs, &clock, &config);

        let before = fs.read_to_string(Path::new("/p/src/math.ts")).unwrap();
        let report = analyzer.analyze(&input(&before, ""), &graph);

        assert_eq!(report.status, ReportStatus::Impacted);
        assert_eq!(report.source_file, "src/math.ts");
        assert_eq!(report.downstream_files, vec!["src/app.ts", "src/calc.ts"]);
        assert_eq!(report.tests, vec!["test/math.test.ts"]);
        assert_eq!(report.downstream_lines.get("src/calc.ts"), Some(&Some(1)));
        assert_eq!(report.downstream_lines.get("src/app.ts"), Some(&None));
        assert_eq!(report.findings[0].rule_id, Rule::ExportRemoved);
        assert_eq!(report.functions, vec!["add"]);
    }

    #[test]
    fn identical_text_short_circuits() {
        let fs = project();
        let config = AnalyzerConfig::default();
        let graph = DependencyGraph::build(&fs, Path::new("/p"), &config).unwrap();
        let clock = FixedClock::epoch();
        let report = Analyzer::new(&fs, &clock, &config).analyze(&input("x", "x"), &graph);
        assert_eq!(report, ImpactReport::unchanged("src/math.ts"));
    }

    #[test]
    fn one_unanalyzable_file_does_not_stop_the_batch() {
        let fs = project();
        let config = AnalyzerConfig { max_file_bytes: 80, ..AnalyzerConfig::default() };
        let graph = DependencyGraph::build(&fs, Path::new("/p"), &config).unwrap();
        let clock = FixedClock::epoch();
        let huge = format!("export const big = '{}';\n", "x".repeat(200));
        let other = AnalysisInput {
            file_path: "src/other.ts".into(),
            before_text: "export const x = 1;\n".into(),
            after_text: String::new(),
            project_root: "/p".into(),
            ..AnalysisInput::default()
        };
        let reports = Analyzer::new(&fs, &clock, &config).analyze_all(&[input("", &huge), other], &graph);
        assert_eq!(reports[0].status, ReportStatus::Unanalyzable);
        assert_eq!(reports[1].status, ReportStatus::Impacted);
        assert_eq!(reports[1].tests, vec!["test/other.test.ts"]);
    }

    #[test]
    fn manifest_exports_removal_is_one_package_finding() {
        let report = analyze_manifest(
            "package.json",
            Some(r#"{"name": "p", "exports": {".": "./index.js"}}"#),
            Some(r#"{"name": "p"}"#),
        );
        assert_eq!(report.source_file, "package.json");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, Rule::PackageExportsRemoved);
        assert!(report.has_breaking());
    }

    #[test]
    fn manifest_without_surface_change_is_unchanged() {
        let report = analyze_manifest(
            "package.json",
            Some(r#"{"name": "p", "version": "1.0.0"}"#),
            Some(r#"{"name": "p", "version": "1.1.0"}"#),
        );
        assert_eq!(report, ImpactReport::unchanged("package.json"));
    }

    #[test]
    fn change_without_dependents_is_explicit() {
        let fs = MemoryFileSystem::with_files(&[("/p/src/math.ts", "")]);
        let config = AnalyzerConfig::default();
        let graph = DependencyGraph::build(&fs, Path::new("/p"), &config).unwrap();
        let clock = FixedClock::epoch();
        let report = Analyzer::new(&fs, &clock, &config)
            .analyze(&input("export function add() {}\n", ""), &graph);
        assert_eq!(report.status, ReportStatus::NoProvenDependencies);
        assert!(report.downstream_files.is_empty());
        assert!(report.tests.is_empty());
    }
}
