//! End-to-end library tests: project tree on disk or in memory, through the
//! graph, the analyzer and the JSON report.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use ripple::adapters::live::filesystem::LiveFileSystem;
use ripple::adapters::memory::{FixedClock, MemoryFileSystem};
use ripple::config::AnalyzerConfig;
use ripple::graph::DependencyGraph;
use ripple::impact::{AnalysisInput, Analyzer};
use ripple::ports::filesystem::FileSystem;
use ripple::report::{ImpactReport, ReportStatus};
use ripple::rules::{Rule, Severity};

fn analyze(fs: &dyn FileSystem, root: &Path, input: &AnalysisInput) -> ImpactReport {
    let config = AnalyzerConfig::default();
    let graph = DependencyGraph::build(fs, root, &config).unwrap();
    let clock = FixedClock::epoch();
    Analyzer::new(fs, &clock, &config).analyze(input, &graph)
}

fn edit(file: &str, before: &str, after: &str, root: &Path) -> AnalysisInput {
    AnalysisInput {
        file_path: file.into(),
        before_text: before.to_string(),
        after_text: after.to_string(),
        project_root: root.to_path_buf(),
        ..AnalysisInput::default()
    }
}

#[test]
fn transitive_closure_survives_import_cycles_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let files = [
        ("src/base.ts", "export function base(): number { return 1; }\n"),
        ("src/left.ts", "import { base } from './base';\nimport { right } from './right';\nexport const left = () => base() + right();\n"),
        ("src/right.ts", "import { left } from './left';\nexport const right = () => left();\n"),
        ("src/top.ts", "import { right } from './right';\nright();\n"),
        ("src/island.ts", "export const island = 1;\n"),
    ];
    for (path, contents) in files {
        fs::create_dir_all(root.join(path).parent().unwrap()).unwrap();
        fs::write(root.join(path), contents).unwrap();
    }

    let before = files[0].1;
    let report = analyze(&LiveFileSystem, root, &edit("src/base.ts", before, "", root));

    assert_eq!(report.status, ReportStatus::Impacted);
    assert_eq!(report.downstream_files, vec!["src/left.ts", "src/right.ts", "src/top.ts"]);
    assert_eq!(report.downstream_lines.get("src/left.ts"), Some(&Some(1)));
    assert!(!report.downstream_files.iter().any(|f| f == "src/base.ts" || f == "src/island.ts"));
}

#[test]
fn tests_need_proof_of_usage() {
    let fs = MemoryFileSystem::with_files(&[
        ("/p/src/format.ts", "export function pad(s: string): string { return s; }\n"),
        ("/p/lib/format.ts", "export function pad(s: string): string { return s; }\n"),
        ("/p/test/direct.test.ts", "import { pad } from '../src/format';\npad('x');\n"),
        ("/p/test/elsewhere.test.ts", "import { pad } from '../lib/format';\npad('x');\n"),
        ("/p/test/mention.test.ts", "// pad is covered in direct.test.ts\nconst name = 'pad';\n"),
    ]);
    let before = "export function pad(s: string): string { return s; }\n";
    let after = "export function pad(s: string, width: number): string { return s; }\n";
    let report = analyze(&fs, Path::new("/p"), &edit("src/format.ts", before, after, Path::new("/p")));

    assert_eq!(report.tests, vec!["test/direct.test.ts"]);
    assert_eq!(report.findings[0].rule_id, Rule::FunctionRequiredParamAdded);
    assert_eq!(report.findings[0].severity, Severity::Breaking);
}

#[test]
fn exports_map_removal_is_reported_once() {
    let fs = MemoryFileSystem::with_files(&[("/p/src/index.ts", "export const version = 1;\n")]);
    let source = "export const version = 1;\n";
    let input = AnalysisInput {
        before_manifest: Some(r#"{"name": "p", "exports": {".": "./dist/index.js", "./utils": "./dist/utils.js"}}"#.into()),
        after_manifest: Some(r#"{"name": "p"}"#.into()),
        ..edit("src/index.ts", source, source, Path::new("/p"))
    };
    let report = analyze(&fs, Path::new("/p"), &input);

    let package: Vec<_> =
        report.findings.iter().filter(|f| f.rule_id == Rule::PackageExportsRemoved).collect();
    assert_eq!(package.len(), 1);
    assert_eq!(package[0].severity, Severity::Breaking);
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn named_to_default_is_paired_instead_of_removed() {
    let fs = MemoryFileSystem::with_files(&[
        ("/p/src/widget.ts", ""),
        ("/p/src/page.ts", "import { Widget } from './widget';\n"),
    ]);
    let before = "export class Widget {}\n";
    let after = "export default class Widget {}\n";
    let report = analyze(&fs, Path::new("/p"), &edit("src/widget.ts", before, after, Path::new("/p")));

    assert!(report.findings.iter().any(|f| f.rule_id == Rule::ExportNamedToDefault));
    assert!(!report.findings.iter().any(|f| f.rule_id == Rule::ExportedClassRemoved));
    assert_eq!(report.downstream_files, vec!["src/page.ts"]);
}

#[test]
fn heuristic_findings_carry_a_disclaimer() {
    let fs = MemoryFileSystem::with_files(&[("/p/src/legacy.js", "")]);
    let before = "export function add(a, b) { return a + b; }\n";
    let after = "export function add(a) { return a; }\n";
    let report = analyze(&fs, Path::new("/p"), &edit("src/legacy.js", before, after, Path::new("/p")));

    assert!(!report.findings.is_empty());
    assert!(report.findings.iter().all(|f| f.message.contains("heuristic")
        || ["likely", "potential", "possibly"].iter().any(|h| f.message.contains(h))));
}

#[test]
fn reports_are_deterministic() {
    let fs = MemoryFileSystem::with_files(&[
        ("/p/src/a.ts", ""),
        ("/p/src/b.ts", "import { one, two } from './a';\n"),
        ("/p/src/c.ts", "import { one } from './a';\n"),
        ("/p/test/a.test.ts", "import { two } from '../src/a';\ntwo();\n"),
    ]);
    let before = "export const one = 1;\nexport function two(): void {}\nexport interface Three { x: number }\n";
    let input = edit("src/a.ts", before, "", Path::new("/p"));

    let first = analyze(&fs, Path::new("/p"), &input).to_json().unwrap();
    let second = analyze(&fs, Path::new("/p"), &input).to_json().unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["downstreamFiles"], serde_json::json!(["src/b.ts", "src/c.ts"]));
    assert_eq!(value["tests"], serde_json::json!(["test/a.test.ts"]));
}
