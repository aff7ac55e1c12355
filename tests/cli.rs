//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const STORE_BEFORE: &str = "export function load(key: string): string { return key; }\n\
                            export function save(key: string, value: string): void {}\n";
const STORE_AFTER: &str = "export function load(key: string): string { return key; }\n";

fn run_ripple(dir: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_ripple");
    Command::new(bin)
        .current_dir(dir)
        .env_remove("RIPPLE_LOG")
        .args(args)
        .output()
        .expect("failed to run ripple binary")
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A project whose `store.ts` lost `save`, plus the old content elsewhere.
fn project() -> (TempDir, TempDir) {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "src/store.ts", STORE_AFTER);
    write(root.path(), "src/cache.ts", "import { save } from './store';\nexport const put = save;\n");
    write(root.path(), "src/index.ts", "import { put } from './cache';\nput('a', 'b');\n");
    write(root.path(), "src/clock.ts", "export const now = () => 0;\n");
    write(root.path(), "test/store.test.ts", "import { save } from '../src/store';\nsave('k', 'v');\n");
    write(root.path(), "test/clock.test.ts", "import { now } from '../src/clock';\nnow();\n");

    let old = tempfile::tempdir().unwrap();
    write(old.path(), "store.ts", STORE_BEFORE);
    (root, old)
}

fn before_arg(old: &TempDir) -> String {
    old.path().join("store.ts").display().to_string()
}

#[test]
fn analyze_prints_json_report() {
    let (root, old) = project();
    let before = before_arg(&old);
    let output = run_ripple(root.path(), &["analyze", "src/store.ts", "--before", &before]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &reports[0];
    assert_eq!(report["sourceFile"], "src/store.ts");
    assert_eq!(report["status"], "impacted");
    assert_eq!(report["downstreamFiles"], serde_json::json!(["src/cache.ts", "src/index.ts"]));
    assert_eq!(report["tests"], serde_json::json!(["test/store.test.ts"]));
    assert_eq!(report["findings"][0]["severity"], "breaking");
}

#[test]
fn fail_on_breaking_exits_with_two() {
    let (root, old) = project();
    let before = before_arg(&old);
    let output = run_ripple(
        root.path(),
        &["analyze", "src/store.ts", "--before", &before, "--fail-on-breaking"],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn non_breaking_change_passes_fail_on_breaking() {
    let (root, _old) = project();
    let additive = tempfile::tempdir().unwrap();
    write(additive.path(), "clock.ts", "");
    let before = additive.path().join("clock.ts").display().to_string();
    let output = run_ripple(
        root.path(),
        &["analyze", "src/clock.ts", "--before", &before, "--fail-on-breaking"],
    );
    assert!(output.status.success());
}

#[test]
fn text_format_and_output_file() {
    let (root, old) = project();
    let before = before_arg(&old);
    let output = run_ripple(
        root.path(),
        &["analyze", "src/store.ts", "--before", &before, "--format", "text", "--output", "impact.txt"],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let text = fs::read_to_string(root.path().join("impact.txt")).unwrap();
    assert!(text.starts_with("src/store.ts: changed\n"));
    assert!(text.contains("[breaking]"));
    assert!(text.contains("test/store.test.ts"));
}

#[test]
fn before_with_several_files_is_a_usage_error() {
    let (root, old) = project();
    let before = before_arg(&old);
    let output = run_ripple(
        root.path(),
        &["analyze", "src/store.ts", "src/clock.ts", "--before", &before],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exactly one FILE"));
}

#[test]
fn dependents_lists_importers_and_tests() {
    let (root, _old) = project();
    let output = run_ripple(root.path(), &["dependents", "src/store.ts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "src/cache.ts:1\nsrc/index.ts\ntests:\n  test/store.test.ts\n");
}

#[test]
fn snapshot_prints_yaml() {
    let (root, _old) = project();
    let output = run_ripple(root.path(), &["snapshot", "src/store.ts", "--format", "yaml"]);
    assert!(output.status.success());
    let value: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(value["file_path"], serde_yaml::Value::from("src/store.ts"));
}

#[test]
fn help_goes_to_stdout_and_succeeds() {
    let (root, _old) = project();
    let output = run_ripple(root.path(), &["analyze", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--fail-on-breaking"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let (root, _old) = project();
    let output = run_ripple(root.path(), &["nonsense"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unrecognized subcommand"));
}
