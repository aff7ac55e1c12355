//! `ripple analyze` command.

use std::path::{Path, PathBuf};

use crate::cli::{AnalyzeArgs, ReportFormat};
use crate::commands::{absolute, read, Outcome};
use crate::config::AnalyzerConfig;
use crate::context::ServiceContext;
use crate::error::{Result, RippleError};
use crate::graph::DependencyGraph;
use crate::impact::{analyze_manifest, AnalysisInput, Analyzer};
use crate::report::{self, ImpactReport, ReportStatus};
use crate::snapshot::SourceLanguage;

/// Name of the package manifest read from the project root.
const MANIFEST_FILE: &str = "package.json";

/// Execute the `analyze` command.
///
/// Reports go to stdout or `--output`. With `--fail-on-breaking`, a breaking
/// finding in any report turns into [`Outcome::BreakingChanges`].
///
/// # Errors
///
/// Returns an error string if inputs cannot be read, git fails, or the
/// report cannot be written.
pub fn run(ctx: &ServiceContext, args: &AnalyzeArgs) -> std::result::Result<Outcome, String> {
    let reports = analyze(ctx, args).map_err(|e| e.to_string())?;
    let rendered = render(&reports, args.format).map_err(|e| e.to_string())?;

    match &args.output {
        Some(path) => ctx
            .fs
            .write(path, &rendered)
            .map_err(|e| RippleError::write(path, e).to_string())?,
        None => print!("{rendered}"),
    }

    if args.fail_on_breaking && reports.iter().any(ImpactReport::has_breaking) {
        Ok(Outcome::BreakingChanges)
    } else {
        Ok(Outcome::Success)
    }
}

/// Builds the project graph and analyzes every requested file, followed by
/// one report for the root `package.json` when its public surface changed.
///
/// # Errors
///
/// Returns an error if `--before`/`--after` are combined with other than one
/// file, the project cannot be walked, an input cannot be read, or git fails.
pub fn analyze(ctx: &ServiceContext, args: &AnalyzeArgs) -> Result<Vec<ImpactReport>> {
    if (args.before.is_some() || args.after.is_some()) && args.files.len() != 1 {
        return Err(RippleError::Usage(
            "--before and --after need exactly one FILE".to_string(),
        ));
    }

    let root = ctx.fs.canonicalize(&absolute(&args.root)?);
    let config = AnalyzerConfig::load(ctx.fs.as_ref(), &root)?;
    let graph = DependencyGraph::build(ctx.fs.as_ref(), &root, &config)?;

    let files = target_files(ctx, args, &root)?;
    if files.is_empty() {
        tracing::info!(rev = %args.rev, "no changed source files");
    }
    let mut inputs = Vec::with_capacity(files.len());
    for file in files {
        let before_text = before_text(ctx, args, &root, &file)?;
        let after_text = after_text(ctx, args, &file)?;
        inputs.push(AnalysisInput {
            file_path: file,
            before_text,
            after_text,
            project_root: root.clone(),
            ..AnalysisInput::default()
        });
    }
    let mut reports =
        Analyzer::new(ctx.fs.as_ref(), ctx.clock.as_ref(), &config).analyze_all(&inputs, &graph);

    // The manifest is diffed once per run, whichever source files changed.
    let (before_manifest, after_manifest) = manifests(ctx, args, &root)?;
    let package = analyze_manifest(MANIFEST_FILE, before_manifest.as_deref(), after_manifest.as_deref());
    if package.status != ReportStatus::Unchanged {
        reports.push(package);
    }
    Ok(reports)
}

/// Renders reports as a JSON array or as text blocks.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(reports: &[ImpactReport], format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Json => serde_json::to_string_pretty(reports)? + "\n",
        ReportFormat::Text => reports.iter().map(report::text::render).collect::<Vec<_>>().join("\n"),
    })
}

/// Files named on the command line, or the source files git reports changed.
fn target_files(ctx: &ServiceContext, args: &AnalyzeArgs, root: &Path) -> Result<Vec<PathBuf>> {
    if !args.files.is_empty() {
        return args
            .files
            .iter()
            .map(|file| Ok(ctx.fs.canonicalize(&absolute(file)?)))
            .collect();
    }

    let changed = ctx
        .git
        .changed_files(root, &args.rev)
        .map_err(|e| RippleError::Git(e.to_string()))?;
    Ok(changed
        .iter()
        .filter(|file| SourceLanguage::from_path(Path::new(file)).is_some())
        .map(|file| ctx.fs.canonicalize(&root.join(file)))
        .collect())
}

/// Content before the edit: `--before`, else the blob at `--rev`.
///
/// A file absent at the revision is new, so its before side is empty.
fn before_text(ctx: &ServiceContext, args: &AnalyzeArgs, root: &Path, file: &Path) -> Result<String> {
    if let Some(path) = &args.before {
        return read(ctx, path);
    }
    let blob = ctx
        .git
        .show_file(root, &args.rev, file)
        .map_err(|e| RippleError::Git(e.to_string()))?;
    Ok(blob.unwrap_or_default())
}

/// Content after the edit: `--after`, else the working tree.
///
/// A file missing from the working tree was deleted.
fn after_text(ctx: &ServiceContext, args: &AnalyzeArgs, file: &Path) -> Result<String> {
    if let Some(path) = &args.after {
        return read(ctx, path);
    }
    if ctx.fs.is_file(file) {
        read(ctx, file)
    } else {
        tracing::debug!(file = %file.display(), "file missing from working tree; treating as deleted");
        Ok(String::new())
    }
}

/// Root `package.json` at `--rev` and in the working tree.
///
/// With an explicit `--before` there is no revision to compare against, so
/// both sides get the working tree manifest.
fn manifests(
    ctx: &ServiceContext,
    args: &AnalyzeArgs,
    root: &Path,
) -> Result<(Option<String>, Option<String>)> {
    let path = root.join(MANIFEST_FILE);
    let after = if ctx.fs.is_file(&path) { Some(read(ctx, &path)?) } else { None };
    if args.before.is_some() {
        return Ok((after.clone(), after));
    }
    let before = ctx
        .git
        .show_file(root, &args.rev, &path)
        .map_err(|e| RippleError::Git(e.to_string()))?;
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, MemoryGitRepo};
    use crate::report::ReportStatus;
    use crate::rules::Rule;

    const UTIL_BEFORE: &str = "export function parse(input: string): number { return 0; }\n\
                               export function format(n: number): string { return ''; }\n";
    const UTIL_AFTER: &str = "export function parse(input: string): number { return 0; }\n";

    fn context() -> ServiceContext {
        let fs = MemoryFileSystem::with_files(&[
            ("/p/src/util.ts", UTIL_AFTER),
            ("/p/src/view.ts", "import { format } from './util';\nexport const label = format(1);\n"),
            ("/p/test/util.test.ts", "import { format } from '../src/util';\nformat(2);\n"),
            ("/p/package.json", "{\"name\": \"p\"}\n"),
            ("/p/old/util.ts", UTIL_BEFORE),
        ]);
        let git = MemoryGitRepo::new()
            .with_file("HEAD", "src/util.ts", UTIL_BEFORE)
            .with_file("HEAD", "src/view.ts", "import { format } from './util';\nexport const label = format(1);\n")
            .with_file("HEAD", "package.json", "{\"name\": \"p\"}\n")
            .with_changed("src/util.ts")
            .with_changed("README.md");
        ServiceContext::in_memory(fs, git)
    }

    fn args(files: &[&str]) -> AnalyzeArgs {
        AnalyzeArgs {
            files: files.iter().map(PathBuf::from).collect(),
            root: PathBuf::from("/p"),
            rev: "HEAD".to_string(),
            before: None,
            after: None,
            format: ReportFormat::Json,
            output: None,
            fail_on_breaking: false,
        }
    }

    #[test]
    fn changed_files_come_from_git_and_skip_non_sources() {
        let reports = analyze(&context(), &args(&[])).unwrap();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.source_file, "src/util.ts");
        assert_eq!(report.status, ReportStatus::Impacted);
        assert_eq!(report.downstream_files, vec!["src/view.ts"]);
        assert_eq!(report.tests, vec!["test/util.test.ts"]);
        assert_eq!(report.findings[0].rule_id, Rule::ExportRemoved);
    }

    const EXPORTS_MANIFEST: &str = "{\"name\": \"p\", \"exports\": {\".\": \"./dist/index.js\"}}\n";

    fn package_exports_findings(reports: &[ImpactReport]) -> usize {
        reports
            .iter()
            .flat_map(|r| &r.findings)
            .filter(|f| f.rule_id == Rule::PackageExportsRemoved)
            .count()
    }

    #[test]
    fn manifest_change_alone_is_reported() {
        let fs = MemoryFileSystem::with_files(&[
            ("/p/src/index.ts", "export const version = 1;\n"),
            ("/p/package.json", "{\"name\": \"p\"}\n"),
        ]);
        let git = MemoryGitRepo::new()
            .with_file("HEAD", "src/index.ts", "export const version = 1;\n")
            .with_file("HEAD", "package.json", EXPORTS_MANIFEST)
            .with_changed("package.json");
        let reports = analyze(&ServiceContext::in_memory(fs, git), &args(&[])).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].source_file, "package.json");
        assert_eq!(package_exports_findings(&reports), 1);
        assert!(reports[0].has_breaking());
    }

    #[test]
    fn manifest_change_is_reported_once_across_files() {
        let fs = MemoryFileSystem::with_files(&[
            ("/p/src/a.ts", ""),
            ("/p/src/b.ts", ""),
            ("/p/package.json", "{\"name\": \"p\"}\n"),
        ]);
        let git = MemoryGitRepo::new()
            .with_file("HEAD", "src/a.ts", "export const a = 1;\n")
            .with_file("HEAD", "src/b.ts", "export const b = 1;\n")
            .with_file("HEAD", "package.json", EXPORTS_MANIFEST)
            .with_changed("package.json")
            .with_changed("src/a.ts")
            .with_changed("src/b.ts");
        let reports = analyze(&ServiceContext::in_memory(fs, git), &args(&[])).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(package_exports_findings(&reports), 1);
        assert_eq!(reports[2].source_file, "package.json");
    }

    #[test]
    fn explicit_before_file_replaces_git() {
        let mut args = args(&["/p/src/util.ts"]);
        args.before = Some(PathBuf::from("/p/old/util.ts"));
        let reports = analyze(&context(), &args).unwrap();
        assert!(reports[0].has_breaking());
    }

    #[test]
    fn new_file_has_empty_before_side() {
        let ctx = context();
        ctx.fs.write(Path::new("/p/src/fresh.ts"), "export const fresh = 1;\n").unwrap();
        let reports = analyze(&ctx, &args(&["/p/src/fresh.ts"])).unwrap();
        assert!(!reports[0].has_breaking());
        assert!(!reports[0].findings.is_empty());
        assert!(reports[0]
            .findings
            .iter()
            .all(|f| matches!(f.rule_id, Rule::ExportAdded | Rule::SymbolAdded)));
    }

    #[test]
    fn before_needs_exactly_one_file() {
        let mut args = args(&[]);
        args.before = Some(PathBuf::from("/p/old/util.ts"));
        let err = analyze(&context(), &args).unwrap_err();
        assert!(matches!(err, RippleError::Usage(_)));
    }

    #[test]
    fn fail_on_breaking_sets_outcome_and_output_is_written() {
        let ctx = context();
        let mut args = args(&["/p/src/util.ts"]);
        args.fail_on_breaking = true;
        args.output = Some(PathBuf::from("/p/out/report.json"));
        assert_eq!(run(&ctx, &args).unwrap(), Outcome::BreakingChanges);

        let written = ctx.fs.read_to_string(Path::new("/p/out/report.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value[0]["sourceFile"], "src/util.ts");
    }

    #[test]
    fn text_reports_are_separated_by_blank_lines() {
        let text = render(
            &[ImpactReport::unchanged("a.ts"), ImpactReport::unchanged("b.ts")],
            ReportFormat::Text,
        )
        .unwrap();
        assert_eq!(text, "a.ts: no API surface changes\n\nb.ts: no API surface changes\n");
    }
}
