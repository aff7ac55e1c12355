//! `ripple dependents` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::commands::{absolute, Outcome};
use crate::config::AnalyzerConfig;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::impact::{find_downstream, AffinityResolver};
use crate::paths;

/// Files and tests that depend on one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependents {
    /// Non-test downstream files with their import line, if direct.
    pub files: Vec<(String, Option<usize>)>,
    /// Tests proven to exercise the file.
    pub tests: Vec<String>,
}

/// Execute the `dependents` command.
///
/// # Errors
///
/// Returns an error string if the project cannot be walked.
pub fn run(ctx: &ServiceContext, file: &Path, root: &Path) -> std::result::Result<Outcome, String> {
    let dependents = find(ctx, file, root).map_err(|e| e.to_string())?;
    print!("{}", render(&dependents));
    Ok(Outcome::Success)
}

/// Walks `root` and collects everything that transitively imports `file`.
///
/// # Errors
///
/// Returns an error if `root` is not a directory or the configuration is
/// invalid.
pub fn find(ctx: &ServiceContext, file: &Path, root: &Path) -> Result<Dependents> {
    let root = ctx.fs.canonicalize(&absolute(root)?);
    let config = AnalyzerConfig::load(ctx.fs.as_ref(), &root)?;
    let graph = DependencyGraph::build(ctx.fs.as_ref(), &root, &config)?;
    let target = ctx.fs.canonicalize(&absolute(file)?);

    let downstream = find_downstream(&graph, &target, &[], &config);
    let tests = AffinityResolver::new(ctx.fs.as_ref(), &graph, &config)
        .find_affected_tests(&target, &[], &downstream);
    if graph.is_truncated() {
        tracing::warn!("dependency graph was truncated; the list may be incomplete");
    }

    Ok(Dependents {
        files: downstream
            .iter()
            .filter(|d| !d.is_test)
            .map(|d| (paths::relative_to(graph.root(), &d.path), d.line))
            .collect(),
        tests: tests.iter().map(|t| paths::relative_to(graph.root(), &t.path)).collect(),
    })
}

/// One path per line, tests after a `tests:` header.
#[must_use]
pub fn render(dependents: &Dependents) -> String {
    let mut out = String::new();
    for (file, line) in &dependents.files {
        match line {
            Some(line) => {
                let _ = writeln!(out, "{file}:{line}");
            }
            None => {
                let _ = writeln!(out, "{file}");
            }
        }
    }
    if !dependents.tests.is_empty() {
        let _ = writeln!(out, "tests:");
        for test in &dependents.tests {
            let _ = writeln!(out, "  {test}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, MemoryGitRepo};

    fn context() -> ServiceContext {
        let fs = MemoryFileSystem::with_files(&[
            ("/p/src/core.ts", "export const core = 1;\n"),
            ("/p/src/mid.ts", "\nimport { core } from './core';\nexport const mid = core;\n"),
            ("/p/src/top.ts", "import { mid } from './mid';\n"),
            ("/p/src/lonely.ts", "export const lonely = 1;\n"),
            ("/p/test/core.test.ts", "import { core } from '../src/core';\n"),
        ]);
        ServiceContext::in_memory(fs, MemoryGitRepo::new())
    }

    #[test]
    fn lists_transitive_importers_and_tests() {
        let found = find(&context(), Path::new("/p/src/core.ts"), Path::new("/p")).unwrap();
        assert_eq!(
            found.files,
            vec![("src/mid.ts".to_string(), Some(2)), ("src/top.ts".to_string(), None)]
        );
        assert_eq!(found.tests, vec!["test/core.test.ts"]);
        assert_eq!(render(&found), "src/mid.ts:2\nsrc/top.ts\ntests:\n  test/core.test.ts\n");
    }

    #[test]
    fn file_without_importers_renders_nothing() {
        let found = find(&context(), Path::new("/p/src/lonely.ts"), Path::new("/p")).unwrap();
        assert_eq!(found, Dependents::default());
        assert_eq!(render(&found), "");
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(find(&context(), Path::new("/q/a.ts"), Path::new("/q")).is_err());
    }
}
