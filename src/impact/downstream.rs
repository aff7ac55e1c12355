//! Transitive dependents of a changed file.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::config::AnalyzerConfig;
use crate::graph::{is_test_file, DependencyGraph};

/// A file that depends, directly or transitively, on the changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamFile {
    /// Canonical path.
    pub path: PathBuf,
    /// Line of the import that links it to the changed file, when known.
    /// Only direct importers can carry one.
    pub line: Option<usize>,
    /// 1 for direct importers, 2 for their importers, and so on.
    pub depth: usize,
    /// Classified as a test by name or directory.
    pub is_test: bool,
}

/// Breadth-first walk over reverse import edges starting at the direct
/// importers of `changed_file`.
///
/// The changed file itself is never part of the result, even when an import
/// cycle leads back to it. Results are sorted by path.
#[must_use]
pub fn find_downstream(
    graph: &DependencyGraph,
    changed_file: &Path,
    changed_names: &[String],
    config: &AnalyzerConfig,
) -> Vec<DownstreamFile> {
    let mut visited: BTreeSet<&Path> = BTreeSet::from([changed_file]);
    let mut queue: VecDeque<(&Path, usize)> = VecDeque::new();
    let mut found = Vec::new();

    for importer in graph.importers(changed_file) {
        if visited.insert(importer) {
            queue.push_back((importer, 1));
        }
    }
    while let Some((file, depth)) = queue.pop_front() {
        let line = (depth == 1).then(|| import_line(graph, file, changed_file, changed_names)).flatten();
        found.push(DownstreamFile {
            path: file.to_path_buf(),
            line,
            depth,
            is_test: is_test_file(graph.root(), file, config),
        });
        for importer in graph.importers(file) {
            if visited.insert(importer) {
                queue.push_back((importer, depth + 1));
            }
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(file = %changed_file.display(), dependents = found.len(), "downstream walk finished");
    found
}

/// Prefers the import that binds one of the changed names; otherwise the
/// first import of the changed file.
fn import_line(
    graph: &DependencyGraph,
    importer: &Path,
    changed_file: &Path,
    changed_names: &[String],
) -> Option<usize> {
    let edge = graph.edge(importer, changed_file);
    edge.iter()
        .find(|import| changed_names.iter().any(|name| import.binds(name)))
        .or_else(|| edge.first())
        .map(|import| import.line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    fn graph(files: &[(&str, &str)]) -> DependencyGraph {
        let fs = MemoryFileSystem::with_files(files);
        DependencyGraph::build(&fs, Path::new("/p"), &AnalyzerConfig::default()).unwrap()
    }

    fn paths(found: &[DownstreamFile]) -> Vec<&str> {
        found.iter().map(|f| f.path.to_str().unwrap()).collect()
    }

    #[test]
    fn chain_is_closed_transitively_despite_unrelated_cycle() {
        let graph = graph(&[
            ("/p/a.ts", "export const a = 1;\n"),
            ("/p/b.ts", "import { a } from './a';\nexport const b = a;\n"),
            ("/p/c.ts", "import { b } from './b';\n"),
            ("/p/d.ts", "import './e';\n"),
            ("/p/e.ts", "import './d';\n"),
        ]);
        let found = find_downstream(&graph, Path::new("/p/a.ts"), &["a".into()], &AnalyzerConfig::default());
        assert_eq!(paths(&found), vec!["/p/b.ts", "/p/c.ts"]);
        assert_eq!(found[0].line, Some(1));
        assert_eq!(found[0].depth, 1);
        assert_eq!(found[1].line, None);
        assert_eq!(found[1].depth, 2);
    }

    #[test]
    fn cycle_through_changed_file_terminates_without_self() {
        let graph = graph(&[
            ("/p/a.ts", "import { c } from './c';\nexport const a = 1;\n"),
            ("/p/b.ts", "import { a } from './a';\nexport const b = a;\n"),
            ("/p/c.ts", "import { b } from './b';\nexport const c = b;\n"),
        ]);
        let found = find_downstream(&graph, Path::new("/p/a.ts"), &[], &AnalyzerConfig::default());
        assert_eq!(paths(&found), vec!["/p/b.ts", "/p/c.ts"]);
    }

    #[test]
    fn line_prefers_import_binding_changed_name() {
        let graph = graph(&[
            ("/p/a.ts", "export const a = 1;\nexport const z = 2;\n"),
            ("/p/b.ts", "import { z } from './a';\n\nimport { a } from './a';\n"),
        ]);
        let found = find_downstream(&graph, Path::new("/p/a.ts"), &["a".into()], &AnalyzerConfig::default());
        assert_eq!(found[0].line, Some(3));
    }

    #[test]
    fn tests_are_flagged_not_dropped() {
        let graph = graph(&[
            ("/p/src/a.ts", "export const a = 1;\n"),
            ("/p/src/a.test.ts", "import { a } from './a';\n"),
        ]);
        let found = find_downstream(&graph, Path::new("/p/src/a.ts"), &[], &AnalyzerConfig::default());
        assert_eq!(found.len(), 1);
        assert!(found[0].is_test);
    }
}
