//! Test affinity: which tests provably exercise a changed file.
//!
//! A test is reported only with evidence. Being a downstream file in the
//! dependency graph is evidence; so is an import that resolves to the changed
//! file. An import that only names the file by its base name (a path alias,
//! or a specifier the resolver could not follow) must be backed by a use of
//! one of the changed symbols. Similar file names alone never count.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::graph::{extract_imports, resolve, DependencyGraph, ImportSpecifier};
use crate::paths;
use crate::ports::filesystem::FileSystem;
use crate::snapshot::clean::strip_comments_and_strings;
use crate::snapshot::{typed, ImportedName, SnapshotBuilder, SourceLanguage};

use super::downstream::DownstreamFile;

/// The evidence that tied a test to the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AffinityReason {
    /// Reached through the dependency graph.
    Graph,
    /// Imports the changed file by a path that resolves to it.
    Import,
    /// Syntax tree shows a changed symbol being used.
    AstUsage,
    /// Cleaned source shows a changed symbol being used.
    PatternUsage,
}

/// A test file with the evidence for including it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedTest {
    /// Canonical path.
    pub path: PathBuf,
    /// Why it is included.
    pub reason: AffinityReason,
}

/// Finds tests affected by a change, given the project graph.
pub struct AffinityResolver<'a> {
    fs: &'a dyn FileSystem,
    graph: &'a DependencyGraph,
    config: &'a AnalyzerConfig,
}

impl<'a> AffinityResolver<'a> {
    /// Creates a resolver over a built graph.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, graph: &'a DependencyGraph, config: &'a AnalyzerConfig) -> Self {
        Self { fs, graph, config }
    }

    /// Tests affected by changes to `changed_names` in `changed_file`,
    /// sorted by path.
    ///
    /// `downstream` is the propagator's result; its test files are accepted
    /// on graph evidence. Every other test file in the project is scanned.
    #[must_use]
    pub fn find_affected_tests(
        &self,
        changed_file: &Path,
        changed_names: &[String],
        downstream: &[DownstreamFile],
    ) -> Vec<AffectedTest> {
        let mut affected: BTreeMap<PathBuf, AffinityReason> = downstream
            .iter()
            .filter(|d| d.is_test)
            .map(|d| (d.path.clone(), AffinityReason::Graph))
            .collect();

        for test in self.graph.test_files(self.config) {
            if test == changed_file || affected.contains_key(test) {
                continue;
            }
            if let Some(reason) = self.prove(test, changed_file, changed_names) {
                tracing::debug!(test = %test.display(), ?reason, "test linked to change");
                affected.insert(test.to_path_buf(), reason);
            }
        }
        affected.into_iter().map(|(path, reason)| AffectedTest { path, reason }).collect()
    }

    fn prove(&self, test: &Path, changed_file: &Path, changed_names: &[String]) -> Option<AffinityReason> {
        let source = match self.fs.read_to_string(test) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(test = %test.display(), error = %e, "skipping unreadable test file");
                return None;
            }
        };
        let target = target_name(changed_file);

        let mut named = Vec::new();
        for import in extract_imports(&source) {
            if import.is_relative() {
                match resolve::resolve(self.fs, test, import.specifier()) {
                    Some(found) if found == changed_file => return Some(AffinityReason::Import),
                    Some(_) => continue,
                    None => {}
                }
            }
            if specifier_names(import.specifier(), &target) {
                named.push(import);
            }
        }
        if named.is_empty() {
            return None;
        }
        if changed_names.is_empty() {
            return Some(AffinityReason::Import);
        }

        let language = SourceLanguage::from_path(test).filter(|l| l.is_typed());
        if let Some(language) = language {
            if let Some(used) = ast_usage(&source, test, language, &named, changed_names) {
                return used.then_some(AffinityReason::AstUsage);
            }
        }
        pattern_usage(&source, &named, changed_names).then_some(AffinityReason::PatternUsage)
    }
}

/// Name a specifier would use for the changed file: its stem, or the
/// directory name for an index file.
fn target_name(changed_file: &Path) -> String {
    let stem = paths::file_stem(changed_file);
    if stem == "index" {
        if let Some(dir) = changed_file.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// The specifier's last path segment names `target`.
///
/// Single-segment bare specifiers (`path`, `lodash`) and `node:` built-ins
/// name packages, never project files, so they never match.
fn specifier_names(specifier: &str, target: &str) -> bool {
    if specifier.starts_with("node:") || !specifier.contains('/') {
        return false;
    }
    let last = specifier.trim_end_matches('/').rsplit('/').next().unwrap_or(specifier);
    let last = if last == "index" || last.starts_with("index.") {
        specifier.trim_end_matches('/').rsplit('/').nth(1).unwrap_or(last)
    } else {
        last
    };
    !last.is_empty() && paths::file_stem(Path::new(last)) == target
}

/// How a local binding reaches the changed module.
enum Binding<'n> {
    /// Bound to one export.
    Direct(&'n str),
    /// Bound to the whole module.
    Namespace(&'n str),
}

fn bindings<'n>(names: &'n [ImportedName], changed_names: &[String]) -> Vec<Binding<'n>> {
    names
        .iter()
        .filter_map(|n| {
            if n.imported == "*" {
                Some(Binding::Namespace(n.local.as_str()))
            } else if changed_names.iter().any(|c| *c == n.imported) {
                Some(Binding::Direct(n.local.as_str()))
            } else {
                None
            }
        })
        .collect()
}

/// `Some(true)` when the syntax tree shows a changed symbol in use,
/// `Some(false)` when it shows none, `None` when the file cannot be parsed.
fn ast_usage(
    source: &str,
    test: &Path,
    language: SourceLanguage,
    named: &[ImportSpecifier],
    changed_names: &[String],
) -> Option<bool> {
    let references = typed::references(source, language)?;
    let specifiers: BTreeSet<&str> = named.iter().map(ImportSpecifier::specifier).collect();
    let snapshot = SnapshotBuilder::default().build(&paths::to_slash(test), source);

    let is_used = |binding: &Binding| {
        references.iter().any(|r| match *binding {
            Binding::Direct(local) => r.name == local,
            Binding::Namespace(ns) => {
                r.name == ns && r.member.as_ref().is_some_and(|m| changed_names.contains(m))
            }
        })
    };
    let imported = snapshot
        .imports
        .iter()
        .filter(|i| specifiers.contains(i.module.as_str()))
        .map(|i| i.names.as_slice());
    // `require` calls are not in the typed import list.
    let required = named
        .iter()
        .filter(|i| matches!(i, ImportSpecifier::Require { .. }))
        .map(ImportSpecifier::names);
    Some(
        imported
            .chain(required)
            .flat_map(|names| bindings(names, changed_names))
            .any(|binding| is_used(&binding)),
    )
}

/// Usage check over comment- and string-stripped text: `name(`, `name.`,
/// `name[` for direct bindings and changed names, `ns.name` / `ns[` for
/// namespace bindings.
fn pattern_usage(source: &str, named: &[ImportSpecifier], changed_names: &[String]) -> bool {
    let cleaned = strip_comments_and_strings(source);
    let mut patterns: Vec<String> = changed_names
        .iter()
        .filter(|n| *n != "default")
        .map(|n| usage_pattern(n))
        .collect();
    for import in named {
        for binding in bindings(import.names(), changed_names) {
            match binding {
                Binding::Direct(local) => patterns.push(usage_pattern(local)),
                Binding::Namespace(ns) => {
                    let members = changed_names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
                    patterns.push(format!(
                        r"(?:^|[^\w$]){}\s*(?:\.\s*(?:{members})(?:[^\w$]|$)|\[)",
                        regex::escape(ns)
                    ));
                }
            }
        }
    }
    patterns.iter().any(|pattern| match Regex::new(pattern) {
        Ok(re) => re.is_match(&cleaned),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "skipping invalid usage pattern");
            false
        }
    })
}

fn usage_pattern(name: &str) -> String {
    format!(r"(?:^|[^\w$.]){}\s*[(.\[]", regex::escape(name))
}
