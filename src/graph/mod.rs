//! Reverse-import dependency graph over a project tree.
//!
//! The graph is built by one sequential walk and is then read-only apart from
//! explicit single-file invalidation. Keys are canonical paths so one physical
//! file is never represented twice.

pub mod imports;
pub mod resolve;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::AnalyzerConfig;
use crate::error::{Result, RippleError};
use crate::ports::filesystem::FileSystem;
use crate::snapshot::language::is_source_file;

pub use imports::{extract_imports, ImportSpecifier};

/// Files of a project and the relative imports between them.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    root: PathBuf,
    /// importer -> target -> the import statements linking them
    forward: BTreeMap<PathBuf, BTreeMap<PathBuf, Vec<ImportSpecifier>>>,
    /// target -> importers
    reverse: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// importer -> every path its relative imports would resolve to if present
    candidates: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    files: BTreeSet<PathBuf>,
    truncated: bool,
}

impl DependencyGraph {
    /// Walks `root` and indexes every source file's relative imports.
    ///
    /// Unreadable directories and files are logged and skipped. When the
    /// configured walk budget runs out the walk stops early and the graph is
    /// marked truncated.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory.
    pub fn build(fs: &dyn FileSystem, root: &Path, config: &AnalyzerConfig) -> Result<Self> {
        if !fs.is_dir(root) {
            return Err(RippleError::ProjectRoot(root.to_path_buf()));
        }
        let root = fs.canonicalize(root);
        let _span = tracing::info_span!("graph_build", root = %root.display()).entered();

        let started = Instant::now();
        let budget = config.walk_budget_ms.map(Duration::from_millis);
        let mut graph = Self { root: root.clone(), ..Self::default() };
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            if budget.is_some_and(|b| started.elapsed() >= b) {
                tracing::warn!(
                    budget_ms = config.walk_budget_ms,
                    files = graph.files.len(),
                    "walk budget exhausted; dependency graph is incomplete"
                );
                graph.truncated = true;
                break;
            }
            let entries = match fs.list_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            // Reverse so the stack pops entries in sorted order.
            for name in entries.into_iter().rev() {
                let path = dir.join(&name);
                if fs.is_dir(&path) {
                    if !config.skip_dirs.iter().any(|skip| *skip == name) {
                        pending.push(path);
                    }
                } else if is_source_file(&path) {
                    graph.index_file(fs, &path);
                }
            }
        }

        tracing::info!(
            files = graph.files.len(),
            edges = graph.edge_count(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// Canonical project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The walk stopped before covering the whole tree.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Canonical key for `path`, resolving relative paths against the root.
    #[must_use]
    pub fn key(&self, fs: &dyn FileSystem, path: &Path) -> PathBuf {
        if path.is_absolute() {
            fs.canonicalize(path)
        } else {
            fs.canonicalize(&self.root.join(path))
        }
    }

    /// Every indexed source file, sorted.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Indexed files classified as tests.
    #[must_use]
    pub fn test_files(&self, config: &AnalyzerConfig) -> Vec<&Path> {
        self.files().filter(|file| is_test_file(&self.root, file, config)).collect()
    }

    /// Files that import `target` directly, sorted.
    #[must_use]
    pub fn importers(&self, target: &Path) -> Vec<&Path> {
        self.reverse
            .get(target)
            .map(|set| set.iter().map(PathBuf::as_path).collect())
            .unwrap_or_default()
    }

    /// Files `importer` imports directly, sorted.
    #[must_use]
    pub fn imports_of(&self, importer: &Path) -> Vec<&Path> {
        self.forward
            .get(importer)
            .map(|targets| targets.keys().map(PathBuf::as_path).collect())
            .unwrap_or_default()
    }

    /// The import statements in `importer` that resolve to `target`.
    #[must_use]
    pub fn edge(&self, importer: &Path, target: &Path) -> &[ImportSpecifier] {
        self.forward
            .get(importer)
            .and_then(|targets| targets.get(target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of importer/target pairs.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeMap::len).sum()
    }

    /// Drops everything `path` contributed: its outgoing edges and its entry
    /// in the file set. If the file is gone from disk, importers that could
    /// resolve to it are re-resolved.
    pub fn invalidate_file(&mut self, fs: &dyn FileSystem, path: &Path) {
        let key = self.key(fs, path);
        self.remove_entry(&key);
        if !fs.is_file(&key) {
            self.reresolve_dependents(fs, &key);
        }
        tracing::debug!(file = %key.display(), "invalidated graph entry");
    }

    /// Re-indexes one file after it changed on disk.
    ///
    /// When the file appeared or disappeared, every importer whose relative
    /// specifiers could point at it is re-resolved too, so the result matches
    /// a full [`DependencyGraph::build`].
    pub fn rebuild_file(&mut self, fs: &dyn FileSystem, path: &Path) {
        let key = self.key(fs, path);
        let was_indexed = self.files.contains(&key);
        self.remove_entry(&key);
        let present = fs.is_file(&key) && is_source_file(&key);
        if present {
            self.index_file(fs, &key);
        }
        if was_indexed != present {
            self.reresolve_dependents(fs, &key);
        }
    }

    fn remove_entry(&mut self, key: &Path) {
        if let Some(targets) = self.forward.remove(key) {
            for target in targets.keys() {
                if let Some(importers) = self.reverse.get_mut(target) {
                    importers.remove(key);
                    if importers.is_empty() {
                        self.reverse.remove(target);
                    }
                }
            }
        }
        self.candidates.remove(key);
        self.files.remove(key);
    }

    /// Re-indexes the files whose relative imports consider `target`.
    fn reresolve_dependents(&mut self, fs: &dyn FileSystem, target: &Path) {
        let dependents: Vec<PathBuf> = self
            .candidates
            .iter()
            .filter(|(importer, paths)| importer.as_path() != target && paths.contains(target))
            .map(|(importer, _)| importer.clone())
            .collect();
        for importer in dependents {
            tracing::debug!(file = %importer.display(), changed = %target.display(), "re-resolving imports");
            self.remove_entry(&importer);
            self.index_file(fs, &importer);
        }
    }

    fn index_file(&mut self, fs: &dyn FileSystem, path: &Path) {
        let key = fs.canonicalize(path);
        let source = match fs.read_to_string(&key) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(file = %key.display(), error = %e, "skipping unreadable file");
                return;
            }
        };
        self.files.insert(key.clone());

        for import in extract_imports(&source) {
            if !resolve::is_relative(import.specifier()) {
                continue;
            }
            self.candidates
                .entry(key.clone())
                .or_default()
                .extend(resolve::candidate_paths(&key, import.specifier()));
            let Some(target) = resolve::resolve(fs, &key, import.specifier()) else {
                tracing::debug!(
                    file = %key.display(),
                    specifier = import.specifier(),
                    line = import.line(),
                    "unresolved relative import"
                );
                continue;
            };
            if target == key {
                continue;
            }
            self.reverse.entry(target.clone()).or_default().insert(key.clone());
            self.forward.entry(key.clone()).or_default().entry(target).or_default().push(import);
        }
    }
}

/// `path` is a test file: its name carries a test marker or one of its
/// directories (below `root`) is a test directory.
#[must_use]
pub fn is_test_file(root: &Path, path: &Path, config: &AnalyzerConfig) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if config.test_name_markers.iter().any(|marker| name.contains(marker.as_str())) {
        return true;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .any(|c| config.test_dir_names.iter().any(|d| c.as_os_str() == d.as_str()))
}
