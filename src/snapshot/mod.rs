//! Structural snapshots of a file's exported surface.
//!
//! A [`Snapshot`] is built independently for the before and after text of a
//! file and never mutated afterwards. Typed sources are walked through a
//! tree-sitter syntax tree; untyped sources go through pattern extraction.

pub mod clean;
pub mod heuristic;
pub mod language;
pub mod manifest;
pub mod typed;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{AnalyzerConfig, DEFAULT_MAX_FILE_BYTES};

pub use language::SourceLanguage;
pub use manifest::{ManifestType, PackageManifest};

/// Kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    /// A function declaration or a function-valued binding.
    Function,
    /// A class declaration.
    Class,
    /// A TypeScript interface.
    Interface,
    /// A TypeScript type alias.
    Type,
    /// An enum.
    Enum,
    /// A `const`/`let`/`var` binding that is not a function.
    Variable,
    /// A class method.
    Method,
}

impl SymbolKind {
    /// Lowercase label used in messages and rule names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Type => "type alias",
            Self::Enum => "enum",
            Self::Variable => "variable",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One formal parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Binding name (or the destructuring pattern text).
    pub name: String,
    /// Declared type, without the leading colon.
    pub type_annotation: Option<String>,
    /// Marked optional with `?`.
    pub optional: bool,
    /// Has a default value.
    pub has_default: bool,
    /// Is a rest parameter (`...args`).
    pub rest: bool,
}

impl Param {
    /// A caller must supply this argument.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.optional && !self.has_default && !self.rest
    }
}

/// Function-specific structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionMeta {
    /// Formal parameters in order.
    pub params: Vec<Param>,
    /// Declared return type, without the leading colon.
    pub return_type: Option<String>,
    /// Declared `async`.
    pub is_async: bool,
}

impl FunctionMeta {
    /// Number of declared parameters, rest included.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The last parameter is a rest parameter.
    #[must_use]
    pub fn has_rest(&self) -> bool {
        self.params.iter().any(|p| p.rest)
    }
}

/// Class-specific structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassMeta {
    /// Public method names (constructor excluded).
    pub methods: Vec<String>,
    /// Constructor parameters, if the class declares a constructor.
    pub constructor: Option<Vec<Param>>,
    /// Public field names.
    pub properties: Vec<String>,
}

impl ClassMeta {
    /// The class declares an explicit constructor.
    #[must_use]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }
}

/// One interface member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Member name.
    pub name: String,
    /// Marked optional with `?`.
    pub optional: bool,
    /// Declared type (for methods, the call signature text).
    pub type_annotation: Option<String>,
}

/// Interface-specific structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceMeta {
    /// Members in declaration order.
    pub properties: Vec<Property>,
}

/// Kind-specific metadata carried by a [`Symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SymbolMeta {
    /// Function parameters and return type.
    Function(FunctionMeta),
    /// Class members.
    Class(ClassMeta),
    /// Interface members.
    Interface(InterfaceMeta),
    /// Normalized right-hand side of a type alias.
    TypeAlias {
        /// Definition text with whitespace collapsed.
        definition: String,
    },
    /// Enum member names.
    Enum {
        /// Member names in declaration order.
        members: Vec<String>,
    },
    /// Variable binding.
    Variable {
        /// Declared type, if annotated.
        declared_type: Option<String>,
    },
}

/// One exported declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Local name (`default` for anonymous default exports).
    pub name: String,
    /// Name qualified by its container, e.g. `Widget.render`.
    pub qualified_name: String,
    /// Declaration kind.
    pub kind: SymbolKind,
    /// 1-based declaration line.
    pub line: usize,
    /// 0-based declaration column.
    pub column: usize,
    /// Header text of the declaration with whitespace collapsed.
    pub signature: String,
    /// Part of the module's export surface.
    pub exported: bool,
    /// Kind-specific structure.
    pub meta: SymbolMeta,
}

impl Symbol {
    /// Function metadata, for functions.
    #[must_use]
    pub fn function(&self) -> Option<&FunctionMeta> {
        match &self.meta {
            SymbolMeta::Function(meta) => Some(meta),
            _ => None,
        }
    }

    /// Class metadata, for classes.
    #[must_use]
    pub fn class(&self) -> Option<&ClassMeta> {
        match &self.meta {
            SymbolMeta::Class(meta) => Some(meta),
            _ => None,
        }
    }

    /// Interface metadata, for interfaces.
    #[must_use]
    pub fn interface(&self) -> Option<&InterfaceMeta> {
        match &self.meta {
            SymbolMeta::Interface(meta) => Some(meta),
            _ => None,
        }
    }
}

/// Whether an export is the module's default or a named binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportType {
    /// `export { x }`, `export const x`, `exports.x = ...`
    Named,
    /// `export default ...`, `module.exports = ...`
    Default,
}

/// What an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    /// A function.
    Function,
    /// A class.
    Class,
    /// An object literal.
    Object,
    /// Any other value binding.
    Variable,
    /// A TypeScript interface.
    Interface,
    /// A TypeScript type alias.
    TypeAlias,
    /// An enum.
    Enum,
    /// `export * from` or `export * as ns from`.
    Star,
    /// Could not be determined.
    Unknown,
}

impl ExportKind {
    /// Export kind matching a declaration kind.
    #[must_use]
    pub fn from_symbol(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Function | SymbolKind::Method => Self::Function,
            SymbolKind::Class => Self::Class,
            SymbolKind::Interface => Self::Interface,
            SymbolKind::Type => Self::TypeAlias,
            SymbolKind::Enum => Self::Enum,
            SymbolKind::Variable => Self::Variable,
        }
    }
}

/// Syntax family an export was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportStyle {
    /// `export` statements.
    Declarative,
    /// `module.exports` / `exports.x` assignments.
    Assignment,
}

/// One entry of a module's export surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    /// Public-facing name (`default` for default exports, `*` for bare star
    /// re-exports).
    pub name: String,
    /// Named or default.
    pub export_type: ExportType,
    /// What the export refers to.
    pub kind: ExportKind,
    /// 1-based line of the export statement.
    pub line: usize,
    /// Local name before aliasing, when it differs from `name`.
    pub source_name: Option<String>,
    /// Module specifier for re-exports.
    pub source_module: Option<String>,
    /// Declarative or assignment-based.
    pub style: ExportStyle,
}

/// Identity of an export across snapshots.
///
/// Kind is deliberately excluded: a function that becomes an object under the
/// same name is a modification, not a removal plus an addition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportKey {
    /// Named or default.
    pub export_type: ExportType,
    /// Public-facing name.
    pub name: String,
    /// Re-export source.
    pub source_module: Option<String>,
}

impl Export {
    /// The identity key `(type, name, source_module)`.
    #[must_use]
    pub fn key(&self) -> ExportKey {
        ExportKey {
            export_type: self.export_type,
            name: self.name.clone(),
            source_module: self.source_module.clone(),
        }
    }

    /// The name a consumer sees in source: the local name for default exports,
    /// the public name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match (self.export_type, &self.source_name) {
            (ExportType::Default, Some(local)) => local,
            _ => &self.name,
        }
    }

    /// Exported under a different name than its local binding.
    #[must_use]
    pub fn is_aliased(&self) -> bool {
        self.export_type == ExportType::Named
            && self.source_name.as_deref().is_some_and(|local| local != self.name)
    }
}

/// One name bound by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    /// Name in the exporting module (`default`, `*` for namespaces).
    pub imported: String,
    /// Local binding.
    pub local: String,
}

/// One import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Module specifier as written.
    pub module: String,
    /// Bound names.
    pub names: Vec<ImportedName>,
    /// 1-based line.
    pub line: usize,
    /// `import type`.
    pub type_only: bool,
}

/// Module system a file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleSystem {
    /// `import`/`export` only.
    Esm,
    /// `require`/`module.exports` only.
    CommonJs,
    /// Both styles appear.
    Mixed,
    /// Neither style appears.
    Unknown,
}

impl fmt::Display for ModuleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Esm => "ESM",
            Self::CommonJs => "CommonJS",
            Self::Mixed => "mixed ESM/CommonJS",
            Self::Unknown => "unknown",
        })
    }
}

/// How much of the file was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseStatus {
    /// Parsed without syntax errors.
    Parsed,
    /// Parsed with recoverable syntax errors; extraction is best-effort.
    Partial,
    /// Could not be analyzed; the snapshot is empty.
    Failed,
}

/// Structural capture of one file at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Path the content belongs to.
    pub file_path: String,
    /// Capture time, stamped by the caller.
    pub taken_at: Option<DateTime<Utc>>,
    /// Source language.
    pub language: SourceLanguage,
    /// Parse outcome.
    pub parse_status: ParseStatus,
    /// Hash of the source text.
    pub fingerprint: u64,
    /// Exported functions.
    pub functions: Vec<Symbol>,
    /// Exported classes.
    pub classes: Vec<Symbol>,
    /// Exported interfaces.
    pub interfaces: Vec<Symbol>,
    /// Exported type aliases.
    pub type_aliases: Vec<Symbol>,
    /// Exported enums.
    pub enums: Vec<Symbol>,
    /// Exported non-function bindings.
    pub variables: Vec<Symbol>,
    /// Export surface.
    pub exports: Vec<Export>,
    /// Import statements.
    pub imports: Vec<Import>,
    /// Module system classification.
    pub module_system: ModuleSystem,
    /// Companion `package.json`, when supplied.
    pub manifest: Option<PackageManifest>,
}

impl Snapshot {
    /// An empty snapshot for `file_path`.
    #[must_use]
    pub fn empty(file_path: &str, language: SourceLanguage, parse_status: ParseStatus) -> Self {
        Self {
            file_path: file_path.to_string(),
            taken_at: None,
            language,
            parse_status,
            fingerprint: 0,
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            type_aliases: Vec::new(),
            enums: Vec::new(),
            variables: Vec::new(),
            exports: Vec::new(),
            imports: Vec::new(),
            module_system: ModuleSystem::Unknown,
            manifest: None,
        }
    }

    /// Sets the capture time.
    #[must_use]
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.taken_at = Some(at);
        self
    }

    /// All symbols, in kind order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.functions
            .iter()
            .chain(&self.classes)
            .chain(&self.interfaces)
            .chain(&self.type_aliases)
            .chain(&self.enums)
            .chain(&self.variables)
    }

    /// Symbols of one kind.
    #[must_use]
    pub fn symbols_of(&self, kind: SymbolKind) -> &[Symbol] {
        match kind {
            SymbolKind::Function | SymbolKind::Method => &self.functions,
            SymbolKind::Class => &self.classes,
            SymbolKind::Interface => &self.interfaces,
            SymbolKind::Type => &self.type_aliases,
            SymbolKind::Enum => &self.enums,
            SymbolKind::Variable => &self.variables,
        }
    }

    /// Looks up a symbol by local name across all kinds.
    #[must_use]
    pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols().find(|s| s.name == name)
    }

    /// The file could not be analyzed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.parse_status == ParseStatus::Failed
    }

    /// Adds a symbol to the list for its kind, ignoring duplicates of the same
    /// `(kind, qualified_name)` identity.
    pub fn push_symbol(&mut self, symbol: Symbol) {
        let list = match symbol.kind {
            SymbolKind::Function | SymbolKind::Method => &mut self.functions,
            SymbolKind::Class => &mut self.classes,
            SymbolKind::Interface => &mut self.interfaces,
            SymbolKind::Type => &mut self.type_aliases,
            SymbolKind::Enum => &mut self.enums,
            SymbolKind::Variable => &mut self.variables,
        };
        if !list.iter().any(|s| s.qualified_name == symbol.qualified_name) {
            list.push(symbol);
        }
    }

    /// Adds an export unless one with the same identity key exists.
    pub fn push_export(&mut self, export: Export) {
        let key = export.key();
        if !self.exports.iter().any(|e| e.key() == key) {
            self.exports.push(export);
        }
    }
}

/// Builds snapshots from source text.
///
/// Building is a pure function of the inputs; nothing is read from disk.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    max_file_bytes: usize,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self { max_file_bytes: DEFAULT_MAX_FILE_BYTES }
    }
}

impl SnapshotBuilder {
    /// Creates a builder honoring the configured size limit.
    #[must_use]
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self { max_file_bytes: config.max_file_bytes }
    }

    /// Builds a snapshot of `source` as the content of `file_path`.
    #[must_use]
    pub fn build(&self, file_path: &str, source: &str) -> Snapshot {
        self.build_with_manifest(file_path, source, None)
    }

    /// Builds a snapshot and attaches the companion `package.json` text.
    ///
    /// Never fails: sources that cannot be analyzed produce an empty snapshot
    /// with [`ParseStatus::Failed`].
    #[must_use]
    pub fn build_with_manifest(
        &self,
        file_path: &str,
        source: &str,
        manifest: Option<&str>,
    ) -> Snapshot {
        let language =
            SourceLanguage::from_path(Path::new(file_path)).unwrap_or(SourceLanguage::JavaScript);
        let _span = tracing::debug_span!("snapshot", file = file_path, ?language).entered();

        let mut snapshot = if source.len() > self.max_file_bytes {
            tracing::warn!(
                file = file_path,
                bytes = source.len(),
                limit = self.max_file_bytes,
                "source exceeds size limit; treating as unanalyzable"
            );
            Snapshot::empty(file_path, language, ParseStatus::Failed)
        } else if language.is_typed() {
            typed::extract(file_path, source, language)
        } else {
            heuristic::extract(file_path, source)
        };

        if !snapshot.is_failed() {
            snapshot.module_system = heuristic::classify_module_system(source);
        }
        snapshot.fingerprint = fingerprint(source);
        snapshot.manifest = manifest.and_then(PackageManifest::parse);
        tracing::debug!(
            exports = snapshot.exports.len(),
            status = ?snapshot.parse_status,
            "snapshot built"
        );
        snapshot
    }
}

/// Builds a snapshot with default limits.
#[must_use]
pub fn build_snapshot(file_path: &str, source: &str) -> Snapshot {
    SnapshotBuilder::default().build(file_path, source)
}

/// Stable hash of source text.
#[must_use]
pub fn fingerprint(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// Collapses runs of whitespace to single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_and_untyped_paths_share_shape() {
        let ts = build_snapshot("src/a.ts", "export function foo(a: string): void {}\n");
        let js = build_snapshot("src/a.js", "export function foo(a) {}\n");
        assert_eq!(ts.functions.len(), 1);
        assert_eq!(js.functions.len(), 1);
        assert_eq!(ts.exports[0].key(), js.exports[0].key());
    }

    #[test]
    fn oversized_source_is_unanalyzable() {
        let builder = SnapshotBuilder { max_file_bytes: 8 };
        let snapshot = builder.build("src/a.ts", "export const value = 1;");
        assert!(snapshot.is_failed());
        assert!(snapshot.exports.is_empty());
    }

    #[test]
    fn identical_text_has_identical_fingerprint() {
        let a = build_snapshot("src/a.js", "module.exports = {};");
        let b = build_snapshot("src/a.js", "module.exports = {};");
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a, b);
    }

    #[test]
    fn manifest_is_attached_when_supplied() {
        let snapshot = SnapshotBuilder::default().build_with_manifest(
            "src/index.js",
            "",
            Some(r#"{"type": "module", "exports": "./src/index.js"}"#),
        );
        let manifest = snapshot.manifest.unwrap();
        assert_eq!(manifest.module_type, ManifestType::Module);
        assert!(manifest.has_exports_map());
    }

    #[test]
    fn aliased_export_reports_alias() {
        let export = Export {
            name: "bar".to_string(),
            export_type: ExportType::Named,
            kind: ExportKind::Function,
            line: 1,
            source_name: Some("foo".to_string()),
            source_module: None,
            style: ExportStyle::Declarative,
        };
        assert!(export.is_aliased());
        assert_eq!(export.display_name(), "bar");
    }
}
