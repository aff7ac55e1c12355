//! Pattern-based snapshot extraction for untyped JavaScript sources.
//!
//! Two passes run over comment- and string-masked text: a declarative pass for
//! `export` statements and an assignment pass for `module.exports` /
//! `exports.x` forms. Both feed the same export list, deduplicated by identity
//! key. Everything found here is best-effort; the differ marks findings derived
//! from it as heuristic.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::clean::{
    line_depths, matching_close, split_top_level, strip_comments, strip_comments_and_strings,
    LineIndex,
};
use super::{
    collapse_whitespace, ClassMeta, Export, ExportKind, ExportStyle, ExportType, FunctionMeta,
    Import, ModuleSystem, Param, ParseStatus, Snapshot, SourceLanguage, Symbol, SymbolKind,
    SymbolMeta,
};
use crate::graph::imports::{extract_imports, ImportSpecifier};

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(export[ \t]+(default[ \t]+)?)?(async[ \t]+)?(function\b(?:[ \t]*\*)?[ \t]*|(?:class|const|let|var)[ \t]+)([A-Za-z_$][\w$]*)",
    )
    .expect("declaration regex is valid")
});

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+default\s+").expect("export default regex is valid"));

static EXPORT_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s*\{").expect("export clause regex is valid"));

static EXPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bexport\s*\*\s*(?:as\s+([A-Za-z_$][\w$]*)\s*)?from\s*(['"])"#)
        .expect("export star regex is valid")
});

static MODULE_EXPORTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmodule\.exports\s*=([^=]|$)").expect("module.exports regex is valid")
});

static EXPORTS_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=([^=]|$)")
        .expect("exports property regex is valid")
});

static DEFINE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bObject\.defineProperty\(\s*(?:module\.)?exports\s*,\s*(['"])"#)
        .expect("defineProperty regex is valid")
});

static CLASS_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:static[ \t]+)?(?:async[ \t]+)?(?:\*[ \t]*)?(?:(?:get|set)[ \t]+)?([A-Za-z_$#][\w$]*)[ \t]*\(",
    )
    .expect("class method regex is valid")
});

static CLASS_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:static[ \t]+)?([A-Za-z_$#][\w$]*)[ \t]*(?:=[^=>]|;|$)")
        .expect("class field regex is valid")
});

static ESM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:^|;)\s*(?:import\s*[\w$*{'"]|export\s*(?:default|const|let|var|function|async|class|\{|\*|type|interface|enum|abstract|declare))"#,
    )
    .expect("esm token regex is valid")
});

static CJS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brequire\s*\(|\bmodule\.exports\b|\bexports\.[A-Za-z_$]|\bdefineProperty\(\s*exports\b")
        .expect("cjs token regex is valid")
});

const NOT_METHODS: &[&str] =
    &["if", "for", "while", "switch", "catch", "function", "return", "with", "constructor"];

/// Extracts the exported surface of an untyped source.
#[must_use]
pub fn extract(file_path: &str, source: &str) -> Snapshot {
    let language = SourceLanguage::from_path(std::path::Path::new(file_path))
        .unwrap_or(SourceLanguage::JavaScript);
    let text = Text::new(source);
    let balanced = text.masked.matches('{').count() == text.masked.matches('}').count();
    let status = if balanced {
        ParseStatus::Parsed
    } else {
        tracing::debug!(file = file_path, "unbalanced braces; extraction is best-effort");
        ParseStatus::Partial
    };
    let mut extractor = Extractor {
        text,
        locals: BTreeMap::new(),
        snapshot: Snapshot::empty(file_path, language, status),
    };
    extractor.declarations();
    extractor.default_expressions();
    extractor.export_clauses();
    extractor.export_stars();
    extractor.module_exports();
    extractor.exports_properties();
    extractor.imports(source);
    extractor.snapshot
}

/// Classifies a source as ESM, CommonJS, both, or neither by token scan.
#[must_use]
pub fn classify_module_system(source: &str) -> ModuleSystem {
    let masked = strip_comments_and_strings(source);
    let esm = ESM_TOKEN.is_match(&masked);
    let cjs = CJS_TOKEN.find_iter(&masked).any(|m| {
        // TypeScript `import x = require('y')` is ESM-side syntax.
        let line_start = masked[..m.start()].rfind('\n').map_or(0, |i| i + 1);
        !masked[line_start..m.start()].trim_start().starts_with("import")
    });
    match (esm, cjs) {
        (true, true) => ModuleSystem::Mixed,
        (true, false) => ModuleSystem::Esm,
        (false, true) => ModuleSystem::CommonJs,
        (false, false) => ModuleSystem::Unknown,
    }
}

/// The three aligned views of a source: original, comments blanked, and
/// comments plus literal contents blanked.
struct Text {
    code: String,
    masked: String,
    lines: LineIndex,
    depths: Vec<i32>,
}

impl Text {
    fn new(source: &str) -> Self {
        let masked = strip_comments_and_strings(source);
        let depths = line_depths(&masked);
        Self { code: strip_comments(source), lines: LineIndex::new(source), depths, masked }
    }

    fn at_top_level(&self, offset: usize) -> bool {
        let line = self.lines.line_of(offset);
        self.depths.get(line - 1).copied().unwrap_or(0) == 0
    }

    /// Comment-free source between two offsets, whitespace collapsed.
    fn code(&self, start: usize, end: usize) -> String {
        collapse_whitespace(self.code.get(start..end).unwrap_or(""))
    }

    /// Offset of the first non-whitespace byte at or after `from`.
    fn skip_ws(&self, from: usize) -> usize {
        let rest = &self.masked[from.min(self.masked.len())..];
        from + (rest.len() - rest.trim_start().len())
    }

    fn rest(&self, from: usize) -> &str {
        &self.masked[from.min(self.masked.len())..]
    }

    /// Literal text whose opening quote sits at `open`.
    fn literal_at(&self, open: usize) -> Option<String> {
        let quote = self.masked.get(open..=open)?;
        let close = open + 1 + self.masked[open + 1..].find(quote)?;
        self.code.get(open + 1..close).map(str::to_string)
    }

    fn identifier_at(&self, from: usize) -> Option<&str> {
        let rest = self.rest(from);
        let end = rest
            .char_indices()
            .find(|(i, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$' || (*i == 0 && *c == '#')))
            .map_or(rest.len(), |(i, _)| i);
        (end > 0 && !rest.starts_with(|c: char| c.is_ascii_digit())).then(|| &rest[..end])
    }
}

#[derive(Debug, Clone)]
struct Local {
    symbol: Symbol,
    export_kind: ExportKind,
}

struct Extractor {
    text: Text,
    locals: BTreeMap<String, Local>,
    snapshot: Snapshot,
}

impl Extractor {
    fn symbol(&self, name: &str, kind: SymbolKind, start: usize, signature: String, meta: SymbolMeta) -> Symbol {
        Symbol {
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind,
            line: self.text.lines.line_of(start),
            column: self.text.lines.column_of(start),
            signature,
            exported: false,
            meta,
        }
    }

    fn publish(&mut self, mut symbol: Symbol) {
        symbol.exported = true;
        self.snapshot.push_symbol(symbol);
    }

    fn export(&mut self, export: Export) {
        self.snapshot.push_export(export);
    }

    fn line_of(&self, offset: usize) -> usize {
        self.text.lines.line_of(offset)
    }

    /// Top-level `function`, `class` and `const/let/var` declarations, with
    /// their `export` / `export default` prefixes.
    fn declarations(&mut self) {
        let matches: Vec<_> = DECLARATION
            .captures_iter(&self.text.masked)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(5)?;
                let keyword = caps.get(4)?.as_str().trim().trim_end_matches('*').trim().to_string();
                Some((
                    whole.start() + (whole.as_str().len() - whole.as_str().trim_start().len()),
                    name.as_str().to_string(),
                    name.end(),
                    keyword,
                    caps.get(1).is_some(),
                    caps.get(2).is_some(),
                ))
            })
            .collect();

        for (start, name, after_name, keyword, exported, is_default) in matches {
            if !self.text.at_top_level(start) || name == "extends" {
                continue;
            }
            let Some(local) = self.declaration(start, &name, after_name, &keyword) else {
                continue;
            };
            if exported {
                let line = self.line_of(start);
                let export = if is_default {
                    default_export(line, local.export_kind, Some(name.clone()), ExportStyle::Declarative)
                } else {
                    named_export(&name, line, local.export_kind, ExportStyle::Declarative)
                };
                self.publish(local.symbol.clone());
                self.export(export);
            }
            self.locals.entry(name).or_insert(local);
        }
    }

    fn declaration(&self, start: usize, name: &str, after_name: usize, keyword: &str) -> Option<Local> {
        match keyword {
            "function" => {
                let (meta, body) = self.function_at(after_name)?;
                let signature = self.text.code(start, body);
                Some(Local {
                    symbol: self.symbol(name, SymbolKind::Function, start, signature, SymbolMeta::Function(meta)),
                    export_kind: ExportKind::Function,
                })
            }
            "class" => Some(self.class_at(start, name, after_name)),
            _ => Some(self.binding(start, name, after_name, keyword)),
        }
    }

    /// Parses the parameter list starting at or after `from`. Returns the
    /// metadata and the offset where the body (or arrow) begins.
    fn function_at(&self, from: usize) -> Option<(FunctionMeta, usize)> {
        let rest = self.text.rest(from);
        let idx = rest.find('(')?;
        // Only a name, `function`, `async` or `*` may sit before the list.
        if !rest[..idx].chars().all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '$' | '*')) {
            return None;
        }
        let open = from + idx;
        let close = matching_close(&self.text.masked, open)?;
        let params = parse_params(&self.text.masked[open + 1..close]);
        let head = &self.text.masked[..open];
        let is_async = head[head.rfind(['\n', ';', '=', '(']).map_or(0, |i| i + 1)..]
            .split_whitespace()
            .any(|w| w == "async");
        Some((FunctionMeta { params, return_type: None, is_async }, close + 1))
    }

    fn class_at(&self, start: usize, name: &str, after_name: usize) -> Local {
        let mut meta = ClassMeta::default();
        let open = self.text.rest(after_name).find('{').map(|i| after_name + i);
        let close = open.and_then(|o| matching_close(&self.text.masked, o));
        let mut signature_end = self.text.code.len();
        if let (Some(open), Some(close)) = (open, close) {
            signature_end = open;
            let body = &self.text.masked[open + 1..close];
            let depths = byte_depths(body);
            for caps in CLASS_METHOD.captures_iter(body) {
                let Some(member) = caps.get(1) else { continue };
                if depths.get(member.start()).copied().unwrap_or(1) != 0 || member.as_str().starts_with('#') {
                    continue;
                }
                let member_name = member.as_str();
                if member_name == "constructor" {
                    if meta.constructor.is_none() {
                        meta.constructor = self
                            .function_at(open + 1 + member.end())
                            .map(|(function, _)| function.params);
                    }
                } else if !NOT_METHODS.contains(&member_name)
                    && !meta.methods.iter().any(|m| m == member_name)
                {
                    meta.methods.push(member_name.to_string());
                }
            }
            for caps in CLASS_FIELD.captures_iter(body) {
                let Some(field) = caps.get(1) else { continue };
                let field_name = field.as_str();
                if depths.get(field.start()).copied().unwrap_or(1) == 0
                    && !field_name.starts_with('#')
                    && !matches!(field_name, "static" | "get" | "set" | "async")
                    && !meta.properties.iter().any(|p| p == field_name)
                {
                    meta.properties.push(field_name.to_string());
                }
            }
        }
        let signature = self.text.code(start, signature_end);
        Local {
            symbol: self.symbol(name, SymbolKind::Class, start, signature, SymbolMeta::Class(meta)),
            export_kind: ExportKind::Class,
        }
    }

    /// `const name = <value>` classified by the shape of its initializer.
    fn binding(&self, start: usize, name: &str, after_name: usize, keyword: &str) -> Local {
        let eq = self.text.skip_ws(after_name);
        let has_value = self.text.rest(eq).starts_with('=') && !self.text.rest(eq).starts_with("==");
        let value_start = self.text.skip_ws(eq + 1);
        let declaration_end = self.text.rest(start).find([';', '\n']).map_or(self.text.code.len(), |i| start + i);

        if has_value {
            match self.value_shape(value_start) {
                Shape::Function => {
                    if let Some((meta, body)) = self.function_at(value_start).or_else(|| self.single_param_arrow(value_start)) {
                        let signature = self.text.code(start, body);
                        return Local {
                            symbol: self.symbol(name, SymbolKind::Function, start, signature, SymbolMeta::Function(meta)),
                            export_kind: ExportKind::Function,
                        };
                    }
                }
                Shape::Class => {
                    let mut local = self.class_at(value_start, name, value_start + "class".len());
                    local.symbol.line = self.line_of(start);
                    local.symbol.column = self.text.lines.column_of(start);
                    return local;
                }
                Shape::Object => {
                    let signature = format!("{keyword} {name}");
                    return Local {
                        symbol: self.symbol(
                            name,
                            SymbolKind::Variable,
                            start,
                            signature,
                            SymbolMeta::Variable { declared_type: None },
                        ),
                        export_kind: ExportKind::Object,
                    };
                }
                Shape::Other => {}
            }
        }
        let signature = if has_value { format!("{keyword} {name}") } else { self.text.code(start, declaration_end) };
        Local {
            symbol: self.symbol(name, SymbolKind::Variable, start, signature, SymbolMeta::Variable { declared_type: None }),
            export_kind: ExportKind::Variable,
        }
    }

    fn single_param_arrow(&self, value_start: usize) -> Option<(FunctionMeta, usize)> {
        let mut at = value_start;
        if self.text.rest(at).starts_with("async") {
            at = self.text.skip_ws(at + "async".len());
        }
        let param = self.text.identifier_at(at)?;
        let arrow = self.text.skip_ws(at + param.len());
        self.text.rest(arrow).starts_with("=>").then(|| {
            (
                FunctionMeta {
                    params: vec![Param {
                        name: param.to_string(),
                        type_annotation: None,
                        optional: false,
                        has_default: false,
                        rest: false,
                    }],
                    return_type: None,
                    is_async: at != value_start,
                },
                arrow,
            )
        })
    }

    fn value_shape(&self, value_start: usize) -> Shape {
        let rest = self.text.rest(value_start);
        let unasync = rest.strip_prefix("async").map_or(rest, str::trim_start);
        if unasync.starts_with("function") {
            return Shape::Function;
        }
        if rest.starts_with("class") && !rest[5..].starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            return Shape::Class;
        }
        if rest.starts_with('{') {
            return Shape::Object;
        }
        if unasync.starts_with('(') {
            let open = value_start + (rest.len() - unasync.len());
            if let Some(close) = matching_close(&self.text.masked, open) {
                if self.text.rest(self.text.skip_ws(close + 1)).starts_with("=>") {
                    return Shape::Function;
                }
            }
            return Shape::Other;
        }
        if self.single_param_arrow(value_start).is_some() {
            return Shape::Function;
        }
        Shape::Other
    }

    /// `export default <expression>` forms not covered by declarations.
    fn default_expressions(&mut self) {
        let starts: Vec<(usize, usize)> = EXPORT_DEFAULT
            .find_iter(&self.text.masked)
            .map(|m| (m.start(), m.end()))
            .collect();
        for (start, value_start) in starts {
            if self.snapshot.exports.iter().any(|e| e.export_type == ExportType::Default) {
                return;
            }
            let line = self.line_of(start);
            let rest = self.text.rest(value_start);
            let unasync = rest.strip_prefix("async").map_or(rest, str::trim_start);

            if unasync.starts_with("function") || matches!(self.value_shape(value_start), Shape::Function) {
                if let Some((meta, body)) =
                    self.function_at(value_start).or_else(|| self.single_param_arrow(value_start))
                {
                    let signature = self.text.code(start, body);
                    let symbol = self.symbol("default", SymbolKind::Function, start, signature, SymbolMeta::Function(meta));
                    self.publish(symbol);
                }
                self.export(default_export(line, ExportKind::Function, None, ExportStyle::Declarative));
            } else if rest.starts_with("class") {
                let local = self.class_at(start, "default", value_start + "class".len());
                self.publish(local.symbol);
                self.export(default_export(line, ExportKind::Class, None, ExportStyle::Declarative));
            } else if rest.starts_with('{') {
                self.export(default_export(line, ExportKind::Object, None, ExportStyle::Declarative));
            } else if let Some(ident) = self.text.identifier_at(value_start).map(str::to_string) {
                let kind = self.reference(&ident);
                self.export(default_export(line, kind, Some(ident), ExportStyle::Declarative));
            } else {
                self.export(default_export(line, ExportKind::Unknown, None, ExportStyle::Declarative));
            }
        }
    }

    /// Publishes the local `name` refers to and returns its export kind.
    fn reference(&mut self, name: &str) -> ExportKind {
        match self.locals.get(name).cloned() {
            Some(local) => {
                self.publish(local.symbol);
                local.export_kind
            }
            None => ExportKind::Unknown,
        }
    }

    /// `export { a, b as c }` and `export { a } from './x'`.
    fn export_clauses(&mut self) {
        let opens: Vec<(usize, usize)> = EXPORT_CLAUSE
            .find_iter(&self.text.masked)
            .map(|m| (m.start(), m.end() - 1))
            .collect();
        for (start, open) in opens {
            let Some(close) = matching_close(&self.text.masked, open) else {
                continue;
            };
            let line = self.line_of(start);
            let after = self.text.skip_ws(close + 1);
            let source_module = self
                .text
                .rest(after)
                .strip_prefix("from")
                .and_then(|_| {
                    let quote = self.text.skip_ws(after + "from".len());
                    self.text.literal_at(quote)
                });

            let list = self.text.masked[open + 1..close].to_string();
            for (_, part) in split_top_level(&list) {
                let mut words = part.split_whitespace();
                let Some(local) = words.next().map(str::to_string) else { continue };
                let public = match (words.next(), words.next()) {
                    (Some("as"), Some(alias)) => alias.to_string(),
                    _ => local.clone(),
                };
                let kind = if source_module.is_some() { ExportKind::Unknown } else { self.reference(&local) };
                let export = if public == "default" {
                    let mut export = default_export(line, kind, Some(local), ExportStyle::Declarative);
                    export.source_module.clone_from(&source_module);
                    export
                } else {
                    let mut export = named_export(&public, line, kind, ExportStyle::Declarative);
                    export.source_module.clone_from(&source_module);
                    if public != local {
                        export.source_name = Some(local);
                    }
                    export
                };
                self.export(export);
            }
        }
    }

    fn export_stars(&mut self) {
        let found: Vec<(usize, Option<String>, usize)> = EXPORT_STAR
            .captures_iter(&self.text.masked)
            .filter_map(|caps| {
                Some((caps.get(0)?.start(), caps.get(1).map(|m| m.as_str().to_string()), caps.get(2)?.start()))
            })
            .collect();
        for (start, alias, quote) in found {
            let Some(module) = self.text.literal_at(quote) else { continue };
            let line = self.line_of(start);
            let mut export = named_export(alias.as_deref().unwrap_or("*"), line, ExportKind::Star, ExportStyle::Declarative);
            if alias.is_some() {
                export.source_name = Some("*".to_string());
            }
            export.source_module = Some(module);
            self.export(export);
        }
    }

    /// `module.exports = ...`: an object literal exposes each key as a named
    /// export; anything else is the module's default.
    fn module_exports(&mut self) {
        let found: Vec<(usize, usize)> = MODULE_EXPORTS
            .captures_iter(&self.text.masked)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps.get(1).map_or(whole.end(), |v| v.start());
                Some((whole.start(), value))
            })
            .collect();
        for (start, value) in found {
            let value_start = self.text.skip_ws(value);
            let line = self.line_of(start);
            if self.text.rest(value_start).starts_with('{') {
                self.object_keys(value_start);
                continue;
            }
            let (kind, source_name) = self.assigned_value(value_start, "default", start);
            self.export(default_export(line, kind, source_name, ExportStyle::Assignment));
        }
    }

    fn object_keys(&mut self, open: usize) {
        let Some(close) = matching_close(&self.text.masked, open) else {
            return;
        };
        let inner = self.text.masked[open + 1..close].to_string();
        for (offset, part) in split_top_level(&inner) {
            let lead = part.len() - part.trim_start().len();
            let key_start = open + 1 + offset + lead;
            let trimmed = part.trim();
            if trimmed.starts_with("...") {
                continue;
            }
            let key = if trimmed.starts_with(['\'', '"']) {
                self.text.literal_at(key_start)
            } else {
                self.text
                    .identifier_at(key_start)
                    .map(str::to_string)
                    .or_else(|| trimmed.strip_prefix("async").and_then(|_| {
                        self.text.identifier_at(self.text.skip_ws(key_start + "async".len())).map(str::to_string)
                    }))
            };
            let Some(key) = key else { continue };
            let line = self.line_of(key_start);

            let kind = match trimmed.find(':') {
                Some(colon) if !trimmed[..colon].contains('(') => {
                    let value_start = self.text.skip_ws(key_start + colon + 1);
                    self.assigned_value(value_start, &key, key_start).0
                }
                _ if trimmed.contains('(') => {
                    if let Some((meta, body)) = self.function_at(key_start) {
                        let signature = self.text.code(key_start, body);
                        let symbol = self.symbol(&key, SymbolKind::Function, key_start, signature, SymbolMeta::Function(meta));
                        self.publish(symbol);
                    }
                    ExportKind::Function
                }
                _ => self.reference(&key),
            };
            self.export(named_export(&key, line, kind, ExportStyle::Assignment));
        }
    }

    /// Classifies an assigned value and publishes the symbol it defines or
    /// references. Returns the export kind and the referenced local name.
    fn assigned_value(&mut self, value_start: usize, name: &str, anchor: usize) -> (ExportKind, Option<String>) {
        match self.value_shape(value_start) {
            Shape::Function => {
                if let Some((meta, body)) =
                    self.function_at(value_start).or_else(|| self.single_param_arrow(value_start))
                {
                    let function_name = self
                        .text
                        .rest(value_start)
                        .strip_prefix("function")
                        .and_then(|_| self.text.identifier_at(self.text.skip_ws(value_start + "function".len())))
                        .map_or_else(|| name.to_string(), str::to_string);
                    let signature = self.text.code(anchor, body);
                    let symbol = self.symbol(&function_name, SymbolKind::Function, anchor, signature, SymbolMeta::Function(meta));
                    self.publish(symbol);
                }
                (ExportKind::Function, None)
            }
            Shape::Class => {
                let class_name = self
                    .text
                    .identifier_at(self.text.skip_ws(value_start + "class".len()))
                    .filter(|n| *n != "extends")
                    .map_or_else(|| name.to_string(), str::to_string);
                let local = self.class_at(anchor, &class_name, value_start + "class".len());
                self.publish(local.symbol);
                (ExportKind::Class, None)
            }
            Shape::Object => (ExportKind::Object, None),
            Shape::Other => match self.text.identifier_at(value_start).map(str::to_string) {
                Some(ident) if self.ends_expression(value_start + ident.len()) => {
                    (self.reference(&ident), Some(ident))
                }
                _ => (ExportKind::Unknown, None),
            },
        }
    }

    fn ends_expression(&self, at: usize) -> bool {
        let rest = self.text.rest(at);
        let trimmed = rest.trim_start_matches([' ', '\t']);
        trimmed.is_empty() || trimmed.starts_with([';', '\n', '\r', ',', '}'])
    }

    /// `exports.x = ...`, `module.exports.x = ...` and
    /// `Object.defineProperty(exports, 'x', ...)`.
    fn exports_properties(&mut self) {
        let found: Vec<(usize, String, usize)> = EXPORTS_PROPERTY
            .captures_iter(&self.text.masked)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps.get(2).map_or(whole.end(), |v| v.start());
                Some((whole.start(), caps.get(1)?.as_str().to_string(), value))
            })
            .collect();
        for (start, name, value) in found {
            let line = self.line_of(start);
            let value_start = self.text.skip_ws(value);
            let (kind, source_name) = self.assigned_value(value_start, &name, start);
            let export = if name == "default" {
                default_export(line, kind, source_name, ExportStyle::Assignment)
            } else {
                let mut export = named_export(&name, line, kind, ExportStyle::Assignment);
                export.source_name = source_name.filter(|s| *s != name);
                export
            };
            self.export(export);
        }

        let defined: Vec<(usize, usize)> = DEFINE_PROPERTY
            .captures_iter(&self.text.masked)
            .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.start())))
            .collect();
        for (start, quote) in defined {
            let Some(name) = self.text.literal_at(quote) else { continue };
            if name == "__esModule" {
                continue;
            }
            let line = self.line_of(start);
            let export = if name == "default" {
                default_export(line, ExportKind::Unknown, None, ExportStyle::Assignment)
            } else {
                named_export(&name, line, ExportKind::Unknown, ExportStyle::Assignment)
            };
            self.export(export);
        }
    }

    fn imports(&mut self, source: &str) {
        for import in extract_imports(source) {
            let (type_only, keep) = match &import {
                ImportSpecifier::Static { type_only, reexport, .. } => (*type_only, !reexport),
                ImportSpecifier::Require { .. } => (false, true),
                ImportSpecifier::DynamicCall { .. } => (false, false),
            };
            if keep {
                self.snapshot.imports.push(Import {
                    module: import.specifier().to_string(),
                    names: import.names().to_vec(),
                    line: import.line(),
                    type_only,
                });
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Function,
    Class,
    Object,
    Other,
}

/// Brace depth before every byte of `text`.
fn byte_depths(text: &str) -> Vec<i32> {
    let mut depths = Vec::with_capacity(text.len());
    let mut depth = 0;
    for byte in text.bytes() {
        depths.push(depth);
        match byte {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => {}
        }
    }
    depths
}

/// Parses an untyped parameter list.
fn parse_params(list: &str) -> Vec<Param> {
    split_top_level(list)
        .into_iter()
        .map(|(_, part)| {
            let part = part.trim();
            let rest = part.starts_with("...");
            let body = part.trim_start_matches("...");
            let default_at = top_level_assignment(body);
            let name = default_at.map_or(body, |i| &body[..i]).trim();
            Param {
                name: collapse_whitespace(name),
                type_annotation: None,
                optional: false,
                has_default: default_at.is_some(),
                rest,
            }
        })
        .collect()
}

/// Offset of a top-level `=` that is not part of `=>`, `==` or `>=`.
fn top_level_assignment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => depth -= 1,
            b'=' if depth == 0 => {
                let next = bytes.get(i + 1).copied();
                let prev = i.checked_sub(1).and_then(|p| bytes.get(p)).copied();
                if next != Some(b'>') && next != Some(b'=') && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn named_export(name: &str, line: usize, kind: ExportKind, style: ExportStyle) -> Export {
    Export {
        name: name.to_string(),
        export_type: ExportType::Named,
        kind,
        line,
        source_name: None,
        source_module: None,
        style,
    }
}

fn default_export(line: usize, kind: ExportKind, source_name: Option<String>, style: ExportStyle) -> Export {
    Export {
        name: "default".to_string(),
        export_type: ExportType::Default,
        kind,
        line,
        source_name,
        source_module: None,
        style,
    }
}
