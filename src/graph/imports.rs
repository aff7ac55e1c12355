//! Import specifier extraction shared by the graph builder, the heuristic
//! snapshot path and the test affinity resolver.
//!
//! Patterns run over text with comments and literal contents blanked, so
//! commented-out imports and import-like strings never match. The specifier
//! itself is then read from the comment-stripped text at the same offsets.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::snapshot::clean::{strip_comments, strip_comments_and_strings, LineIndex};
use crate::snapshot::ImportedName;

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+(type\s+)?([\w$*{},\s]+?)\s*\bfrom\s*(['"])"#)
        .expect("static import regex is valid")
});

static SIDE_EFFECT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*(['"])"#).expect("side-effect import regex is valid")
});

static REEXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bexport\s+(type\s+)?(\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*(['"])"#)
        .expect("re-export regex is valid")
});

static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*(['"`])"#).expect("dynamic import regex is valid")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:\b(?:const|let|var|import)\s+([\w$]+|\{[^}]*\})\s*=\s*)?\brequire\s*\(\s*(['"])"#,
    )
    .expect("require regex is valid")
});

/// One module reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSpecifier {
    /// `import ... from 'x'`, `import 'x'`, `export ... from 'x'`.
    Static {
        /// Module specifier as written.
        specifier: String,
        /// 1-based line.
        line: usize,
        /// `import type` / `export type`.
        type_only: bool,
        /// An `export ... from` re-export rather than an import.
        reexport: bool,
        /// Bound names (`default`, `*` or a named export).
        names: Vec<ImportedName>,
    },
    /// `import('x')` with a literal argument.
    DynamicCall {
        /// Module specifier as written.
        specifier: String,
        /// 1-based line.
        line: usize,
    },
    /// `require('x')`.
    Require {
        /// Module specifier as written.
        specifier: String,
        /// 1-based line.
        line: usize,
        /// Bound names; a whole-module binding is recorded as `*`.
        names: Vec<ImportedName>,
    },
}

impl ImportSpecifier {
    /// Module specifier as written.
    #[must_use]
    pub fn specifier(&self) -> &str {
        match self {
            Self::Static { specifier, .. }
            | Self::DynamicCall { specifier, .. }
            | Self::Require { specifier, .. } => specifier,
        }
    }

    /// 1-based line of the reference.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Static { line, .. } | Self::DynamicCall { line, .. } | Self::Require { line, .. } => {
                *line
            }
        }
    }

    /// Names bound by the reference; empty for side-effect and dynamic imports.
    #[must_use]
    pub fn names(&self) -> &[ImportedName] {
        match self {
            Self::Static { names, .. } | Self::Require { names, .. } => names,
            Self::DynamicCall { .. } => &[],
        }
    }

    /// The specifier is a relative path (`./` or `../`).
    #[must_use]
    pub fn is_relative(&self) -> bool {
        let specifier = self.specifier();
        specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".."
    }

    /// The reference binds `name` from its module, either directly or through
    /// a namespace or whole-module binding.
    #[must_use]
    pub fn binds(&self, name: &str) -> bool {
        self.names().iter().any(|n| n.imported == name || n.imported == "*")
    }
}

/// Extracts every import, re-export, dynamic import and `require` call from
/// `source`, in source order.
#[must_use]
pub fn extract_imports(source: &str) -> Vec<ImportSpecifier> {
    let code = strip_comments(source);
    let masked = strip_comments_and_strings(source);
    let lines = LineIndex::new(source);
    let mut found: Vec<(usize, ImportSpecifier)> = Vec::new();

    for caps in STATIC_IMPORT.captures_iter(&masked) {
        let Some(specifier) = quoted_at(&code, &masked, &caps, 3) else {
            continue;
        };
        let start = caps.get(0).map_or(0, |m| m.start());
        found.push((
            start,
            ImportSpecifier::Static {
                specifier,
                line: lines.line_of(start),
                type_only: caps.get(1).is_some(),
                reexport: false,
                names: caps.get(2).map(|c| import_clause(c.as_str())).unwrap_or_default(),
            },
        ));
    }

    for caps in SIDE_EFFECT_IMPORT.captures_iter(&masked) {
        let Some(specifier) = quoted_at(&code, &masked, &caps, 1) else {
            continue;
        };
        let start = caps.get(0).map_or(0, |m| m.start());
        found.push((
            start,
            ImportSpecifier::Static {
                specifier,
                line: lines.line_of(start),
                type_only: false,
                reexport: false,
                names: Vec::new(),
            },
        ));
    }

    for caps in REEXPORT.captures_iter(&masked) {
        let Some(specifier) = quoted_at(&code, &masked, &caps, 3) else {
            continue;
        };
        let start = caps.get(0).map_or(0, |m| m.start());
        let names = caps.get(2).map(|c| reexport_clause(c.as_str())).unwrap_or_default();
        found.push((
            start,
            ImportSpecifier::Static {
                specifier,
                line: lines.line_of(start),
                type_only: caps.get(1).is_some(),
                reexport: true,
                names,
            },
        ));
    }

    for caps in DYNAMIC_IMPORT.captures_iter(&masked) {
        let Some(specifier) = quoted_at(&code, &masked, &caps, 1) else {
            continue;
        };
        if specifier.contains("${") {
            continue;
        }
        let start = caps.get(0).map_or(0, |m| m.start());
        found.push((start, ImportSpecifier::DynamicCall { specifier, line: lines.line_of(start) }));
    }

    for caps in REQUIRE.captures_iter(&masked) {
        let Some(specifier) = quoted_at(&code, &masked, &caps, 2) else {
            continue;
        };
        let start = caps.get(0).map_or(0, |m| m.start());
        let names = caps.get(1).map(|b| require_binding(b.as_str())).unwrap_or_default();
        found.push((
            start,
            ImportSpecifier::Require { specifier, line: lines.line_of(start), names },
        ));
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, import)| import).collect()
}

/// Reads the literal whose opening quote is capture group `group`.
fn quoted_at(code: &str, masked: &str, caps: &Captures<'_>, group: usize) -> Option<String> {
    let quote = caps.get(group)?;
    let open = quote.start();
    let quote_char = quote.as_str();
    let close = open + 1 + masked[open + 1..].find(quote_char)?;
    let literal = code.get(open + 1..close)?;
    (!literal.is_empty()).then(|| literal.to_string())
}

/// Parses `def, { a, b as c }` or `* as ns` into bound names.
fn import_clause(clause: &str) -> Vec<ImportedName> {
    let mut names = Vec::new();
    let clause = clause.trim();
    let (outside, braces) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            (format!("{} {}", &clause[..open], &clause[close + 1..]), Some(&clause[open + 1..close]))
        }
        _ => (clause.to_string(), None),
    };
    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(ns) = part.strip_prefix('*') {
            let local = ns.trim().trim_start_matches("as").trim();
            if !local.is_empty() {
                names.push(name("*", local));
            }
        } else if is_identifier(part) {
            names.push(name("default", part));
        }
    }
    if let Some(braces) = braces {
        names.extend(specifier_list(braces));
    }
    names
}

fn reexport_clause(clause: &str) -> Vec<ImportedName> {
    let clause = clause.trim();
    if let Some(rest) = clause.strip_prefix('*') {
        let local = rest.trim().trim_start_matches("as").trim();
        return vec![name("*", if local.is_empty() { "*" } else { local })];
    }
    specifier_list(clause.trim_start_matches('{').trim_end_matches('}'))
}

/// Parses the inside of `{ a, b as c, type d }`.
fn specifier_list(list: &str) -> Vec<ImportedName> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|part| {
            let part = part.strip_prefix("type ").map_or(part, str::trim);
            let mut words = part.split_whitespace();
            let imported = words.next()?;
            let local = match (words.next(), words.next()) {
                (Some("as"), Some(local)) => local,
                _ => imported,
            };
            Some(name(imported, local))
        })
        .collect()
}

/// Parses the binding of `const x = require(...)` or `const { a, b: c } = require(...)`.
fn require_binding(binding: &str) -> Vec<ImportedName> {
    let binding = binding.trim();
    let Some(inner) = binding.strip_prefix('{') else {
        return vec![name("*", binding)];
    };
    inner
        .trim_end_matches('}')
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.starts_with("..."))
        .map(|part| match part.split_once(':') {
            Some((imported, local)) => {
                let local = local.split('=').next().unwrap_or(local).trim();
                name(imported.trim(), local)
            }
            None => {
                let imported = part.split('=').next().unwrap_or(part).trim();
                name(imported, imported)
            }
        })
        .collect()
}

fn name(imported: &str, local: &str) -> ImportedName {
    ImportedName { imported: imported.to_string(), local: local.to_string() }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specifiers(source: &str) -> Vec<String> {
        extract_imports(source).iter().map(|i| i.specifier().to_string()).collect()
    }

    #[test]
    fn finds_every_import_form_in_order() {
        let source = "import a from './a';\nimport './side';\nexport * from './star';\nconst b = require('./b');\nconst c = await import('./c');\n";
        assert_eq!(specifiers(source), vec!["./a", "./side", "./star", "./b", "./c"]);
    }

    #[test]
    fn commented_imports_are_ignored() {
        let source = "// import x from './gone';\n/* require('./also-gone') */\nimport y from './kept';\n";
        assert_eq!(specifiers(source), vec!["./kept"]);
    }

    #[test]
    fn import_like_strings_are_ignored() {
        let source = "const msg = \"import z from './nope'\";\n";
        assert!(extract_imports(source).is_empty());
    }

    #[test]
    fn multiline_named_imports_bind_names() {
        let source = "import Def, {\n  alpha,\n  beta as b,\n} from '../lib/util';\n";
        let imports = extract_imports(source);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].line(), 1);
        assert_eq!(
            imports[0].names(),
            &[name("default", "Def"), name("alpha", "alpha"), name("beta", "b")]
        );
        assert!(imports[0].binds("beta"));
        assert!(!imports[0].binds("gamma"));
    }

    #[test]
    fn namespace_and_require_bindings_cover_every_name() {
        let ns = &extract_imports("import * as util from './util';")[0];
        assert!(ns.binds("anything"));
        let req = &extract_imports("const { parse, format: fmt } = require('./fmt');")[0];
        assert_eq!(req.names(), &[name("parse", "parse"), name("format", "fmt")]);
        let whole = &extract_imports("const fmt = require('./fmt');")[0];
        assert!(whole.binds("format"));
    }

    #[test]
    fn type_only_imports_are_flagged() {
        let imports = extract_imports("import type { Options } from './options';");
        assert!(matches!(imports[0], ImportSpecifier::Static { type_only: true, .. }));
    }

    #[test]
    fn templated_dynamic_imports_are_skipped() {
        assert!(extract_imports("import(`./locale/${lang}`);").is_empty());
    }

    #[test]
    fn relative_detection() {
        let imports = extract_imports("import a from 'react';\nimport b from '../b';");
        assert!(!imports[0].is_relative());
        assert!(imports[1].is_relative());
    }
}
