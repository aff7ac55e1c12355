//! Snapshot extraction for TypeScript sources through a tree-sitter syntax tree.

use std::collections::BTreeMap;

use tree_sitter::{Language, Node, Parser, Tree};

use super::{
    collapse_whitespace, ClassMeta, Export, ExportKind, ExportStyle, ExportType, FunctionMeta,
    Import, ImportedName, InterfaceMeta, Param, ParseStatus, Property, Snapshot, SourceLanguage,
    Symbol, SymbolKind, SymbolMeta,
};

/// Parses `source` and collects its exported surface.
///
/// A source that the parser rejects outright yields an empty snapshot marked
/// [`ParseStatus::Failed`]; recoverable syntax errors yield
/// [`ParseStatus::Partial`] with whatever the tree still exposes.
#[must_use]
pub fn extract(file_path: &str, source: &str, language: SourceLanguage) -> Snapshot {
    let tree = match parse(source, language) {
        Ok(tree) => tree,
        Err(reason) => {
            tracing::warn!(file = file_path, reason, "file is unanalyzable");
            return Snapshot::empty(file_path, language, ParseStatus::Failed);
        }
    };

    let root = tree.root_node();
    let status = if root.has_error() {
        tracing::debug!(file = file_path, "syntax errors present; extraction is best-effort");
        ParseStatus::Partial
    } else {
        ParseStatus::Parsed
    };

    let mut walker = Walker {
        src: source,
        locals: BTreeMap::new(),
        snapshot: Snapshot::empty(file_path, language, status),
    };
    let statements = named_children(root);
    // Declarations are hoisted: `export { foo }` may precede `function foo`.
    for statement in &statements {
        walker.collect_local(*statement);
    }
    for statement in &statements {
        match statement.kind() {
            "export_statement" => walker.export_statement(*statement),
            "import_statement" => walker.import_statement(*statement),
            _ => {}
        }
    }
    walker.snapshot
}

fn parse(source: &str, language: SourceLanguage) -> Result<Tree, String> {
    let grammar: Language = match language {
        SourceLanguage::Tsx | SourceLanguage::Jsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    };
    let mut parser = Parser::new();
    parser.set_language(&grammar).map_err(|e| format!("cannot load grammar: {e}"))?;
    parser.parse(source, None).ok_or_else(|| "parser returned no tree".to_string())
}

/// One value-position use of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The identifier.
    pub name: String,
    /// Property read through it, for `name.member` and `name['member']`.
    pub member: Option<String>,
}

/// Identifier uses in value positions.
///
/// Declaration names, import and export clauses and type positions are
/// skipped, so a name counts only where code actually reads it. Returns
/// `None` when the source cannot be parsed.
#[must_use]
pub fn references(source: &str, language: SourceLanguage) -> Option<Vec<Reference>> {
    let tree = parse(source, language).ok()?;
    let mut found = Vec::new();
    let mut pending = vec![tree.root_node()];
    while let Some(node) = pending.pop() {
        match node.kind() {
            "import_statement" | "export_clause" | "type_annotation" | "type_arguments"
            | "type_parameters" | "interface_declaration" | "type_alias_declaration"
            | "comment" | "string" => continue,
            "member_expression" | "subscript_expression" => {
                let object = node.child_by_field_name("object");
                let member = node
                    .child_by_field_name("property")
                    .or_else(|| node.child_by_field_name("index"))
                    .filter(|m| matches!(m.kind(), "property_identifier" | "string"))
                    .map(|m| unquote(&source[m.byte_range()]));
                if let (Some(object), Some(member)) = (object, member) {
                    if object.kind() == "identifier" {
                        found.push(Reference {
                            name: source[object.byte_range()].to_string(),
                            member: Some(member),
                        });
                        continue;
                    }
                }
            }
            "identifier" | "shorthand_property_identifier" => {
                if !is_declaration_name(node) {
                    found.push(Reference { name: source[node.byte_range()].to_string(), member: None });
                }
                continue;
            }
            _ => {}
        }
        pending.extend(named_children(node).into_iter().rev());
    }
    Some(found)
}

/// The identifier names the thing being declared rather than reading it.
fn is_declaration_name(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let field = match parent.kind() {
        "function_declaration" | "generator_function_declaration" | "class_declaration"
        | "abstract_class_declaration" | "variable_declarator" | "function_expression"
        | "class" | "method_definition" | "enum_declaration" => "name",
        "required_parameter" | "optional_parameter" => "pattern",
        "arrow_function" => "parameter",
        _ => return false,
    };
    parent.child_by_field_name(field) == Some(node)
}

/// A top-level declaration that may or may not be exported.
#[derive(Debug, Clone)]
struct Local {
    symbol: Symbol,
    export_kind: ExportKind,
}

struct Walker<'s> {
    src: &'s str,
    locals: BTreeMap<String, Local>,
    snapshot: Snapshot,
}

impl<'s> Walker<'s> {
    fn text(&self, node: Node) -> &'s str {
        &self.src[node.start_byte()..node.end_byte()]
    }

    /// Records every declaration reachable from a top-level statement so that
    /// later export clauses can resolve local names.
    fn collect_local(&mut self, statement: Node) {
        let declaration = if statement.kind() == "export_statement" {
            match statement.child_by_field_name("declaration") {
                Some(declaration) => declaration,
                None => return,
            }
        } else {
            statement
        };
        for local in self.declarations(declaration) {
            self.locals.entry(local.symbol.name.clone()).or_insert(local);
        }
    }

    fn export_statement(&mut self, node: Node) {
        let line = node.start_position().row + 1;
        let is_default = has_token(node, "default");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            for local in self.declarations(declaration) {
                let name = local.symbol.name.clone();
                let export = if is_default {
                    default_export(line, local.export_kind, Some(name.clone()), ExportStyle::Declarative)
                } else {
                    named_export(&name, line, local.export_kind, None)
                };
                self.publish(local.symbol);
                self.snapshot.push_export(export);
            }
            return;
        }

        if let Some(value) = node.child_by_field_name("value") {
            self.default_value(value, line, ExportStyle::Declarative);
            return;
        }

        // TypeScript `export = value;`
        if has_token(node, "=") {
            if let Some(value) = named_children(node).into_iter().find(|c| c.kind() != "comment") {
                self.default_value(value, line, ExportStyle::Assignment);
            }
            return;
        }

        let source_module = node.child_by_field_name("source").map(|s| unquote(self.text(s)));
        for child in named_children(node) {
            match child.kind() {
                "export_clause" => self.export_clause(child, line, source_module.as_deref()),
                "namespace_export" => {
                    if let Some(alias) = named_children(child).into_iter().next() {
                        let mut export = named_export(
                            &unquote(self.text(alias)),
                            line,
                            ExportKind::Star,
                            source_module.clone(),
                        );
                        export.source_name = Some("*".to_string());
                        self.snapshot.push_export(export);
                    }
                }
                _ => {}
            }
        }
        if has_token(node, "*") && !named_children(node).iter().any(|c| c.kind() == "namespace_export") {
            self.snapshot.push_export(named_export("*", line, ExportKind::Star, source_module));
        }
    }

    fn export_clause(&mut self, clause: Node, line: usize, source_module: Option<&str>) {
        for specifier in named_children(clause) {
            if specifier.kind() != "export_specifier" {
                continue;
            }
            let Some(name_node) = specifier.child_by_field_name("name") else {
                continue;
            };
            let local = unquote(self.text(name_node));
            let public = specifier
                .child_by_field_name("alias")
                .map_or_else(|| local.clone(), |a| unquote(self.text(a)));

            let kind = match source_module {
                Some(_) => ExportKind::Unknown,
                None => self.locals.get(&local).map_or(ExportKind::Unknown, |l| l.export_kind),
            };
            if source_module.is_none() {
                if let Some(found) = self.locals.get(&local).cloned() {
                    self.publish(found.symbol);
                }
            }

            let export = if public == "default" {
                let mut export = default_export(line, kind, Some(local), ExportStyle::Declarative);
                export.source_module = source_module.map(str::to_string);
                export
            } else {
                let mut export =
                    named_export(&public, line, kind, source_module.map(str::to_string));
                if public != local {
                    export.source_name = Some(local);
                }
                export
            };
            self.snapshot.push_export(export);
        }
    }

    /// `export default <expression>` and `export = <expression>`.
    fn default_value(&mut self, value: Node, line: usize, style: ExportStyle) {
        let (kind, source_name) = match value.kind() {
            "identifier" => {
                let name = self.text(value).to_string();
                let kind = match self.locals.get(&name).cloned() {
                    Some(local) => {
                        self.publish(local.symbol);
                        local.export_kind
                    }
                    None => ExportKind::Unknown,
                };
                (kind, Some(name))
            }
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                let symbol = self.function_symbol(value, "default", value);
                self.publish(symbol);
                (ExportKind::Function, None)
            }
            "class" => {
                let name = value
                    .child_by_field_name("name")
                    .map_or("default", |n| self.text(n))
                    .to_string();
                let symbol = self.class_symbol(value, &name);
                self.publish(symbol);
                (ExportKind::Class, (name != "default").then_some(name))
            }
            "object" => (ExportKind::Object, None),
            _ => (ExportKind::Unknown, None),
        };
        self.snapshot.push_export(default_export(line, kind, source_name, style));
    }

    fn publish(&mut self, mut symbol: Symbol) {
        symbol.exported = true;
        self.snapshot.push_symbol(symbol);
    }

    fn import_statement(&mut self, node: Node) {
        let clause = named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "import_clause" | "import_require_clause"));
        let source = node
            .child_by_field_name("source")
            .or_else(|| clause.and_then(|c| c.child_by_field_name("source")));
        let Some(source) = source else {
            return;
        };

        let mut names = Vec::new();
        if let Some(clause) = clause {
            for part in named_children(clause) {
                match part.kind() {
                    "identifier" if clause.kind() == "import_require_clause" => {
                        names.push(imported("*", self.text(part)));
                    }
                    "identifier" => names.push(imported("default", self.text(part))),
                    "namespace_import" => {
                        if let Some(id) = named_children(part).into_iter().next() {
                            names.push(imported("*", self.text(id)));
                        }
                    }
                    "named_imports" => {
                        for specifier in named_children(part) {
                            if specifier.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = specifier.child_by_field_name("name") else {
                                continue;
                            };
                            let name = unquote(self.text(name));
                            let local = specifier
                                .child_by_field_name("alias")
                                .map_or_else(|| name.clone(), |a| self.text(a).to_string());
                            names.push(ImportedName { imported: name, local });
                        }
                    }
                    _ => {}
                }
            }
        }

        self.snapshot.imports.push(Import {
            module: unquote(self.text(source)),
            names,
            line: node.start_position().row + 1,
            type_only: has_token(node, "type"),
        });
    }

    /// Symbols declared by a declaration node, each with the export kind it
    /// would carry.
    fn declarations(&self, node: Node) -> Vec<Local> {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return Vec::new();
                };
                let symbol = self.function_symbol(node, self.text(name), node);
                vec![Local { symbol, export_kind: ExportKind::Function }]
            }
            "class_declaration" | "abstract_class_declaration" => {
                let Some(name) = node.child_by_field_name("name") else {
                    return Vec::new();
                };
                let symbol = self.class_symbol(node, self.text(name));
                vec![Local { symbol, export_kind: ExportKind::Class }]
            }
            "interface_declaration" => self.interface(node).into_iter().collect(),
            "type_alias_declaration" => {
                let (Some(name), Some(value)) =
                    (node.child_by_field_name("name"), node.child_by_field_name("value"))
                else {
                    return Vec::new();
                };
                let symbol = self.symbol(
                    node,
                    self.text(name),
                    SymbolKind::Type,
                    self.header(node, Some(value)),
                    SymbolMeta::TypeAlias { definition: collapse_whitespace(self.text(value)) },
                );
                vec![Local { symbol, export_kind: ExportKind::TypeAlias }]
            }
            "enum_declaration" => self.enumeration(node).into_iter().collect(),
            "lexical_declaration" | "variable_declaration" => {
                let keyword = node.child(0).map_or("const", |k| self.text(k));
                named_children(node)
                    .into_iter()
                    .filter(|d| d.kind() == "variable_declarator")
                    .filter_map(|d| self.declarator(d, keyword))
                    .collect()
            }
            "ambient_declaration" => {
                named_children(node).into_iter().flat_map(|d| self.declarations(d)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn symbol(
        &self,
        node: Node,
        name: &str,
        kind: SymbolKind,
        signature: String,
        meta: SymbolMeta,
    ) -> Symbol {
        let position = node.start_position();
        Symbol {
            name: name.to_string(),
            qualified_name: name.to_string(),
            kind,
            line: position.row + 1,
            column: position.column,
            signature,
            exported: false,
            meta,
        }
    }

    /// Declaration text up to (not including) `stop`, whitespace collapsed.
    fn header(&self, node: Node, stop: Option<Node>) -> String {
        let end = stop.map_or(node.end_byte(), |s| s.start_byte());
        let text = &self.src[node.start_byte()..end.max(node.start_byte())];
        collapse_whitespace(text.trim_end().trim_end_matches(['=', '{']).trim_end())
    }

    /// Function metadata for a function-like node. `anchor` is the node whose
    /// position and header become the symbol's.
    fn function_symbol(&self, function: Node, name: &str, anchor: Node) -> Symbol {
        let meta = self.function_meta(function);
        let signature = self.header(anchor, function.child_by_field_name("body"));
        self.symbol(anchor, name, SymbolKind::Function, signature, SymbolMeta::Function(meta))
    }

    fn function_meta(&self, function: Node) -> FunctionMeta {
        let params = if let Some(list) = function.child_by_field_name("parameters") {
            self.params(list)
        } else if let Some(single) = function.child_by_field_name("parameter") {
            vec![Param {
                name: self.text(single).to_string(),
                type_annotation: None,
                optional: false,
                has_default: false,
                rest: false,
            }]
        } else {
            Vec::new()
        };
        FunctionMeta {
            params,
            return_type: function
                .child_by_field_name("return_type")
                .map(|t| type_text(self.text(t))),
            is_async: has_token(function, "async"),
        }
    }

    fn params(&self, list: Node) -> Vec<Param> {
        let mut params = Vec::new();
        for param in named_children(list) {
            let optional = match param.kind() {
                "required_parameter" => false,
                "optional_parameter" => true,
                _ => continue,
            };
            let Some(pattern) = param.child_by_field_name("pattern") else {
                continue;
            };
            if pattern.kind() == "this" {
                continue;
            }
            let rest = pattern.kind() == "rest_pattern";
            let name = self.text(pattern).trim_start_matches("...").trim().to_string();
            params.push(Param {
                name,
                type_annotation: param.child_by_field_name("type").map(|t| type_text(self.text(t))),
                optional,
                has_default: param.child_by_field_name("value").is_some(),
                rest,
            });
        }
        params
    }

    fn class_symbol(&self, node: Node, name: &str) -> Symbol {
        let body = node.child_by_field_name("body");
        let mut meta = ClassMeta::default();
        if let Some(body) = body {
            for member in named_children(body) {
                match member.kind() {
                    "method_definition" | "method_signature" | "abstract_method_signature" => {
                        let Some(member_name) = self.public_member_name(member) else {
                            continue;
                        };
                        if member_name == "constructor" {
                            if meta.constructor.is_none() {
                                meta.constructor = Some(
                                    member
                                        .child_by_field_name("parameters")
                                        .map(|p| self.params(p))
                                        .unwrap_or_default(),
                                );
                            }
                        } else if !meta.methods.contains(&member_name) {
                            meta.methods.push(member_name);
                        }
                    }
                    "public_field_definition" => {
                        if let Some(field) = self.public_member_name(member) {
                            if !meta.properties.contains(&field) {
                                meta.properties.push(field);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        let signature = self.header(node, body);
        self.symbol(node, name, SymbolKind::Class, signature, SymbolMeta::Class(meta))
    }

    /// Name of a class member visible to consumers, or `None` for private and
    /// protected members.
    fn public_member_name(&self, member: Node) -> Option<String> {
        let hidden = named_children(member).into_iter().any(|c| {
            c.kind() == "accessibility_modifier" && matches!(self.text(c), "private" | "protected")
        });
        let name = member.child_by_field_name("name")?;
        if hidden || name.kind() == "private_property_identifier" {
            return None;
        }
        Some(unquote(self.text(name)))
    }

    fn interface(&self, node: Node) -> Option<Local> {
        let name = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body");
        let mut meta = InterfaceMeta::default();
        for member in body.map(named_children).unwrap_or_default() {
            let (member_name, type_annotation) = match member.kind() {
                "property_signature" => (
                    member.child_by_field_name("name").map(|n| unquote(self.text(n))),
                    member.child_by_field_name("type").map(|t| type_text(self.text(t))),
                ),
                "method_signature" => {
                    let call = member
                        .child_by_field_name("parameters")
                        .map(|p| collapse_whitespace(&self.src[p.start_byte()..member.end_byte()]));
                    (member.child_by_field_name("name").map(|n| unquote(self.text(n))), call)
                }
                "call_signature" => (Some("()".to_string()), Some(collapse_whitespace(self.text(member)))),
                "construct_signature" => {
                    (Some("new()".to_string()), Some(collapse_whitespace(self.text(member))))
                }
                "index_signature" => (Some("[]".to_string()), Some(collapse_whitespace(self.text(member)))),
                _ => continue,
            };
            let Some(member_name) = member_name else {
                continue;
            };
            meta.properties.push(Property {
                name: member_name,
                optional: has_token(member, "?"),
                type_annotation,
            });
        }
        let symbol = self.symbol(
            node,
            self.text(name),
            SymbolKind::Interface,
            self.header(node, body),
            SymbolMeta::Interface(meta),
        );
        Some(Local { symbol, export_kind: ExportKind::Interface })
    }

    fn enumeration(&self, node: Node) -> Option<Local> {
        let name = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body");
        let members = body
            .map(named_children)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|member| match member.kind() {
                "enum_assignment" => member.child_by_field_name("name").map(|n| unquote(self.text(n))),
                "property_identifier" | "identifier" | "string" => Some(unquote(self.text(member))),
                _ => None,
            })
            .collect();
        let symbol = self.symbol(
            node,
            self.text(name),
            SymbolKind::Enum,
            self.header(node, body),
            SymbolMeta::Enum { members },
        );
        Some(Local { symbol, export_kind: ExportKind::Enum })
    }

    fn declarator(&self, declarator: Node, keyword: &str) -> Option<Local> {
        let name_node = declarator.child_by_field_name("name")?;
        if name_node.kind() != "identifier" {
            return None;
        }
        let name = self.text(name_node);
        let value = declarator.child_by_field_name("value");
        let prefix = |header: String| format!("{keyword} {header}");

        let local = match value.map(|v| (v, v.kind())) {
            Some((function, "arrow_function" | "function_expression" | "function" | "generator_function")) => {
                let mut symbol = self.function_symbol(function, name, declarator);
                symbol.signature = prefix(collapse_whitespace(&format!(
                    "{} {}",
                    self.header(declarator, Some(function)),
                    self.header(function, function.child_by_field_name("body"))
                        .trim_end_matches("=>")
                        .trim_end()
                )));
                Local { symbol, export_kind: ExportKind::Function }
            }
            Some((class, "class")) => {
                let mut symbol = self.class_symbol(class, name);
                symbol.line = declarator.start_position().row + 1;
                symbol.column = declarator.start_position().column;
                Local { symbol, export_kind: ExportKind::Class }
            }
            other => {
                let export_kind = match other {
                    Some((_, "object")) => ExportKind::Object,
                    _ => ExportKind::Variable,
                };
                let symbol = self.symbol(
                    declarator,
                    name,
                    SymbolKind::Variable,
                    prefix(self.header(declarator, value)),
                    SymbolMeta::Variable {
                        declared_type: declarator
                            .child_by_field_name("type")
                            .map(|t| type_text(self.text(t))),
                    },
                );
                Local { symbol, export_kind }
            }
        };
        Some(local)
    }
}

fn named_export(
    name: &str,
    line: usize,
    kind: ExportKind,
    source_module: Option<String>,
) -> Export {
    Export {
        name: name.to_string(),
        export_type: ExportType::Named,
        kind,
        line,
        source_name: None,
        source_module,
        style: ExportStyle::Declarative,
    }
}

fn default_export(
    line: usize,
    kind: ExportKind,
    source_name: Option<String>,
    style: ExportStyle,
) -> Export {
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

fn imported(imported: &str, local: &str) -> ImportedName {
    ImportedName { imported: imported.to_string(), local: local.to_string() }
}

#[allow(clippy::let_and_return)]
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

/// The node has a direct child (named or anonymous) of `kind`.
#[allow(clippy::let_and_return)]
fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

fn unquote(text: &str) -> String {
    text.trim().trim_matches(['\'', '"', '`']).to_string()
}

/// Type annotation text without its leading colon.
fn type_text(annotation: &str) -> String {
    collapse_whitespace(annotation.trim().trim_start_matches(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(source: &str) -> Snapshot {
        extract("src/mod.ts", source, SourceLanguage::TypeScript)
    }

    #[test]
    fn exported_function_carries_typed_params() {
        let snap = snapshot("export async function load(id: string, opts?: Options, ...rest: number[]): Promise<Item> {\n  return get(id);\n}\n");
        assert_eq!(snap.parse_status, ParseStatus::Parsed);
        let function = &snap.functions[0];
        assert_eq!(function.name, "load");
        assert!(function.exported);
        let meta = function.function().unwrap();
        assert!(meta.is_async);
        assert_eq!(meta.params.len(), 3);
        assert_eq!(meta.params[0].type_annotation.as_deref(), Some("string"));
        assert!(meta.params[1].optional);
        assert!(meta.params[2].rest);
        assert_eq!(meta.return_type.as_deref(), Some("Promise<Item>"));
        assert_eq!(snap.exports.len(), 1);
        assert_eq!(snap.exports[0].kind, ExportKind::Function);
    }

    #[test]
    fn unexported_declarations_are_invisible() {
        let snap = snapshot("function hidden() {}\nclass Internal {}\nexport const visible = 1;\n");
        assert!(snap.functions.is_empty());
        assert!(snap.classes.is_empty());
        assert_eq!(snap.variables.len(), 1);
    }

    #[test]
    fn export_clause_publishes_hoisted_locals() {
        let snap = snapshot("export { helper as run, Widget };\nfunction helper(a: number) {}\nclass Widget {}\n");
        assert_eq!(snap.functions[0].name, "helper");
        assert_eq!(snap.classes[0].name, "Widget");
        let run = snap.exports.iter().find(|e| e.name == "run").unwrap();
        assert_eq!(run.source_name.as_deref(), Some("helper"));
        assert_eq!(run.kind, ExportKind::Function);
    }

    #[test]
    fn default_exports_are_not_also_named() {
        let snap = snapshot("export default class Store {\n  get(key: string) {}\n  private reset() {}\n  constructor(size: number) {}\n}\n");
        assert_eq!(snap.exports.len(), 1);
        let export = &snap.exports[0];
        assert_eq!(export.export_type, ExportType::Default);
        assert_eq!(export.source_name.as_deref(), Some("Store"));
        let class = snap.classes[0].class().unwrap();
        assert_eq!(class.methods, vec!["get"]);
        assert_eq!(class.constructor.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn interfaces_types_and_enums() {
        let snap = snapshot(
            "export interface Options {\n  name: string;\n  depth?: number;\n  run(x: number): void;\n}\nexport type Mode = 'a' | 'b';\nexport enum Color { Red, Green = 'g' }\n",
        );
        let iface = snap.interfaces[0].interface().unwrap();
        assert_eq!(iface.properties.len(), 3);
        assert!(!iface.properties[0].optional);
        assert!(iface.properties[1].optional);
        assert_eq!(
            snap.type_aliases[0].meta,
            SymbolMeta::TypeAlias { definition: "'a' | 'b'".to_string() }
        );
        assert_eq!(snap.enums[0].meta, SymbolMeta::Enum { members: vec!["Red".into(), "Green".into()] });
    }

    #[test]
    fn references_skip_declarations_imports_and_types() {
        let refs = references(
            "import { load, Store } from './store';\nconst load2: Store = load();\nfunction helper(load: number) { return ns.run + ns['stop']; }\n",
            SourceLanguage::TypeScript,
        )
        .unwrap();
        let plain: Vec<&str> =
            refs.iter().filter(|r| r.member.is_none()).map(|r| r.name.as_str()).collect();
        assert_eq!(plain, vec!["load"]);
        let members: Vec<(&str, &str)> = refs
            .iter()
            .filter_map(|r| r.member.as_deref().map(|m| (r.name.as_str(), m)))
            .collect();
        assert_eq!(members, vec![("ns", "run"), ("ns", "stop")]);
    }

    #[test]
    fn star_and_namespace_reexports() {
        let snap = snapshot("export * from './a';\nexport * as b from './b';\nexport { c } from './c';\n");
        let names: Vec<(&str, Option<&str>)> = snap
            .exports
            .iter()
            .map(|e| (e.name.as_str(), e.source_module.as_deref()))
            .collect();
        assert_eq!(names, vec![("*", Some("./a")), ("b", Some("./b")), ("c", Some("./c"))]);
        assert!(snap.exports[..2].iter().all(|e| e.kind == ExportKind::Star));
    }

    #[test]
    fn arrow_function_bindings_are_functions() {
        let snap = snapshot("export const add = (a: number, b = 2): number => a + b;\n");
        let meta = snap.functions[0].function().unwrap();
        assert!(meta.params[0].is_required());
        assert!(meta.params[1].has_default);
        assert_eq!(snap.exports[0].kind, ExportKind::Function);
    }

    #[test]
    fn imports_record_bindings() {
        let snap = snapshot("import def, { a as b } from './x';\nimport * as ns from './y';\nimport type { T } from './t';\n");
        assert_eq!(snap.imports.len(), 3);
        assert_eq!(snap.imports[0].names, vec![imported("default", "def"), imported("a", "b")]);
        assert_eq!(snap.imports[1].names, vec![imported("*", "ns")]);
        assert!(snap.imports[2].type_only);
    }

    #[test]
    fn broken_source_is_partial() {
        let snap = snapshot("export function ok() {}\nexport function broken( {\n");
        assert_eq!(snap.parse_status, ParseStatus::Partial);
    }
}
