//! Rule taxonomy for findings.
//!
//! Rule identifiers are a stable vocabulary: external tooling keys off these
//! strings, so an identifier is never renamed or given a new meaning. When two
//! findings land on the same symbol the one whose rule has the higher priority
//! is kept.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a finding is for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Consumers will fail to build or run.
    Breaking,
    /// Consumers may be affected; needs a look.
    Warning,
    /// Additive or compatible change.
    Info,
}

impl Severity {
    /// Lowercase label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A finding classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// An exported class disappeared.
    ExportedClassRemoved,
    /// An `export * from` re-export disappeared.
    ExportStarRemoved,
    /// The default export disappeared.
    DefaultExportRemoved,
    /// A `module.exports` or `exports.x` assignment disappeared.
    CjsExportRemoved,
    /// An `export { a as b }` alias disappeared.
    AliasedExportRemoved,
    /// A named re-export from another module disappeared.
    ReexportRemoved,
    /// Any other named export disappeared.
    ExportRemoved,
    /// The default export became a named export.
    ExportDefaultToNamed,
    /// A named export became the default export.
    ExportNamedToDefault,
    /// An export kept its name but changed kind.
    ExportKindChanged,
    /// A new export appeared.
    ExportAdded,
    /// The manifest `exports` map was removed or emptied.
    PackageExportsRemoved,
    /// The manifest `type` field flipped.
    PackageTypeChanged,
    /// The file moved between ESM and CommonJS.
    ModuleSystemChanged,
    /// A function declaration disappeared.
    FunctionRemoved,
    /// A function lost parameters or changed shape.
    FunctionSignatureChanged,
    /// A function gained a required parameter.
    FunctionRequiredParamAdded,
    /// An optional parameter became required.
    FunctionParamBecameRequired,
    /// A parameter type changed.
    FunctionParamTypeChanged,
    /// A return type changed.
    FunctionReturnTypeChanged,
    /// A class declaration disappeared.
    ClassRemoved,
    /// A public method disappeared.
    ClassMethodRemoved,
    /// An explicit constructor disappeared.
    ClassConstructorRemoved,
    /// Constructor parameters changed.
    ClassConstructorChanged,
    /// An interface disappeared.
    InterfaceRemoved,
    /// An interface property disappeared.
    InterfacePropertyRemoved,
    /// An interface gained a required property.
    InterfacePropertyAddedRequired,
    /// An optional property became required.
    InterfacePropertyBecameRequired,
    /// A property type changed.
    InterfacePropertyTypeChanged,
    /// A type alias disappeared.
    TypeAliasRemoved,
    /// A type alias definition changed.
    TypeAliasChanged,
    /// An enum disappeared.
    EnumRemoved,
    /// An enum member disappeared.
    EnumMemberRemoved,
    /// An exported variable disappeared.
    VariableRemoved,
    /// A new declaration appeared.
    SymbolAdded,
}

/// Static properties of one rule.
struct RuleSpec {
    rule: Rule,
    id: &'static str,
    priority: u16,
    /// Derived from pattern matching regardless of source language.
    heuristic: bool,
    /// Message is explicit enough to never carry the heuristic disclaimer.
    no_disclaimer: bool,
}

const fn spec(rule: Rule, id: &'static str, priority: u16, heuristic: bool, no_disclaimer: bool) -> RuleSpec {
    RuleSpec { rule, id, priority, heuristic, no_disclaimer }
}

#[rustfmt::skip]
const RULES: &[RuleSpec] = &[
    // Export removals, most specific first.
    spec(Rule::ExportedClassRemoved,            "exported-class-removed",             100, false, false),
    spec(Rule::ExportStarRemoved,               "export-star-removed",                 95, false, false),
    spec(Rule::DefaultExportRemoved,            "default-export-removed",              90, false, false),
    spec(Rule::CjsExportRemoved,                "cjs-export-removed",                  85, true,  false),
    spec(Rule::AliasedExportRemoved,            "aliased-export-removed",              80, false, false),
    spec(Rule::ReexportRemoved,                 "reexport-removed",                    75, false, false),
    spec(Rule::ExportRemoved,                   "export-removed",                      70, false, false),
    // Package surface.
    spec(Rule::PackageExportsRemoved,           "package-exports-removed",             98, false, true),
    spec(Rule::PackageTypeChanged,              "package-type-changed",                92, false, true),
    // Export modifications.
    spec(Rule::ExportDefaultToNamed,            "export-default-to-named",             65, false, false),
    spec(Rule::ExportNamedToDefault,            "export-named-to-default",             65, false, false),
    spec(Rule::ExportKindChanged,               "export-kind-changed",                 60, false, false),
    spec(Rule::ModuleSystemChanged,             "module-system-changed",               55, true,  false),
    // Structural changes to a surviving symbol.
    spec(Rule::FunctionRequiredParamAdded,      "function-required-param-added",       50, false, false),
    spec(Rule::FunctionParamBecameRequired,     "function-param-became-required",      49, false, false),
    spec(Rule::FunctionParamTypeChanged,        "function-param-type-changed",         48, false, false),
    spec(Rule::FunctionReturnTypeChanged,       "function-return-type-changed",        47, false, false),
    spec(Rule::FunctionSignatureChanged,        "function-signature-changed",          45, true,  false),
    spec(Rule::ClassConstructorRemoved,         "class-constructor-removed",           46, false, false),
    spec(Rule::ClassConstructorChanged,         "class-constructor-changed",           45, false, false),
    spec(Rule::ClassMethodRemoved,              "class-method-removed",                44, false, false),
    spec(Rule::InterfacePropertyRemoved,        "interface-property-removed",          46, false, false),
    spec(Rule::InterfacePropertyAddedRequired,  "interface-property-added-required",   45, false, false),
    spec(Rule::InterfacePropertyBecameRequired, "interface-property-became-required",  44, false, false),
    spec(Rule::InterfacePropertyTypeChanged,    "interface-property-type-changed",     43, false, false),
    spec(Rule::EnumMemberRemoved,               "enum-member-removed",                 46, false, false),
    spec(Rule::TypeAliasChanged,                "type-alias-changed",                  40, false, false),
    // Declaration removals; the export-level rule for the same name wins.
    spec(Rule::FunctionRemoved,                 "function-removed",                    30, false, false),
    spec(Rule::ClassRemoved,                    "class-removed",                       30, false, false),
    spec(Rule::InterfaceRemoved,                "interface-removed",                   30, false, false),
    spec(Rule::TypeAliasRemoved,                "type-alias-removed",                  30, false, false),
    spec(Rule::EnumRemoved,                     "enum-removed",                        30, false, false),
    spec(Rule::VariableRemoved,                 "variable-removed",                    30, false, false),
    // Additions.
    spec(Rule::ExportAdded,                     "export-added",                        10, false, true),
    spec(Rule::SymbolAdded,                     "symbol-added",                         5, false, true),
];

impl Rule {
    fn spec(self) -> &'static RuleSpec {
        RULES
            .iter()
            .find(|s| s.rule == self)
            .unwrap_or(&RULES[RULES.len() - 1])
    }

    /// Stable identifier, e.g. `export-removed`.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.spec().id
    }

    /// Rank used when findings collide on one symbol; higher wins.
    #[must_use]
    pub fn priority(self) -> u16 {
        self.spec().priority
    }

    /// The rule is derived from pattern matching even on typed sources.
    #[must_use]
    pub fn is_heuristic(self) -> bool {
        self.spec().heuristic
    }

    /// The rule's message never carries the heuristic disclaimer.
    #[must_use]
    pub fn skips_disclaimer(self) -> bool {
        self.spec().no_disclaimer
    }

    /// Looks a rule up by its stable identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        RULES.iter().find(|s| s.id == id).map(|s| s.rule)
    }

    /// Every rule, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        RULES.iter().map(|s| s.rule)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
