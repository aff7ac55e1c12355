//! Declaration-level diff: symbols matched by kind and qualified name.

use std::collections::{BTreeMap, BTreeSet};

use crate::snapshot::{Param, Property, Snapshot, Symbol, SymbolKind, SymbolMeta};

/// A change to one parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamChange {
    /// Fewer parameters than before.
    CountDecreased {
        /// Count before.
        before: usize,
        /// Count after.
        after: usize,
    },
    /// The rest parameter is gone.
    RestRemoved,
    /// A new parameter callers must supply.
    RequiredAdded {
        /// Parameter name.
        name: String,
    },
    /// An optional or defaulted parameter became required.
    BecameRequired {
        /// Parameter name.
        name: String,
    },
    /// A parameter's declared type changed.
    TypeChanged {
        /// Parameter name.
        name: String,
        /// Type before.
        before: String,
        /// Type after.
        after: String,
        /// The new type accepts everything the old one did.
        widening: bool,
    },
}

/// A structural change to a symbol present on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolChange {
    /// Function parameter change.
    Params(ParamChange),
    /// Declared return type changed.
    ReturnTypeChanged {
        /// Type before.
        before: String,
        /// Type after.
        after: String,
        /// The new type returns a subset of what the old one did.
        narrowing: bool,
    },
    /// A function became async or stopped being async.
    AsyncChanged {
        /// The function is async after the change.
        now_async: bool,
    },
    /// A public class method disappeared.
    MethodRemoved {
        /// Method name.
        name: String,
    },
    /// The explicit constructor disappeared.
    ConstructorRemoved,
    /// Constructor parameter change.
    Constructor(ParamChange),
    /// An interface member disappeared.
    PropertyRemoved {
        /// Member name.
        name: String,
    },
    /// A new required interface member.
    PropertyAddedRequired {
        /// Member name.
        name: String,
    },
    /// An optional interface member became required.
    PropertyBecameRequired {
        /// Member name.
        name: String,
    },
    /// An interface member's type changed.
    PropertyTypeChanged {
        /// Member name.
        name: String,
        /// Type before.
        before: String,
        /// Type after.
        after: String,
    },
    /// A type alias definition changed.
    DefinitionChanged {
        /// Definition before.
        before: String,
        /// Definition after.
        after: String,
    },
    /// An enum member disappeared.
    EnumMemberRemoved {
        /// Member name.
        name: String,
    },
}

/// A symbol present on both sides with at least one structural change.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolModification {
    /// Declaration before.
    pub before: Symbol,
    /// Declaration after.
    pub after: Symbol,
    /// What changed.
    pub changes: Vec<SymbolChange>,
}

/// Added, removed and modified declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolDiff {
    /// Present only after.
    pub added: Vec<Symbol>,
    /// Present only before.
    pub removed: Vec<Symbol>,
    /// Present on both sides with structural changes.
    pub modified: Vec<SymbolModification>,
}

impl SymbolDiff {
    /// Nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

const KINDS: [SymbolKind; 6] = [
    SymbolKind::Function,
    SymbolKind::Class,
    SymbolKind::Interface,
    SymbolKind::Type,
    SymbolKind::Enum,
    SymbolKind::Variable,
];

/// Compares the symbols of two snapshots kind by kind.
///
/// `typed` enables the stricter comparisons that need declared types.
#[must_use]
pub fn diff_symbols(before: &Snapshot, after: &Snapshot, typed: bool) -> SymbolDiff {
    let mut diff = SymbolDiff::default();
    for kind in KINDS {
        let old = by_name(before.symbols_of(kind));
        let new = by_name(after.symbols_of(kind));
        for (name, symbol) in &old {
            match new.get(name) {
                None => diff.removed.push((*symbol).clone()),
                Some(current) => {
                    let changes = compare(symbol, current, typed);
                    if !changes.is_empty() {
                        diff.modified.push(SymbolModification {
                            before: (*symbol).clone(),
                            after: (*current).clone(),
                            changes,
                        });
                    }
                }
            }
        }
        diff.added.extend(new.iter().filter(|(name, _)| !old.contains_key(*name)).map(|(_, s)| (*s).clone()));
    }
    diff
}

fn by_name(symbols: &[Symbol]) -> BTreeMap<&str, &Symbol> {
    symbols.iter().map(|s| (s.qualified_name.as_str(), s)).collect()
}

fn compare(before: &Symbol, after: &Symbol, typed: bool) -> Vec<SymbolChange> {
    match (&before.meta, &after.meta) {
        (SymbolMeta::Function(old), SymbolMeta::Function(new)) => {
            let mut changes: Vec<SymbolChange> =
                compare_params(&old.params, &new.params, typed).into_iter().map(SymbolChange::Params).collect();
            if typed {
                if let (Some(b), Some(a)) = (&old.return_type, &new.return_type) {
                    if normalize_type(b) != normalize_type(a) {
                        changes.push(SymbolChange::ReturnTypeChanged {
                            before: b.clone(),
                            after: a.clone(),
                            narrowing: is_subset(a, b),
                        });
                    }
                }
            } else if old.is_async != new.is_async {
                // Typed sources surface this through the return type.
                changes.push(SymbolChange::AsyncChanged { now_async: new.is_async });
            }
            changes
        }
        (SymbolMeta::Class(old), SymbolMeta::Class(new)) => {
            let mut changes: Vec<SymbolChange> = old
                .methods
                .iter()
                .filter(|m| !new.methods.contains(m))
                .map(|m| SymbolChange::MethodRemoved { name: m.clone() })
                .collect();
            match (&old.constructor, &new.constructor) {
                (Some(_), None) => changes.push(SymbolChange::ConstructorRemoved),
                (Some(b), Some(a)) => {
                    changes.extend(compare_params(b, a, typed).into_iter().map(SymbolChange::Constructor));
                }
                (None, Some(a)) if typed => {
                    // An implicit constructor takes no arguments.
                    changes.extend(
                        compare_params(&[], a, typed).into_iter().map(SymbolChange::Constructor),
                    );
                }
                _ => {}
            }
            changes
        }
        (SymbolMeta::Interface(old), SymbolMeta::Interface(new)) => {
            compare_properties(&old.properties, &new.properties)
        }
        (SymbolMeta::TypeAlias { definition: b }, SymbolMeta::TypeAlias { definition: a }) => {
            if b == a {
                Vec::new()
            } else {
                vec![SymbolChange::DefinitionChanged { before: b.clone(), after: a.clone() }]
            }
        }
        (SymbolMeta::Enum { members: old }, SymbolMeta::Enum { members: new }) => old
            .iter()
            .filter(|m| !new.contains(m))
            .map(|m| SymbolChange::EnumMemberRemoved { name: m.clone() })
            .collect(),
        _ => Vec::new(),
    }
}

/// Positional comparison of two parameter lists.
fn compare_params(before: &[Param], after: &[Param], typed: bool) -> Vec<ParamChange> {
    let mut changes = Vec::new();
    if after.len() < before.len() {
        changes.push(ParamChange::CountDecreased { before: before.len(), after: after.len() });
    }
    if before.iter().any(|p| p.rest) && !after.iter().any(|p| p.rest) {
        changes.push(ParamChange::RestRemoved);
    }
    for (old, new) in before.iter().zip(after) {
        if !old.is_required() && new.is_required() {
            changes.push(ParamChange::BecameRequired { name: new.name.clone() });
        }
        if typed {
            if let (Some(b), Some(a)) = (&old.type_annotation, &new.type_annotation) {
                if normalize_type(b) != normalize_type(a) {
                    changes.push(ParamChange::TypeChanged {
                        name: new.name.clone(),
                        before: b.clone(),
                        after: a.clone(),
                        widening: is_subset(b, a),
                    });
                }
            }
        }
    }
    if typed {
        // A trailing rest parameter already absorbed extra arguments.
        let absorbed = before.last().is_some_and(|p| p.rest);
        if !absorbed {
            changes.extend(
                after
                    .iter()
                    .skip(before.len())
                    .filter(|p| p.is_required())
                    .map(|p| ParamChange::RequiredAdded { name: p.name.clone() }),
            );
        }
    }
    changes
}

fn compare_properties(before: &[Property], after: &[Property]) -> Vec<SymbolChange> {
    let old: BTreeMap<&str, &Property> = before.iter().map(|p| (p.name.as_str(), p)).collect();
    let new: BTreeMap<&str, &Property> = after.iter().map(|p| (p.name.as_str(), p)).collect();
    let mut changes = Vec::new();
    for (name, property) in &old {
        let Some(current) = new.get(name) else {
            changes.push(SymbolChange::PropertyRemoved { name: (*name).to_string() });
            continue;
        };
        if property.optional && !current.optional {
            changes.push(SymbolChange::PropertyBecameRequired { name: (*name).to_string() });
        }
        if let (Some(b), Some(a)) = (&property.type_annotation, &current.type_annotation) {
            if normalize_type(b) != normalize_type(a) {
                changes.push(SymbolChange::PropertyTypeChanged {
                    name: (*name).to_string(),
                    before: b.clone(),
                    after: a.clone(),
                });
            }
        }
    }
    for (name, property) in &new {
        if !old.contains_key(name) && !property.optional {
            changes.push(SymbolChange::PropertyAddedRequired { name: (*name).to_string() });
        }
    }
    changes
}

/// Members of a top-level union type, whitespace-normalized.
fn union_members(text: &str) -> BTreeSet<String> {
    let mut members = BTreeSet::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut prev = ' ';
    for c in text.chars() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' if prev == '=' => {}
            '>' | ')' | ']' | '}' => depth -= 1,
            '|' if depth == 0 => {
                members.insert(normalize_type(&current));
                current.clear();
                prev = c;
                continue;
            }
            _ => {}
        }
        current.push(c);
        prev = c;
    }
    members.insert(normalize_type(&current));
    members.remove("");
    members
}

/// `a`'s union members are all members of `b`'s.
fn is_subset(a: &str, b: &str) -> bool {
    let b = union_members(b);
    b.contains("any") || b.contains("unknown") || union_members(a).is_subset(&b)
}

fn normalize_type(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").trim_end_matches(';').to_string()
}
