//! Per-context candidate generators.

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

use super::catalog;
use super::{CompletionInput, CompletionItem, CompletionKind, Generator, Origin, Proposal};
use crate::base::text::IDENT;
use crate::hir::{Symbol, SymbolKind};
use crate::ide::context::{CompletionContext, current_line};

static LET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?:let|const)\s+({IDENT})")).expect("variable pattern must compile")
});

/// Keeps labels and versions already in use above every catalog suggestion.
const IN_USE_BOOST: u32 = 250;

pub(super) fn contextual() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(LabelGenerator),
        Box::new(CallGenerator),
        Box::new(KeywordGenerator),
        Box::new(TypeGenerator),
        Box::new(ParameterGenerator),
        Box::new(VersionGenerator),
    ]
}

pub(super) fn completion_kind(kind: SymbolKind) -> CompletionKind {
    match kind {
        SymbolKind::Function => CompletionKind::Function,
        SymbolKind::Pipeline => CompletionKind::Pipeline,
        SymbolKind::Class => CompletionKind::Class,
        SymbolKind::Method => CompletionKind::Method,
        SymbolKind::TypeAlias => CompletionKind::TypeAlias,
        SymbolKind::Macro => CompletionKind::Macro,
        SymbolKind::Constant => CompletionKind::Constant,
    }
}

/// Detail line for one or more same-named symbols: kinds, versions, owners
/// and labels, each listed once.
pub(super) fn describe(symbols: &[&Symbol]) -> String {
    let kinds: IndexSet<_> = symbols.iter().map(|s| s.kind().display()).collect();
    let versions: IndexSet<_> = symbols.iter().filter_map(|s| s.version()).collect();
    let owners: IndexSet<_> = symbols.iter().filter_map(|s| s.owner()).collect();
    let labels: IndexSet<_> = symbols
        .iter()
        .flat_map(|s| s.labels.iter().map(|l| l.as_str()))
        .collect();

    let mut parts = vec![kinds.into_iter().collect::<Vec<_>>().join(" / ")];
    let mut list = |singular: &str, plural: &str, values: IndexSet<&str>| {
        match values.len() {
            0 => {}
            1 => parts.push(format!("{singular}: {}", values[0])),
            _ => parts.push(format!("{plural}: {}", values.into_iter().collect::<Vec<_>>().join(", "))),
        }
    };
    list("version", "versions", versions);
    list("owner", "owners", owners);
    list("label", "labels", labels);
    parts.join(" · ")
}

/// The completion for a group of same-named symbols, typed after the first.
pub(super) fn symbol_group_item(symbols: &[&Symbol]) -> Option<CompletionItem> {
    let first = symbols.first()?;
    let insert_text = match first.kind() {
        SymbolKind::Function | SymbolKind::Method => format!("{}($1)", first.name),
        _ => first.name.to_string(),
    };
    Some(
        CompletionItem::new(first.name.clone(), completion_kind(first.kind()), Origin::Workspace)
            .with_insert_text(insert_text)
            .with_detail(describe(symbols))
            .with_documentation(symbols.iter().find_map(|s| s.doc.as_deref())),
    )
}

pub(super) fn symbol_item(symbol: &Symbol) -> Option<CompletionItem> {
    symbol_group_item(&[symbol])
}

fn catalog_item(entry: &catalog::Entry, kind: CompletionKind) -> CompletionItem {
    let (label, template, description) = *entry;
    CompletionItem::new(label, kind, Origin::Catalog)
        .with_insert_text(template)
        .with_detail(description)
}

/// Quote `value` unless the cursor is already inside a string.
fn quoted(input: &CompletionInput<'_>, value: &str) -> String {
    let line = current_line(input.request.before);
    let open = line.matches('"').count() % 2 == 1;
    if open {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

pub(super) struct LabelGenerator;

impl Generator for LabelGenerator {
    fn name(&self) -> &'static str {
        "label"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(context, CompletionContext::Label { .. })
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let existing = input.snapshot.all_labels();
        let mut out: Vec<_> = existing
            .iter()
            .map(|label| {
                let uses = input.snapshot.label_count(label);
                Proposal::new(
                    CompletionItem::new(label.clone(), CompletionKind::Label, Origin::Workspace)
                        .with_boost(IN_USE_BOOST)
                        .with_insert_text(quoted(input, label))
                        .with_detail(format!("existing label · {uses} use{}", if uses == 1 { "" } else { "s" })),
                    "label already in use",
                )
            })
            .collect();

        out.extend(
            catalog::LABELS
                .iter()
                .filter(|label| !existing.contains(**label))
                .map(|label| {
                    Proposal::new(
                        CompletionItem::new(*label, CompletionKind::Label, Origin::Catalog)
                            .with_insert_text(quoted(input, label))
                            .with_detail("suggested label"),
                        "common label",
                    )
                }),
        );
        out
    }
}

pub(super) struct CallGenerator;

impl Generator for CallGenerator {
    fn name(&self) -> &'static str {
        "call"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(context, CompletionContext::Call { .. })
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let mut groups: IndexMap<&str, Vec<&Symbol>> = IndexMap::new();
        for symbol in input.snapshot.all_symbols().filter(|s| s.kind().is_callable()) {
            groups.entry(symbol.name.as_str()).or_default().push(symbol);
        }

        groups
            .values()
            .filter_map(|group| symbol_group_item(group))
            .map(|item| Proposal::new(item, "callable in workspace"))
            .collect()
    }
}

pub(super) struct KeywordGenerator;

impl Generator for KeywordGenerator {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(
            context,
            CompletionContext::Keyword { .. }
                | CompletionContext::Call {
                    statement_start: true,
                    ..
                }
        )
    }

    fn generate(&self, _input: &CompletionInput<'_>) -> Vec<Proposal> {
        catalog::KEYWORDS
            .iter()
            .map(|entry| Proposal::new(catalog_item(entry, CompletionKind::Keyword), "keyword"))
            .collect()
    }
}

pub(super) struct TypeGenerator;

impl Generator for TypeGenerator {
    fn name(&self) -> &'static str {
        "type"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(context, CompletionContext::Type { .. })
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let user = input
            .snapshot
            .all_symbols()
            .filter(|s| matches!(s.kind(), SymbolKind::Class | SymbolKind::TypeAlias))
            .filter_map(symbol_item)
            .map(|item| Proposal::new(item, "declared type"));
        let builtin = catalog::TYPES
            .iter()
            .map(|entry| Proposal::new(catalog_item(entry, CompletionKind::Type), "built-in type"));
        user.chain(builtin).collect()
    }
}

pub(super) struct ParameterGenerator;

impl Generator for ParameterGenerator {
    fn name(&self) -> &'static str {
        "parameter"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(context, CompletionContext::Parameter { .. })
    }

    fn generate(&self, _input: &CompletionInput<'_>) -> Vec<Proposal> {
        catalog::PARAMETERS
            .iter()
            .map(|entry| Proposal::new(catalog_item(entry, CompletionKind::Parameter), "common parameter"))
            .collect()
    }
}

pub(super) struct VersionGenerator;

impl Generator for VersionGenerator {
    fn name(&self) -> &'static str {
        "version"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        matches!(context, CompletionContext::Version { .. })
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let CompletionContext::Version { function, .. } = input.context else {
            return Vec::new();
        };

        let existing: IndexSet<&str> = function
            .as_deref()
            .map(|name| {
                input
                    .snapshot
                    .named(name)
                    .filter(|s| s.kind().is_callable())
                    .filter_map(|s| s.version())
                    .collect()
            })
            .unwrap_or_default();

        let mut out: Vec<_> = existing
            .iter()
            .map(|version| {
                Proposal::new(
                    CompletionItem::new(*version, CompletionKind::Version, Origin::Workspace)
                        .with_boost(IN_USE_BOOST)
                        .with_insert_text(quoted(input, version))
                        .with_detail(format!(
                            "existing version of {}",
                            function.as_deref().unwrap_or_default()
                        )),
                    "version already declared",
                )
            })
            .collect();

        out.extend(
            catalog::VERSIONS
                .iter()
                .filter(|v| !existing.contains(**v))
                .map(|version| {
                    Proposal::new(
                        CompletionItem::new(*version, CompletionKind::Version, Origin::Catalog)
                            .with_insert_text(quoted(input, version))
                            .with_detail("suggested version"),
                        "conventional version",
                    )
                }),
        );
        out
    }
}

/// `let`/`const` names declared earlier in the document, nearest first.
pub(super) struct VariableGenerator;

impl Generator for VariableGenerator {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        context.wants_variables()
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let before = input.request.before;
        let scanned = &before[..before.len() - input.context.partial().len()];
        let names: Vec<&str> = LET_RE
            .captures_iter(scanned)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        let mut seen = IndexSet::new();
        for name in names.into_iter().rev() {
            seen.insert(name);
        }
        seen.into_iter()
            .map(|name| {
                Proposal::new(
                    CompletionItem::new(name, CompletionKind::Variable, Origin::Workspace)
                        .with_detail("variable"),
                    "declared above the cursor",
                )
            })
            .collect()
    }
}
