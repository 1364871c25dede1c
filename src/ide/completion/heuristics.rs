//! Intelligent suggestions for when no syntactic context applies.
//!
//! Each heuristic is its own [`Generator`]; their proposals are merged and
//! scored like any other.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use super::catalog;
use super::generators::{symbol_group_item, symbol_item};
use super::{CompletionInput, CompletionItem, CompletionKind, Generator, Origin, Proposal};
use crate::base::text::{IDENT, similarity, unclosed_braces};
use crate::hir::{Symbol, WorkspaceSnapshot};
use crate::ide::context::{CompletionContext, current_line};

static CHAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({IDENT})\s*\([^()]*\)\s*;?\s*$")).expect("chain pattern must compile")
});

static CONSTRUCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(if|else|for|while)\b").expect("construct pattern must compile"));

pub(super) fn all() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(RelatedGenerator),
        Box::new(FrequentGenerator),
        Box::new(RecentGenerator),
        Box::new(ProximityGenerator),
        Box::new(SemanticGenerator),
        Box::new(ChainGenerator),
        Box::new(ControlFlowGenerator),
    ]
}

fn intelligent(context: &CompletionContext) -> bool {
    matches!(context, CompletionContext::Intelligent { .. })
}

/// One item per name, in first-seen order.
fn grouped<'a>(symbols: impl IntoIterator<Item = &'a Symbol>, rationale: &str) -> Vec<Proposal> {
    let mut groups: IndexMap<&str, Vec<&Symbol>> = IndexMap::new();
    for symbol in symbols {
        groups.entry(symbol.name.as_str()).or_default().push(symbol);
    }
    groups
        .values()
        .filter_map(|group| symbol_group_item(group))
        .map(|item| Proposal::new(item, rationale))
        .collect()
}

/// Items for usage-history names that still exist in the workspace.
fn known_names(snapshot: &WorkspaceSnapshot, names: &[SmolStr], rationale: &str) -> Vec<Proposal> {
    names
        .iter()
        .filter_map(|name| {
            let group: Vec<_> = snapshot.named(name).collect();
            symbol_group_item(&group)
        })
        .map(|item| Proposal::new(item, rationale))
        .collect()
}

/// Callables sharing a label with, or named like, the enclosing method.
pub(super) struct RelatedGenerator;

impl Generator for RelatedGenerator {
    fn name(&self) -> &'static str {
        "related"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let Some(current) = input.enclosing else {
            return Vec::new();
        };
        let anchors: Vec<_> = input
            .snapshot
            .named(current)
            .filter(|s| s.kind().is_callable())
            .collect();

        let related = input.snapshot.all_symbols().filter(|s| {
            s.kind().is_callable()
                && s.name != current
                && (anchors.iter().any(|a| a.shares_label_with(s))
                    || similarity(&s.name, current) > input.config.similarity_threshold)
        });
        grouped(related, "related to the enclosing method")
    }
}

pub(super) struct FrequentGenerator;

impl Generator for FrequentGenerator {
    fn name(&self) -> &'static str {
        "frequent"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let names = input.learner.most_frequent(input.config.frequent_limit);
        known_names(input.snapshot, &names, "frequently used")
    }
}

pub(super) struct RecentGenerator;

impl Generator for RecentGenerator {
    fn name(&self) -> &'static str {
        "recent"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let names = input.learner.recent(input.config.recency_limit);
        known_names(input.snapshot, &names, "recently used")
    }
}

/// Symbols declared near the cursor in the same document, nearest first.
pub(super) struct ProximityGenerator;

impl Generator for ProximityGenerator {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let Some(entry) = input.snapshot.entry(input.request.file) else {
            return Vec::new();
        };
        let line = input.request.line();
        let window = input.config.proximity_window;

        let mut near: Vec<_> = entry
            .parse
            .all_symbols()
            .filter(|s| s.start_line.abs_diff(line) <= window)
            .collect();
        near.sort_by_key(|s| (s.start_line.abs_diff(line), s.start_line));

        near.into_iter()
            .filter_map(symbol_item)
            .map(|item| Proposal::new(item, "declared nearby"))
            .collect()
    }
}

/// Canonical method names for trigger words in the current line.
pub(super) struct SemanticGenerator;

impl Generator for SemanticGenerator {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let text = current_line(input.request.before).to_lowercase();
        let mut out = Vec::new();

        for (trigger, canonical) in catalog::SEMANTIC_MAP {
            if !text.contains(trigger) {
                continue;
            }
            for name in *canonical {
                let wanted = name.to_lowercase();
                let real: Vec<_> = input
                    .snapshot
                    .all_symbols()
                    .filter(|s| s.kind().is_callable() && overlaps(&s.name.to_lowercase(), &wanted))
                    .collect();

                if real.is_empty() {
                    let item = CompletionItem::new(*name, CompletionKind::Function, Origin::Catalog)
                        .with_insert_text(format!("{name}($1)"))
                        .with_detail(format!("suggested method for \"{trigger}\""));
                    out.push(Proposal::new(item, "semantic suggestion"));
                } else {
                    out.extend(grouped(real, "matches a semantic suggestion"));
                }
            }
        }
        out
    }
}

fn overlaps(name: &str, wanted: &str) -> bool {
    name == wanted || (name.len() >= 3 && wanted.contains(name)) || name.contains(wanted)
}

/// After `step();`, the callables that share a label with `step`.
pub(super) struct ChainGenerator;

impl Generator for ChainGenerator {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let line = current_line(input.request.before);
        let Some(called) = CHAIN_RE.captures(line).and_then(|c| c.get(1)) else {
            return Vec::new();
        };
        let called = called.as_str();
        let previous: Vec<_> = input.snapshot.named(called).collect();

        let next = input.snapshot.all_symbols().filter(|s| {
            s.kind().is_callable() && s.name != called && previous.iter().any(|p| p.shares_label_with(s))
        });
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();

        grouped(next, "continues the sequence")
            .into_iter()
            .map(|mut proposal| {
                proposal.item.insert_text = format!("\n{indent}{}", proposal.item.insert_text);
                proposal
            })
            .collect()
    }
}

/// Validation-flavoured names inside `if`/`else`, iteration-flavoured
/// names inside `for`/`while`.
pub(super) struct ControlFlowGenerator;

impl Generator for ControlFlowGenerator {
    fn name(&self) -> &'static str {
        "control-flow"
    }

    fn applies(&self, context: &CompletionContext) -> bool {
        intelligent(context)
    }

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal> {
        let before = input.request.before;
        let Some(construct) = enclosing_construct(before) else {
            return Vec::new();
        };

        let wanted: fn(&str) -> bool = match construct {
            "if" | "else" => |name| {
                catalog::VALIDATION_HINTS.iter().any(|h| name.contains(h))
                    || catalog::PREDICATE_PREFIXES.iter().any(|p| name.starts_with(p))
            },
            _ => |name| catalog::ITERATION_HINTS.iter().any(|h| name.contains(h)),
        };
        let matching = input
            .snapshot
            .all_symbols()
            .filter(|s| s.kind().is_callable() && wanted(&s.name.to_lowercase()));
        grouped(matching, "fits the enclosing construct")
    }
}

/// The control keyword that opened the innermost unclosed block, if any.
fn enclosing_construct(before: &str) -> Option<&str> {
    let open = *unclosed_braces(before).last()?;
    let header = current_line(&before[..open]);
    CONSTRUCT_RE
        .find_iter(header)
        .last()
        .map(|m| m.as_str())
}
