//! Completion: context-aware candidates from independent generators.
//!
//! ```text
//! classify_at(before, after)      → CompletionContext
//!   ↓
//! generators (registered list)    → Proposal { item, rationale }, merged by label
//!   ↓
//! rank                            → scored, sorted CompletionItems
//! ```
//!
//! Every generator is a pure function of its [`CompletionInput`]. The only
//! mutable state involved, the [`UsageLearner`], is read here and written
//! only when a candidate is accepted.

mod cache;
pub mod catalog;
mod generators;
mod heuristics;
mod learner;
mod ranking;

use std::time::SystemTime;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use smol_str::SmolStr;
use tracing::debug;

use super::context::{CompletionContext, classify_at, current_line, enclosing_function};
use crate::base::FileId;
use crate::config::AnalysisConfig;
use crate::hir::WorkspaceSnapshot;

pub use cache::{CacheKey, CompletionCache};
pub use learner::{UsageLearner, UsageRecord};
pub use ranking::{RankContext, rank, score};

/// What a completion inserts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Function,
    Pipeline,
    Method,
    Class,
    TypeAlias,
    Macro,
    Constant,
    Keyword,
    Type,
    Parameter,
    Label,
    Version,
    Variable,
}

/// Whether a candidate refers to something that exists in the workspace or
/// is only a suggestion from a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    Workspace,
    Catalog,
}

/// A single proposed completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: SmolStr,
    pub kind: CompletionKind,
    /// Text to insert; may contain `$1`-style cursor stops.
    pub insert_text: String,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub origin: Origin,
    /// Added to the ranked score by the generator that proposed the item.
    pub boost: u32,
    /// Filled in by [`rank`].
    pub score: u32,
    /// Filled in by [`rank`]; ascending order is best-first.
    pub sort_key: String,
}

impl CompletionItem {
    pub fn new(label: impl Into<SmolStr>, kind: CompletionKind, origin: Origin) -> Self {
        let label = label.into();
        Self {
            insert_text: label.to_string(),
            label,
            kind,
            detail: None,
            documentation: None,
            origin,
            boost: 0,
            score: 0,
            sort_key: String::new(),
        }
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = text.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, doc: Option<impl Into<String>>) -> Self {
        self.documentation = doc.map(Into::into);
        self
    }

    pub fn with_boost(mut self, boost: u32) -> Self {
        self.boost = boost;
        self
    }

    /// True if the insert text has cursor stops.
    pub fn is_snippet(&self) -> bool {
        self.insert_text.contains('$')
    }
}

/// A candidate and why it was proposed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub item: CompletionItem,
    pub rationale: SmolStr,
}

impl Proposal {
    pub fn new(item: CompletionItem, rationale: impl Into<SmolStr>) -> Self {
        Self {
            item,
            rationale: rationale.into(),
        }
    }
}

/// A completion query: the document and the text on either side of the
/// cursor.
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    pub file: FileId,
    pub before: &'a str,
    pub after: &'a str,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(file: FileId, before: &'a str, after: &'a str) -> Self {
        Self { file, before, after }
    }

    /// Cursor line (0-indexed).
    pub fn line(&self) -> u32 {
        self.before.matches('\n').count() as u32
    }

    /// Cursor column in bytes (0-indexed).
    pub fn col(&self) -> u32 {
        current_line(self.before).len() as u32
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            file: self.file,
            line: self.line(),
            col: self.col(),
            tail: SmolStr::new(current_line(self.before)),
            rest: SmolStr::new(self.after.split('\n').next().unwrap_or_default()),
        }
    }
}

/// Everything a generator may look at.
#[derive(Clone, Copy)]
pub struct CompletionInput<'a> {
    pub context: &'a CompletionContext,
    pub snapshot: &'a WorkspaceSnapshot,
    pub learner: &'a UsageLearner,
    pub config: &'a AnalysisConfig,
    pub request: CompletionRequest<'a>,
    /// Name of the method whose body contains the cursor.
    pub enclosing: Option<&'a str>,
}

/// One independent source of candidates.
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies(&self, context: &CompletionContext) -> bool;

    fn generate(&self, input: &CompletionInput<'_>) -> Vec<Proposal>;
}

static GENERATORS: Lazy<Vec<Box<dyn Generator>>> = Lazy::new(|| {
    let mut all = generators::contextual();
    all.extend(heuristics::all());
    // Last, so any other proposal with the same label wins the merge.
    all.push(Box::new(generators::VariableGenerator));
    all
});

/// The registered generators, in merge order.
pub fn default_generators() -> &'static [Box<dyn Generator>] {
    &GENERATORS
}

/// Run every applicable generator and merge proposals by label, keeping the
/// first proposal for each label.
pub fn generate_candidates(generators: &[Box<dyn Generator>], input: &CompletionInput<'_>) -> Vec<Proposal> {
    let mut merged: IndexMap<SmolStr, Proposal> = IndexMap::new();
    for generator in generators.iter().filter(|g| g.applies(input.context)) {
        let proposals = generator.generate(input);
        debug!(generator = generator.name(), count = proposals.len(), "generated");
        for proposal in proposals {
            merged.entry(proposal.item.label.clone()).or_insert(proposal);
        }
    }
    merged.into_values().collect()
}

/// Classify, generate and rank in one go.
pub fn completions(
    snapshot: &WorkspaceSnapshot,
    learner: &UsageLearner,
    config: &AnalysisConfig,
    request: CompletionRequest<'_>,
    now: SystemTime,
) -> Vec<CompletionItem> {
    let context = classify_at(request.before, request.after);
    let enclosing = enclosing_function(request.before);
    let input = CompletionInput {
        context: &context,
        snapshot,
        learner,
        config,
        request,
        enclosing: enclosing.as_deref(),
    };

    let items = generate_candidates(default_generators(), &input)
        .into_iter()
        .map(|p| p.item)
        .collect();
    let ranked = rank(
        items,
        &RankContext {
            partial: context.partial(),
            learner,
            enclosing: enclosing.as_deref(),
            now,
        },
    );
    debug!(context = context.tag(), count = ranked.len(), "completions ranked");
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileStamp;
    use crate::hir::WorkspaceIndex;
    use std::path::Path;

    const DOC: &str = "\
@label(\"study\")
fn SQ3R(version: \"classic\") {}
@label(\"study\")
fn SQ3R(version: \"academic\") {}
pipeline Morning
";

    fn run(before: &str, after: &str) -> Vec<CompletionItem> {
        let index = WorkspaceIndex::new();
        let entry = index.update(Path::new("/ws/study.method"), FileStamp::new(1), DOC);
        completions(
            &index.snapshot(),
            &UsageLearner::default(),
            &AnalysisConfig::default(),
            CompletionRequest::new(entry.file, before, after),
            SystemTime::now(),
        )
    }

    #[test]
    fn test_request_position() {
        let request = CompletionRequest::new(FileId::new(0), "a\nbc\n  de", "");
        assert_eq!((request.line(), request.col()), (2, 4));
        assert_eq!(request.cache_key().tail, "  de");

        let request = CompletionRequest::new(FileId::new(0), "f(x", ")\nnext");
        assert_eq!(request.cache_key().rest, ")");
    }

    #[test]
    fn test_call_candidates_are_deduplicated_by_name() {
        let items = run("SQ3", "");
        let sq3r: Vec<_> = items.iter().filter(|i| i.label == "SQ3R").collect();

        assert_eq!(sq3r.len(), 1);
        assert!(sq3r[0].detail.as_deref().unwrap().contains("function"));
        assert_eq!(items[0].label, "SQ3R");
    }

    #[test]
    fn test_labels_merge_first_proposal() {
        let items = run("@label(\"", "\")");
        let study = items.iter().find(|i| i.label == "study").unwrap();

        assert_eq!(study.origin, Origin::Workspace);
        assert_eq!(items.iter().filter(|i| i.label == "study").count(), 1);
        assert_eq!(items[0].label, "study");
    }

    #[test]
    fn test_generator_order_keeps_variable_overlay_last() {
        let names: Vec<_> = default_generators().iter().map(|g| g.name()).collect();
        assert_eq!(names.first(), Some(&"label"));
        assert_eq!(names.last(), Some(&"variable"));
    }
}
