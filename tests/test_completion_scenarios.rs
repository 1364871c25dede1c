//! End-to-end completion: classify, generate and rank against a small
//! workspace.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use methodic::AnalysisConfig;
use methodic::base::FileStamp;
use methodic::hir::WorkspaceIndex;
use methodic::ide::{AnalysisHost, CompletionItem, CompletionRequest, Origin, UsageLearner, completions};
use methodic::project::MemorySource;
use tokio_util::sync::CancellationToken;

const METHODS: &str = "\
@label(\"study\")
fn SQ3R(version: \"classic\") {}
@label(\"study\")
fn SQ3R(version: \"academic\") {}
@label(\"mnemonics\")
fn review() {}
fn revise() {}
fn relax() {}
";

fn workspace() -> WorkspaceIndex {
    let index = WorkspaceIndex::new();
    index.update(Path::new("/ws/methods.method"), FileStamp::new(1), METHODS);
    index
}

fn complete_with(index: &WorkspaceIndex, learner: &UsageLearner, before: &str, after: &str, now: SystemTime) -> Vec<CompletionItem> {
    let file = index.file_id(Path::new("/ws/notes.method"));
    completions(
        &index.snapshot(),
        learner,
        &AnalysisConfig::default(),
        CompletionRequest::new(file, before, after),
        now,
    )
}

fn complete(before: &str, after: &str) -> Vec<CompletionItem> {
    complete_with(&workspace(), &UsageLearner::default(), before, after, SystemTime::now())
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

#[test]
fn test_overloads_collapse_into_one_call_candidate() {
    let items = complete("    SQ3", "");

    let sq3r: Vec<_> = items.iter().filter(|i| i.label == "SQ3R").collect();
    assert_eq!(sq3r.len(), 1);
    assert_eq!(items[0].label, "SQ3R");

    let detail = items[0].detail.as_deref().unwrap_or_default();
    assert!(detail.contains("function"), "{detail}");
    assert!(detail.contains("classic") && detail.contains("academic"), "{detail}");
}

#[test]
fn test_existing_versions_precede_the_catalog() {
    let items = complete("    SQ3R(version: \"", "\")");

    let mut existing = labels(&items[..2]);
    existing.sort_unstable();
    assert_eq!(existing, vec!["academic", "classic"]);
    assert!(items[..2].iter().all(|i| i.origin == Origin::Workspace));

    let rest = &items[2..];
    assert!(!rest.is_empty());
    assert!(rest.iter().all(|i| i.origin == Origin::Catalog));
    assert!(!labels(rest).iter().any(|l| *l == "classic" || *l == "academic"));
}

#[test]
fn test_labels_in_use_come_first_and_are_not_repeated() {
    let items = complete("@label(\"", "\")");

    assert_eq!(labels(&items[..2]), vec!["mnemonics", "study"]);
    assert_eq!(items[1].detail.as_deref(), Some("existing label · 2 uses"));
    assert_eq!(labels(&items).iter().filter(|l| **l == "study").count(), 1);
    assert!(items[2..].iter().all(|i| i.origin == Origin::Catalog));
}

#[test]
fn test_matching_keyword_outranks_unrelated_symbol() {
    let index = WorkspaceIndex::new();
    index.update(Path::new("/ws/other.method"), FileStamp::new(1), "fn zzz() {}\n");
    let items = complete_with(&index, &UsageLearner::default(), "fn a() {\n    ret", "", SystemTime::now());

    assert_eq!(items[0].label, "return");
    assert_eq!(items[0].origin, Origin::Catalog);
    let zzz = items.iter().position(|i| i.label == "zzz").unwrap();
    assert!(zzz > 0);
}

#[test]
fn test_frequency_lifts_a_candidate() {
    let index = workspace();
    let now = SystemTime::now();
    let mut learner = UsageLearner::default();

    let items = complete_with(&index, &learner, "rev", "", now);
    assert_eq!(labels(&items[..2]), vec!["review", "revise"]);

    learner.record_at("revise", "call", now - Duration::from_secs(3 * 3600));
    let items = complete_with(&index, &learner, "rev", "", now);
    assert_eq!(labels(&items[..2]), vec!["revise", "review"]);
}

#[test]
fn test_recency_breaks_equal_frequency() {
    let index = workspace();
    let now = SystemTime::now();
    let mut learner = UsageLearner::default();
    learner.record_at("revise", "call", now - Duration::from_secs(600));
    learner.record_at("review", "call", now - Duration::from_secs(30));

    let items = complete_with(&index, &learner, "rev", "", now);
    assert_eq!(labels(&items[..2]), vec!["review", "revise"]);
}

#[tokio::test]
async fn test_host_serves_completions_from_open_documents() {
    let source = Arc::new(MemorySource::new());
    source.set("/ws/methods.method", METHODS);
    let host = AnalysisHost::new(source);
    let cancel = CancellationToken::new();
    let path = Path::new("/ws/draft.method");

    let text = "fn outline() {}\nfn main() {\n    out";
    host.open_document(path, FileStamp::new(10), text);
    let items = host.completions(path, text, "\n}", &cancel).await;
    assert_eq!(items[0].label, "outline");

    host.record_acceptance("SQ3R", "call");
    assert_eq!(host.usage().frequency("SQ3R"), 1);
}
