//! AnalysisHost: owns every piece of mutable analysis state.
//!
//! The index, the usage learner, the completion cache and the open-document
//! overlay live here, not in globals. Each IDE request refreshes the index
//! from the source provider (reparsing only files whose stamp advanced) and
//! then runs a pure function over the resulting snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::completion::{self, CompletionCache, CompletionItem, CompletionRequest, UsageLearner};
use super::goto;
use super::hover::{self, HoverResult};
use super::references::{self, Reference};
use super::symbols::{self, SymbolInfo};
use crate::Result;
use crate::base::{FileId, FileStamp, LineCol};
use crate::config::AnalysisConfig;
use crate::hir::{Diagnostic, DocumentEntry, ResolveResult, SourceProvider, WorkspaceIndex, WorkspaceSnapshot, check_file};

#[derive(Debug, Clone)]
struct OpenDocument {
    stamp: FileStamp,
    text: Arc<str>,
}

/// The environment's provider with open editor buffers layered on top.
struct Overlay {
    base: Arc<dyn SourceProvider>,
    open: RwLock<IndexMap<PathBuf, OpenDocument>>,
}

impl Overlay {
    fn open_document(&self, path: &Path) -> Option<OpenDocument> {
        self.open.read().get(path).cloned()
    }
}

#[async_trait]
impl SourceProvider for Overlay {
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut paths = self.base.discover().await?;
        let open: Vec<PathBuf> = self.open.read().keys().cloned().collect();
        for path in open {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    async fn stamp(&self, path: &Path) -> Result<FileStamp> {
        match self.open_document(path) {
            Some(doc) => Ok(doc.stamp),
            None => self.base.stamp(path).await,
        }
    }

    async fn read(&self, path: &Path) -> Result<String> {
        match self.open_document(path) {
            Some(doc) => Ok(doc.text.to_string()),
            None => self.base.read(path).await,
        }
    }
}

/// Entry point for editor integrations.
pub struct AnalysisHost {
    config: AnalysisConfig,
    source: Overlay,
    index: WorkspaceIndex,
    learner: RwLock<UsageLearner>,
    cache: CompletionCache,
}

impl AnalysisHost {
    pub fn new(source: Arc<dyn SourceProvider>) -> Self {
        Self::with_config(source, AnalysisConfig::default())
    }

    pub fn with_config(source: Arc<dyn SourceProvider>, config: AnalysisConfig) -> Self {
        Self {
            learner: RwLock::new(UsageLearner::new(config.history_capacity)),
            cache: CompletionCache::new(config.completion_ttl),
            source: Overlay {
                base: source,
                open: RwLock::new(IndexMap::new()),
            },
            index: WorkspaceIndex::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    pub fn usage(&self) -> RwLockReadGuard<'_, UsageLearner> {
        self.learner.read()
    }

    /// Track an editor buffer. Its text shadows the provider's until closed.
    pub fn open_document(&self, path: impl Into<PathBuf>, stamp: FileStamp, text: impl Into<Arc<str>>) -> FileId {
        let path = path.into();
        let text = text.into();
        let entry = self.index.update(&path, stamp, &text);
        self.source.open.write().insert(path, OpenDocument { stamp, text });
        self.cache.invalidate_file(entry.file);
        entry.file
    }

    /// Stop shadowing the provider for `path`.
    pub fn close_document(&self, path: &Path) {
        if self.source.open.write().shift_remove(path).is_some() {
            self.invalidate(path);
        }
    }

    /// Forget the parsed table and cached completions for `path`.
    pub fn invalidate(&self, path: &Path) {
        self.index.invalidate(path);
        if let Some(file) = self.index.lookup_file(path) {
            self.cache.invalidate_file(file);
        }
    }

    /// Drop every cached table, completion list and usage statistic.
    pub fn reset(&self) {
        self.index.clear();
        self.cache.clear();
        self.learner.write().clear();
        debug!("analysis state reset");
    }

    /// Bring the index up to date and snapshot it.
    pub async fn snapshot(&self, cancel: &CancellationToken) -> WorkspaceSnapshot {
        self.index.refresh(&self.source, cancel).await
    }

    /// Ranked completions at the cursor. Repeated queries for the same
    /// position and line text within the TTL are served from the cache.
    pub async fn completions(
        &self,
        path: &Path,
        before: &str,
        after: &str,
        cancel: &CancellationToken,
    ) -> Arc<Vec<CompletionItem>> {
        let file = self.index.file_id(path);
        let request = CompletionRequest::new(file, before, after);
        let key = request.cache_key();
        if let Some(items) = self.cache.get(&key, Instant::now()) {
            return items;
        }

        let snapshot = self.snapshot(cancel).await;
        let items = {
            let learner = self.learner.read();
            Arc::new(completion::completions(
                &snapshot,
                &learner,
                &self.config,
                request,
                SystemTime::now(),
            ))
        };
        self.cache.insert(key, items.clone(), Instant::now());
        items
    }

    /// Feed an accepted completion back into ranking.
    pub fn record_acceptance(&self, label: &str, context: &str) {
        self.learner.write().record(label, context);
    }

    pub async fn goto_definition(&self, path: &Path, pos: LineCol, cancel: &CancellationToken) -> ResolveResult {
        let Some(text) = self.text(path).await else {
            return ResolveResult::NotFound;
        };
        let snapshot = self.snapshot(cancel).await;
        goto::goto_definition(&snapshot, &text, pos)
    }

    pub async fn hover(&self, path: &Path, pos: LineCol, cancel: &CancellationToken) -> Option<HoverResult> {
        let text = self.text(path).await?;
        let snapshot = self.snapshot(cancel).await;
        hover::hover(&snapshot, &text, pos)
    }

    /// References to `name` in every workspace file.
    ///
    /// Files are scanned one at a time; a cancelled scan returns what it
    /// found so far and an unreadable file is skipped.
    pub async fn find_references(
        &self,
        name: &str,
        include_declarations: bool,
        cancel: &CancellationToken,
    ) -> Vec<Reference> {
        let paths = match self.source.discover().await {
            Ok(paths) => paths,
            Err(err) => {
                warn!(error = %err, "workspace discovery failed");
                return Vec::new();
            }
        };

        let mut found = Vec::new();
        for path in paths {
            if cancel.is_cancelled() {
                debug!(found = found.len(), "reference search cancelled");
                break;
            }
            let (entry, text) = match self.load(&path).await {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable file");
                    continue;
                }
            };
            let declarations: Vec<LineCol> = entry
                .parse
                .symbols
                .bucket(name)
                .iter()
                .map(|s| s.position())
                .collect();
            found.extend(references::find_references(
                entry.file,
                &text,
                name,
                &declarations,
                include_declarations,
            ));
        }
        found
    }

    pub async fn document_symbols(&self, path: &Path) -> Result<Vec<SymbolInfo>> {
        let entry = self.index.get_index_for(&self.source, path).await?;
        Ok(symbols::document_symbols(&entry))
    }

    pub async fn workspace_symbols(&self, query: &str, cancel: &CancellationToken) -> Vec<SymbolInfo> {
        symbols::workspace_symbols(&self.snapshot(cancel).await, query)
    }

    /// Advisory diagnostics for one file.
    pub async fn diagnostics(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let entry = self.index.get_index_for(&self.source, path).await?;
        let text = self.source.read(path).await?;
        Ok(check_file(entry.file, &text, &entry.parse, self.config.duplicate_check))
    }

    /// Bring `path` up to date in the index, returning the entry together
    /// with the text it was parsed from.
    async fn load(&self, path: &Path) -> Result<(Arc<DocumentEntry>, String)> {
        let stamp = self.source.stamp(path).await?;
        let text = self.source.read(path).await?;
        let entry = self.index.update(path, stamp, &text);
        Ok((entry, text))
    }

    async fn text(&self, path: &Path) -> Option<String> {
        match self.source.read(path).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read document");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemorySource;

    fn host(files: &[(&str, &str)]) -> (Arc<MemorySource>, AnalysisHost) {
        let source = Arc::new(MemorySource::new());
        for (path, text) in files {
            source.set(*path, *text);
        }
        let host = AnalysisHost::new(source.clone());
        (source, host)
    }

    #[tokio::test]
    async fn test_completion_cache_hit_and_invalidation() {
        let (_source, host) = host(&[("/ws/a.method", "fn review() {}\n")]);
        let cancel = CancellationToken::new();
        let path = Path::new("/ws/b.method");

        let first = host.completions(path, "rev", "", &cancel).await;
        let second = host.completions(path, "rev", "", &cancel).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].label, "review");

        host.open_document(path, FileStamp::new(100), "fn recap() {}\nrev");
        let third = host.completions(path, "fn recap() {}\nrev", "", &cancel).await;
        assert!(third.iter().any(|i| i.label == "recap"));
    }

    #[tokio::test]
    async fn test_cache_distinguishes_text_after_cursor() {
        let (_source, host) = host(&[("/ws/a.method", "fn SQ3R(version: \"classic\") {}\n")]);
        let cancel = CancellationToken::new();
        let path = Path::new("/ws/b.method");

        let open_call = host.completions(path, "SQ3R(ver", "", &cancel).await;
        let in_arguments = host.completions(path, "SQ3R(ver", ")", &cancel).await;

        assert!(!Arc::ptr_eq(&open_call, &in_arguments));
        assert_eq!(open_call[0].label, "SQ3R");
        assert_eq!(in_arguments[0].label, "version");
        assert!(in_arguments.iter().all(|i| i.label != "SQ3R"));
    }

    #[tokio::test]
    async fn test_open_document_shadows_provider() {
        let (_source, host) = host(&[("/ws/a.method", "fn old() {}\n")]);
        let cancel = CancellationToken::new();
        let path = Path::new("/ws/a.method");

        host.open_document(path, FileStamp::new(1_000), "fn fresh() {}\n");
        let names: Vec<_> = host
            .workspace_symbols("", &cancel)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["fresh"]);

        host.close_document(path);
        let names: Vec<_> = host
            .workspace_symbols("", &cancel)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["old"]);
    }

    #[tokio::test]
    async fn test_references_across_files() {
        let (source, host) = host(&[
            ("/ws/a.method", "fn review() {}\n"),
            ("/ws/b.method", "fn study() {\n    review()\n    // review()\n}\n"),
            ("/ws/c.method", "review()\n"),
        ]);
        source.mark_unreadable(Path::new("/ws/c.method"));
        let cancel = CancellationToken::new();

        let refs = host.find_references("review", false, &cancel).await;
        assert_eq!(refs.len(), 1);
        assert_eq!((refs[0].line, refs[0].col), (1, 4));

        let with_decl = host.find_references("review", true, &cancel).await;
        assert_eq!(with_decl.len(), 2);

        cancel.cancel();
        assert!(host.find_references("review", true, &cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_reference_search_reads_each_file_once() {
        let (source, host) = host(&[
            ("/ws/a.method", "fn review() {}\n"),
            ("/ws/b.method", "review()\n"),
        ]);
        let cancel = CancellationToken::new();

        let before = source.read_count();
        let refs = host.find_references("review", true, &cancel).await;
        assert_eq!(refs.len(), 2);
        assert_eq!(source.read_count() - before, 2);

        source.set("/ws/b.method", "\n\nreview()\n");
        let refs = host.find_references("review", false, &cancel).await;
        assert_eq!((refs[0].line, refs[0].col), (2, 0));
        assert_eq!(source.read_count() - before, 4);
    }

    #[tokio::test]
    async fn test_goto_hover_and_diagnostics() {
        let (_source, host) = host(&[(
            "/ws/a.method",
            "/// Survey, question, read, recite, review.\nfn SQ3R(version: \"classic\") {}\nfn SQ3R(version: \"classic\") {}\nfn main() {\n    SQ3R(version: \"classic\")\n",
        )]);
        let cancel = CancellationToken::new();
        let path = Path::new("/ws/a.method");

        let goto = host.goto_definition(path, LineCol::new(4, 5), &cancel).await;
        assert!(goto.is_ambiguous());

        let hover = host.hover(path, LineCol::new(4, 5), &cancel).await.unwrap();
        assert!(hover.contents.contains("Survey, question"));

        let diags = host.diagnostics(path).await.unwrap();
        assert_eq!(diags.len(), 2);
    }

    #[tokio::test]
    async fn test_record_and_reset() {
        let (_source, host) = host(&[]);
        host.record_acceptance("review", "call");
        assert_eq!(host.usage().frequency("review"), 1);

        host.reset();
        assert!(host.usage().is_empty());
        assert!(host.index().is_empty());
    }
}
