//! Workspace index: per-file parse cache keyed by modification stamp.
//!
//! Each file owns one [`DocumentEntry`]. An entry is never patched: when the
//! observed stamp advances, the file is reparsed and the entry replaced
//! wholesale. Cross-file queries run against a [`WorkspaceSnapshot`], a
//! cheap copy of the entry handles taken at one point in time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::parser;
use super::source::SourceProvider;
use super::symbols::{Parse, Symbol, SymbolKind, select};
use crate::Result;
use crate::base::{FileId, FileStamp};

/// One file's derived tables, tagged with the stamp they were built from.
#[derive(Debug)]
pub struct DocumentEntry {
    pub file: FileId,
    pub path: PathBuf,
    pub stamp: FileStamp,
    pub parse: Parse,
}

/// Stable path ↔ FileId assignment. Ids survive cache clears.
#[derive(Debug, Default)]
struct FileRegistry {
    ids: IndexMap<PathBuf, FileId>,
    paths: FxHashMap<FileId, PathBuf>,
}

impl FileRegistry {
    fn intern(&mut self, path: &Path) -> FileId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        let id = FileId::new(self.ids.len() as u32);
        self.ids.insert(path.to_owned(), id);
        self.paths.insert(id, path.to_owned());
        id
    }
}

/// Mapping from file identity to its [`DocumentEntry`], at most one each.
#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    registry: RwLock<FileRegistry>,
    entries: RwLock<FxHashMap<FileId, Arc<DocumentEntry>>>,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for `path`, assigning one on first sight.
    pub fn file_id(&self, path: &Path) -> FileId {
        if let Some(&id) = self.registry.read().ids.get(path) {
            return id;
        }
        self.registry.write().intern(path)
    }

    /// The id for `path` if it has ever been seen.
    pub fn lookup_file(&self, path: &Path) -> Option<FileId> {
        self.registry.read().ids.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.registry.read().paths.get(&file).cloned()
    }

    /// The cached entry for `file`, regardless of staleness.
    pub fn cached(&self, file: FileId) -> Option<Arc<DocumentEntry>> {
        self.entries.read().get(&file).cloned()
    }

    /// The cached entry if `stamp` has not advanced past it.
    fn fresh(&self, file: FileId, stamp: FileStamp) -> Option<Arc<DocumentEntry>> {
        self.entries
            .read()
            .get(&file)
            .filter(|entry| !stamp.is_newer_than(entry.stamp))
            .cloned()
    }

    /// Parse `text` and atomically replace the entry, unless a newer entry
    /// was installed in the meantime.
    fn install(&self, file: FileId, path: &Path, stamp: FileStamp, text: &str) -> Arc<DocumentEntry> {
        let entry = Arc::new(DocumentEntry {
            file,
            path: path.to_owned(),
            stamp,
            parse: parser::parse(file, text),
        });

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&file) {
            if existing.stamp.is_newer_than(stamp) {
                return existing.clone();
            }
        }
        entries.insert(file, entry.clone());
        entry
    }

    /// Index text the caller already holds (an open editor buffer, a
    /// pre-read file). Reparses only if `stamp` advanced.
    pub fn update(&self, path: &Path, stamp: FileStamp, text: &str) -> Arc<DocumentEntry> {
        let file = self.file_id(path);
        if let Some(entry) = self.fresh(file, stamp) {
            return entry;
        }
        debug!(path = %path.display(), ?stamp, "reparsing supplied text");
        self.install(file, path, stamp, text)
    }

    /// The table for `path`: cached while its stamp is unchanged, otherwise
    /// re-read and reparsed.
    pub async fn get_index_for(
        &self,
        provider: &dyn SourceProvider,
        path: &Path,
    ) -> Result<Arc<DocumentEntry>> {
        let file = self.file_id(path);
        let stamp = provider.stamp(path).await?;
        if let Some(entry) = self.fresh(file, stamp) {
            return Ok(entry);
        }

        let text = provider.read(path).await?;
        debug!(path = %path.display(), ?stamp, "reparsing file");
        Ok(self.install(file, path, stamp, &text))
    }

    /// Every symbol in the workspace matching `predicate`.
    ///
    /// Files are visited one at a time; `cancel` is checked before each and a
    /// cancelled scan returns what it has so far. A file that cannot be read
    /// contributes nothing.
    pub async fn aggregate<F>(
        &self,
        provider: &dyn SourceProvider,
        cancel: &CancellationToken,
        mut predicate: F,
    ) -> Vec<Symbol>
    where
        F: FnMut(&Symbol) -> bool + Send,
    {
        let mut out = Vec::new();
        for entry in self.visit(provider, cancel).await {
            out.extend(entry.parse.all_symbols().filter(|s| predicate(s)).cloned());
        }
        out
    }

    /// Bring every discovered file up to date and snapshot the result.
    pub async fn refresh(
        &self,
        provider: &dyn SourceProvider,
        cancel: &CancellationToken,
    ) -> WorkspaceSnapshot {
        self.visit(provider, cancel).await;
        self.snapshot()
    }

    async fn visit(
        &self,
        provider: &dyn SourceProvider,
        cancel: &CancellationToken,
    ) -> Vec<Arc<DocumentEntry>> {
        let paths = match provider.discover().await {
            Ok(paths) => paths,
            Err(err) => {
                warn!(error = %err, "workspace discovery failed");
                return Vec::new();
            }
        };

        let mut visited = Vec::with_capacity(paths.len());
        for path in paths {
            if cancel.is_cancelled() {
                debug!(visited = visited.len(), "workspace scan cancelled");
                break;
            }
            match self.get_index_for(provider, &path).await {
                Ok(entry) => visited.push(entry),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable file"),
            }
        }
        visited
    }

    /// All cached entries as of now.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot::from_entries(self.entries.read().values().cloned())
    }

    /// Drop the entry for `path`; the next request reparses it.
    pub fn invalidate(&self, path: &Path) {
        if let Some(file) = self.lookup_file(path) {
            self.entries.write().remove(&file);
        }
    }

    /// Drop every entry. File ids stay assigned.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An immutable view of the index: one entry handle per file, ordered by
/// file id.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSnapshot {
    entries: Vec<Arc<DocumentEntry>>,
}

impl WorkspaceSnapshot {
    pub fn from_entries(entries: impl IntoIterator<Item = Arc<DocumentEntry>>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|e| e.file);
        Self { entries }
    }

    pub fn entries(&self) -> &[Arc<DocumentEntry>] {
        &self.entries
    }

    pub fn entry(&self, file: FileId) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.file == file).map(Arc::as_ref)
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().flat_map(|e| e.parse.all_symbols())
    }

    /// Every symbol called `name`, file by file.
    pub fn named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Symbol> {
        self.entries.iter().flat_map(move |e| e.parse.symbols.bucket(name))
    }

    /// Workspace-wide lookup restricted to `kinds`, with the same
    /// owner/version precedence as a single table.
    pub fn find_all(
        &self,
        name: &str,
        version: Option<&str>,
        owner: Option<&str>,
        kinds: impl Fn(SymbolKind) -> bool,
    ) -> Vec<&Symbol> {
        select(self.named(name).filter(|s| kinds(s.kind())), version, owner)
    }

    /// Every label used in the workspace, in order of first use.
    pub fn all_labels(&self) -> IndexSet<SmolStr> {
        self.entries
            .iter()
            .flat_map(|e| e.parse.all_labels())
            .map(SmolStr::new)
            .collect()
    }

    /// Number of symbols carrying `label` across the workspace.
    pub fn label_count(&self, label: &str) -> usize {
        self.entries.iter().map(|e| e.parse.labels.count(label)).sum()
    }

    pub fn symbols_by_label(&self, label: &str) -> Vec<&Symbol> {
        self.entries
            .iter()
            .flat_map(|e| e.parse.symbols_by_label(label))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemorySource;

    fn path(name: &str) -> PathBuf {
        PathBuf::from(format!("/ws/{name}"))
    }

    #[tokio::test]
    async fn test_cached_while_stamp_unchanged() {
        let source = MemorySource::new();
        source.set(path("a.method"), "fn a() {}");
        let index = WorkspaceIndex::new();

        let first = index.get_index_for(&source, &path("a.method")).await.unwrap();
        let second = index.get_index_for(&source, &path("a.method")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.read_count(), 1);
    }

    #[tokio::test]
    async fn test_reparsed_when_stamp_advances_with_same_bytes() {
        let source = MemorySource::new();
        source.set(path("a.method"), "fn a() {}");
        let index = WorkspaceIndex::new();

        let first = index.get_index_for(&source, &path("a.method")).await.unwrap();
        source.touch(&path("a.method"));
        let second = index.get_index_for(&source, &path("a.method")).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.parse, second.parse);
        assert!(second.stamp.is_newer_than(first.stamp));
    }

    #[tokio::test]
    async fn test_aggregate_skips_unreadable_files() {
        let source = MemorySource::new();
        source.set(path("a.method"), "fn alpha() {}");
        source.set(path("b.method"), "fn beta() {}");
        source.set(path("c.method"), "fn gamma() {}");
        source.mark_unreadable(&path("b.method"));
        let index = WorkspaceIndex::new();

        let names: Vec<_> = index
            .aggregate(&source, &CancellationToken::new(), |_| true)
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();

        assert_eq!(names, vec!["alpha", "gamma"]);
    }

    #[tokio::test]
    async fn test_aggregate_cancelled_returns_partial() {
        let source = MemorySource::new();
        source.set(path("a.method"), "fn alpha() {}");
        let index = WorkspaceIndex::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let found = index.aggregate(&source, &cancel, |_| true).await;
        assert!(found.is_empty());
    }

    #[test]
    fn test_update_replaces_only_on_newer_stamp() {
        let index = WorkspaceIndex::new();
        let p = path("open.method");

        let first = index.update(&p, FileStamp::new(1), "fn one() {}");
        let same = index.update(&p, FileStamp::new(1), "fn two() {}");
        assert!(Arc::ptr_eq(&first, &same));

        let newer = index.update(&p, FileStamp::new(2), "fn two() {}");
        assert!(newer.parse.symbols.find("two", None, None).is_some());
        assert!(newer.parse.symbols.find("one", None, None).is_none());
    }

    #[test]
    fn test_snapshot_queries() {
        let index = WorkspaceIndex::new();
        index.update(
            &path("a.method"),
            FileStamp::new(1),
            "@label(\"study\")\nfn read() {}\nclass Book { fn read() {} }\n",
        );
        index.update(&path("b.method"), FileStamp::new(1), "@label(\"focus\")\n@label(\"study\")\nfn recite() {}\n");

        let snapshot = index.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.all_labels().into_iter().collect::<Vec<_>>(), vec!["study", "focus"]);
        assert_eq!(snapshot.label_count("study"), 2);
        assert_eq!(snapshot.symbols_by_label("focus")[0].name, "recite");

        let methods = snapshot.find_all("read", None, Some("Book"), |k| k.is_callable());
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].kind(), SymbolKind::Method);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let index = WorkspaceIndex::new();
        let a = index.update(&path("a.method"), FileStamp::new(1), "fn a() {}");
        index.update(&path("b.method"), FileStamp::new(1), "fn b() {}");

        index.invalidate(&path("a.method"));
        assert!(index.cached(a.file).is_none());
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.file_id(&path("a.method")), a.file);
    }
}
