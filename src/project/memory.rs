//! In-memory source provider for unsaved buffers and tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::FileStamp;
use crate::hir::SourceProvider;
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct MemoryFile {
    stamp: FileStamp,
    text: Arc<str>,
    unreadable: bool,
}

#[derive(Debug, Default)]
struct Files {
    clock: FileStamp,
    files: IndexMap<PathBuf, MemoryFile>,
}

impl Files {
    fn tick(&mut self) -> FileStamp {
        self.clock = self.clock.next();
        self.clock
    }
}

/// A [`SourceProvider`] over a map of path → text.
///
/// Every `set` or `touch` advances the file's stamp. Files are discovered in
/// insertion order.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<Files>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file, advancing its stamp.
    pub fn set(&self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> FileStamp {
        let mut files = self.files.write();
        let stamp = files.tick();
        files.files.insert(
            path.into(),
            MemoryFile {
                stamp,
                text: text.into(),
                unreadable: false,
            },
        );
        stamp
    }

    /// Insert or replace a file with an explicit stamp.
    pub fn set_with_stamp(&self, path: impl Into<PathBuf>, stamp: FileStamp, text: impl Into<Arc<str>>) {
        let mut files = self.files.write();
        if stamp > files.clock {
            files.clock = stamp;
        }
        files.files.insert(
            path.into(),
            MemoryFile {
                stamp,
                text: text.into(),
                unreadable: false,
            },
        );
    }

    /// Advance a file's stamp without changing its text.
    pub fn touch(&self, path: &Path) -> Option<FileStamp> {
        let mut files = self.files.write();
        let stamp = files.tick();
        let file = files.files.get_mut(path)?;
        file.stamp = stamp;
        Some(stamp)
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files.write().files.shift_remove(path).is_some()
    }

    /// Make `read` fail for this file while keeping it discoverable.
    pub fn mark_unreadable(&self, path: &Path) {
        if let Some(file) = self.files.write().files.get_mut(path) {
            file.unreadable = true;
        }
    }

    /// Number of successful `read` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    fn file(&self, path: &Path) -> Result<MemoryFile> {
        self.files
            .read()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileNotFound(path.to_owned()))
    }
}

#[async_trait]
impl SourceProvider for MemorySource {
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.read().files.keys().cloned().collect())
    }

    async fn stamp(&self, path: &Path) -> Result<FileStamp> {
        self.file(path).map(|f| f.stamp)
    }

    async fn read(&self, path: &Path) -> Result<String> {
        let file = self.file(path)?;
        if file.unreadable {
            return Err(Error::io(
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(file.text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stamps_advance() {
        let source = MemorySource::new();
        let a = Path::new("/a.method");
        let first = source.set(a, "fn a() {}");
        let touched = source.touch(a).unwrap();

        assert!(touched.is_newer_than(first));
        assert_eq!(source.stamp(a).await.unwrap(), touched);
        assert!(source.touch(Path::new("/missing.method")).is_none());
    }

    #[tokio::test]
    async fn test_discover_in_insertion_order() {
        let source = MemorySource::new();
        source.set("/z.method", "");
        source.set("/a.method", "");

        let paths = source.discover().await.unwrap();
        assert_eq!(paths, vec![PathBuf::from("/z.method"), PathBuf::from("/a.method")]);
    }

    #[tokio::test]
    async fn test_unreadable_and_missing() {
        let source = MemorySource::new();
        source.set("/a.method", "fn a() {}");
        source.mark_unreadable(Path::new("/a.method"));

        assert!(matches!(source.read(Path::new("/a.method")).await, Err(Error::Io { .. })));
        assert!(matches!(
            source.stamp(Path::new("/b.method")).await,
            Err(Error::FileNotFound(_))
        ));
        assert_eq!(source.read_count(), 0);
    }
}
