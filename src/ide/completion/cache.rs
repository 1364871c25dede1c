//! Short-lived cache of ranked completion lists.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::CompletionItem;
use crate::base::FileId;

/// What a cached list was computed for: document, cursor, and the cursor
/// line's text on both sides.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub tail: SmolStr,
    /// Rest of the line after the cursor.
    pub rest: SmolStr,
}

#[derive(Debug)]
struct CacheEntry {
    stored: Instant,
    items: Arc<Vec<CompletionItem>>,
}

/// Completion lists keyed by [`CacheKey`], each valid for `ttl`.
#[derive(Debug)]
pub struct CompletionCache {
    ttl: Duration,
    entries: Mutex<FxHashMap<CacheKey, CacheEntry>>,
}

impl CompletionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn get(&self, key: &CacheKey, now: Instant) -> Option<Arc<Vec<CompletionItem>>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored) < self.ttl => {
                debug!(line = key.line, col = key.col, "completion cache hit");
                Some(entry.items.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, items: Arc<Vec<CompletionItem>>, now: Instant) {
        let mut entries = self.entries.lock();
        entries.retain(|_, e| now.saturating_duration_since(e.stored) < self.ttl);
        entries.insert(key, CacheEntry { stored: now, items });
    }

    /// Drop every list computed for `file`.
    pub fn invalidate_file(&self, file: FileId) {
        self.entries.lock().retain(|key, _| key.file != file);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(file: u32, tail: &str) -> CacheKey {
        CacheKey {
            file: FileId::new(file),
            line: 3,
            col: tail.len() as u32,
            tail: tail.into(),
            rest: SmolStr::default(),
        }
    }

    #[test]
    fn test_hit_within_ttl_then_expire() {
        let cache = CompletionCache::new(Duration::from_secs(30));
        let t0 = Instant::now();
        cache.insert(key(0, "SQ"), Arc::new(Vec::new()), t0);

        assert!(cache.get(&key(0, "SQ"), t0 + Duration::from_secs(29)).is_some());
        assert!(cache.get(&key(0, "SQ3"), t0).is_none());
        assert!(cache.get(&key(0, "SQ"), t0 + Duration::from_secs(30)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_file() {
        let cache = CompletionCache::new(Duration::from_secs(30));
        let now = Instant::now();
        cache.insert(key(0, "a"), Arc::new(Vec::new()), now);
        cache.insert(key(1, "a"), Arc::new(Vec::new()), now);

        cache.invalidate_file(FileId::new(0));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
