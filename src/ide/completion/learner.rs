//! Usage learner: what the user actually accepts.

use std::collections::VecDeque;
use std::time::SystemTime;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Per-name acceptance statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageRecord {
    pub frequency: u32,
    pub last_used: SystemTime,
    /// Context tags the name was accepted under, first use first.
    pub contexts: IndexSet<SmolStr>,
}

/// Acceptance counters plus a bounded FIFO history of accepted names.
///
/// Only [`record`](Self::record) mutates it; completion queries read it.
#[derive(Clone, Debug)]
pub struct UsageLearner {
    records: FxHashMap<SmolStr, UsageRecord>,
    history: VecDeque<SmolStr>,
    capacity: usize,
}

impl Default for UsageLearner {
    fn default() -> Self {
        Self::new(50)
    }
}

impl UsageLearner {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: FxHashMap::default(),
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an accepted completion now.
    pub fn record(&mut self, name: &str, context: &str) {
        self.record_at(name, context, SystemTime::now());
    }

    pub fn record_at(&mut self, name: &str, context: &str, at: SystemTime) {
        let name = SmolStr::new(name);
        let record = self
            .records
            .entry(name.clone())
            .or_insert_with(|| UsageRecord {
                frequency: 0,
                last_used: at,
                contexts: IndexSet::new(),
            });
        record.frequency = record.frequency.saturating_add(1);
        record.last_used = record.last_used.max(at);
        record.contexts.insert(SmolStr::new(context));

        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(name);
    }

    pub fn usage(&self, name: &str) -> Option<&UsageRecord> {
        self.records.get(name)
    }

    pub fn frequency(&self, name: &str) -> u32 {
        self.records.get(name).map_or(0, |r| r.frequency)
    }

    pub fn last_used(&self, name: &str) -> Option<SystemTime> {
        self.records.get(name).map(|r| r.last_used)
    }

    /// Up to `limit` names, most frequent first; ties go to the more recent.
    pub fn most_frequent(&self, limit: usize) -> Vec<SmolStr> {
        let mut all: Vec<_> = self.records.iter().collect();
        all.sort_by(|(a_name, a), (b_name, b)| {
            b.frequency
                .cmp(&a.frequency)
                .then(b.last_used.cmp(&a.last_used))
                .then(a_name.cmp(b_name))
        });
        all.into_iter().take(limit).map(|(name, _)| name.clone()).collect()
    }

    /// Up to `limit` distinct names from the history, newest first.
    pub fn recent(&self, limit: usize) -> Vec<SmolStr> {
        let mut seen = IndexSet::new();
        for name in self.history.iter().rev() {
            if seen.len() == limit {
                break;
            }
            seen.insert(name.clone());
        }
        seen.into_iter().collect()
    }

    /// Accepted names, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(SmolStr::as_str)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.history.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
