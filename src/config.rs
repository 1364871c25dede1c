//! Analysis configuration.

use std::time::Duration;

/// How duplicate declarations are reported.
///
/// Two declarations are duplicates when they share kind family, name, owner
/// and version. Whether two declarations *without* a version tag count is a
/// policy choice, so it is configurable. Duplicates are always advisory
/// warnings, never parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateCheck {
    /// No duplicate diagnostics.
    Off,
    /// Only declarations carrying the same explicit version tag.
    #[default]
    VersionedOnly,
    /// Versioned and unversioned declarations alike.
    All,
}

/// Tunables for completion, ranking and workspace discovery.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// How long a computed completion list is reused for the same query.
    pub completion_ttl: Duration,
    /// Size of the accepted-completion history ring.
    pub history_capacity: usize,
    /// Lines above/below the cursor considered by the proximity heuristic.
    pub proximity_window: u32,
    /// Number of most-frequently-used symbols suggested.
    pub frequent_limit: usize,
    /// Number of recently-used symbols suggested.
    pub recency_limit: usize,
    /// Minimum name similarity for the relatedness heuristic (exclusive).
    pub similarity_threshold: f64,
    pub duplicate_check: DuplicateCheck,
    /// Extensions (without the dot) of source files in a workspace.
    pub file_extensions: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            completion_ttl: Duration::from_secs(30),
            history_capacity: 50,
            proximity_window: 10,
            frequent_limit: 5,
            recency_limit: 5,
            similarity_threshold: 0.3,
            duplicate_check: DuplicateCheck::default(),
            file_extensions: vec!["method".to_string(), "mth".to_string()],
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completion_ttl(mut self, ttl: Duration) -> Self {
        self.completion_ttl = ttl;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn with_proximity_window(mut self, lines: u32) -> Self {
        self.proximity_window = lines;
        self
    }

    pub fn with_duplicate_check(mut self, check: DuplicateCheck) -> Self {
        self.duplicate_check = check;
        self
    }

    pub fn with_file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// True if `path` has one of the configured source extensions.
    pub fn is_source_file(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.completion_ttl, Duration::from_secs(30));
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.proximity_window, 10);
        assert_eq!(config.duplicate_check, DuplicateCheck::VersionedOnly);
    }

    #[test]
    fn test_is_source_file() {
        let config = AnalysisConfig::new().with_file_extensions(["wf"]);
        assert!(config.is_source_file(Path::new("/w/plan.wf")));
        assert!(!config.is_source_file(Path::new("/w/plan.method")));
        assert!(!config.is_source_file(Path::new("/w/README")));
    }
}
