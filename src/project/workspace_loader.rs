use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::fs::collect_source_files;
use crate::base::FileStamp;
use crate::config::AnalysisConfig;
use crate::hir::WorkspaceIndex;
use crate::{Error, Result};

/// Outcome of a warm-up load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files read, parsed and installed.
    pub loaded: usize,
    /// Files that could not be read, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Loads workspace files into a [`WorkspaceIndex`] up front, in parallel.
///
/// The index is lazy on its own; the loader only saves the first queries
/// from paying for every parse.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceLoader {
    config: AnalysisConfig,
}

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Loads every source file under `root`.
    pub fn load_directory(&self, root: impl AsRef<Path>, index: &WorkspaceIndex) -> Result<LoadReport> {
        let paths = collect_source_files(root.as_ref(), &self.config)?;
        Ok(self.load_files(&paths, index))
    }

    /// Loads the given files. One failure never blocks the others.
    pub fn load_files(&self, paths: &[PathBuf], index: &WorkspaceIndex) -> LoadReport {
        let results: Vec<_> = paths
            .par_iter()
            .map(|path| (path, load_file(path, index)))
            .collect();

        let mut report = LoadReport::default();
        for (path, result) in results {
            match result {
                Ok(()) => report.loaded += 1,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to load file");
                    report.failed.push((path.clone(), err));
                }
            }
        }
        debug!(loaded = report.loaded, failed = report.failed.len(), "workspace warm-up done");
        report
    }
}

fn load_file(path: &Path, index: &WorkspaceIndex) -> Result<()> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(path, e))?;
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    index.update(path, FileStamp::from_system_time(modified), &text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        for i in 0..8 {
            fs::write(dir.path().join(format!("f{i}.method")), format!("fn step{i}() {{}}")).unwrap();
        }
        fs::write(dir.path().join("bad.method"), [0xff, 0xfe, 0x00]).unwrap();
        let index = WorkspaceIndex::new();

        let report = WorkspaceLoader::new().load_directory(dir.path(), &index).unwrap();

        assert_eq!(report.loaded, 8);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, Error::InvalidUtf8(_)));
        assert_eq!(index.snapshot().all_symbols().count(), 8);
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = WorkspaceLoader::new()
            .load_directory(dir.path().join("missing"), &WorkspaceIndex::new())
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryNotFound(_)));
    }
}
