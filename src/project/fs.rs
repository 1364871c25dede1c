//! Filesystem source provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::base::FileStamp;
use crate::config::AnalysisConfig;
use crate::hir::SourceProvider;
use crate::{Error, Result};

/// Every file under `root` whose extension is one of the configured source
/// extensions, in a stable (sorted) order.
pub fn collect_source_files(root: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::DirectoryNotFound(root.to_owned()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && config.is_source_file(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
            Err(err) => warn!(root = %root.display(), error = %err, "skipping unreadable directory entry"),
        }
    }
    debug!(root = %root.display(), files = paths.len(), "discovered source files");
    Ok(paths)
}

/// A [`SourceProvider`] rooted at a workspace directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    config: AnalysisConfig,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, AnalysisConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: AnalysisConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl SourceProvider for FsSource {
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = self.root.clone();
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || collect_source_files(&root, &config))
            .await
            .map_err(|err| Error::io(&self.root, std::io::Error::other(err)))?
    }

    async fn stamp(&self, path: &Path) -> Result<FileStamp> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| Error::io(path, e))?;
        let modified = metadata.modified().map_err(|e| Error::io(path, e))?;
        Ok(FileStamp::from_system_time(modified))
    }

    async fn read(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path).await.map_err(|e| Error::io(path, e))
    }
}
