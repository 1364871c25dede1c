//! Access to source files owned by the environment.
//!
//! The index never owns file contents. It asks a [`SourceProvider`] which
//! files exist, when each was last modified, and (only when that stamp has
//! advanced) for the current text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::Result;
use crate::base::FileStamp;

/// Enumerates and reads source files.
///
/// Retrieval is asynchronous; everything built on top of it (parsing,
/// lookups) is synchronous.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Every source file currently in the workspace.
    async fn discover(&self) -> Result<Vec<PathBuf>>;

    /// The file's last-modified stamp.
    async fn stamp(&self, path: &Path) -> Result<FileStamp>;

    /// The file's current text.
    async fn read(&self, path: &Path) -> Result<String>;
}
