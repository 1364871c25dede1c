//! Errors raised at the file-access boundary.
//!
//! Parsing, classification and ranking never fail; only reading sources
//! from the environment can.

use std::path::PathBuf;

/// Errors from retrieving or enumerating source files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(PathBuf),
}

impl Error {
    /// Wrap an I/O error, mapping `NotFound` and invalid data onto the
    /// dedicated variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path),
            std::io::ErrorKind::InvalidData => Error::InvalidUtf8(path),
            _ => Error::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
