//! File identifiers and modification stamps.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// An interned identifier for a source file.
///
/// `FileId` is a lightweight handle that uniquely identifies a file within
/// the workspace. The path lives in the workspace index's file registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The last-observed modification time of a file.
///
/// Stamps are only ever compared, never interpreted: a cached table is
/// reused while the stamp stays the same and rebuilt once it advances.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct FileStamp(u128);

impl FileStamp {
    /// A stamp from a raw tick count. Larger means newer.
    #[inline]
    pub const fn new(ticks: u128) -> Self {
        Self(ticks)
    }

    /// Raw tick count.
    #[inline]
    pub const fn ticks(self) -> u128 {
        self.0
    }

    /// Convert a filesystem modification time into a stamp (nanoseconds
    /// since the Unix epoch; times before the epoch clamp to zero).
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self(nanos)
    }

    /// The stamp one tick after this one.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// True if `self` is strictly newer than `other`.
    #[inline]
    pub fn is_newer_than(self, other: FileStamp) -> bool {
        self.0 > other.0
    }
}

impl fmt::Debug for FileStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileStamp({})", self.0)
    }
}
