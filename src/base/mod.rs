//! Foundation types for the methodic toolchain.
//!
//! - [`FileId`], [`FileStamp`] - file identity and modification stamps
//! - [`TextRange`], [`TextSize`], [`LineCol`], [`LineIndex`] - positions
//! - [`text`] - quote-aware lexical helpers
//!
//! This module has NO dependencies on other methodic modules.

mod file;
mod span;
pub mod text;

pub use file::{FileId, FileStamp};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
