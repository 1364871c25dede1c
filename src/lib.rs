//! # methodic-base
//!
//! Symbol index, context-aware completion and navigation for the methodic
//! procedure language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide      → completion, goto-definition, references, hover, AnalysisHost
//!   ↓
//! hir      → symbols, per-file parser, workspace index, diagnostics
//!   ↓
//! base     → primitives (FileId, FileStamp, LineIndex, lexical helpers)
//!
//! project  → source providers (filesystem, in-memory) and warm-up loading
//! ```

/// Foundation types: FileId, stamps, positions, lexical helpers
pub mod base;

/// Analysis tunables
pub mod config;

mod error;

/// High-level IR: symbols, parser, workspace index
pub mod hir;

/// IDE features: completion, hover, goto-definition, find-references
pub mod ide;

/// Where source text comes from
pub mod project;

pub use config::{AnalysisConfig, DuplicateCheck};
pub use error::{Error, Result};
