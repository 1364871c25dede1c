//! High-level IR: symbols, per-file tables and the workspace index.
//!
//! ## Layers
//!
//! ```text
//! SourceProvider  → file enumeration, stamps, text (async)
//!   ↓
//! parser::parse   → SymbolTable + LabelIndex for one document (sync, total)
//!   ↓
//! WorkspaceIndex  → one DocumentEntry per file, replaced when its stamp advances
//!   ↓
//! WorkspaceSnapshot → cross-file lookups, resolve(), diagnostics
//! ```
//!
//! Nothing here knows about cursors or completion; that lives in `ide`.

mod diagnostics;
mod index;
mod parser;
mod resolve;
mod source;
mod symbols;

pub use diagnostics::{
    Diagnostic, DiagnosticCollector, RelatedInfo, Severity, check_brackets, check_duplicates,
    check_file, codes,
};
pub use index::{DocumentEntry, WorkspaceIndex, WorkspaceSnapshot};
pub use parser::parse;
pub use resolve::{DefinitionQuery, ReferenceShape, ResolveResult, resolve};
pub use source::SourceProvider;
pub use symbols::{
    LabelIndex, Parse, Symbol, SymbolDetail, SymbolKind, SymbolRef, SymbolTable, select,
};

pub(crate) use parser::{FN_RE, VERSION_RE};
