//! IDE features: high-level APIs for editor integrations.
//!
//! This module provides the interface between the symbol model (HIR) and
//! an editor. Each function corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take a snapshot and text in, return data out
//! 2. **No protocol types**: uses our own types, converted at the boundary
//! 3. **State in one place**: [`AnalysisHost`] owns the index, the usage
//!    learner and the completion cache
//!
//! ## Usage
//!
//! ```ignore
//! use methodic::ide::AnalysisHost;
//! use methodic::project::FsSource;
//!
//! let host = AnalysisHost::new(Arc::new(FsSource::new("notes/")));
//! let items = host.completions(path, "SQ3", "", &CancellationToken::new()).await;
//! ```

mod analysis;
pub mod completion;
mod context;
mod goto;
mod hover;
mod references;
mod symbols;

pub use analysis::AnalysisHost;
pub use completion::{
    CompletionItem, CompletionKind, CompletionRequest, Origin, UsageLearner, completions,
};
pub use context::{
    CONTROL_KEYWORDS, CompletionContext, DECLARATION_KEYWORDS, classify, classify_at,
    enclosing_function,
};
pub use goto::{definition_query, goto_definition};
pub use hover::{HoverResult, hover};
pub use references::{Reference, ReferenceKind, find_references};
pub use symbols::{SymbolInfo, document_symbols, workspace_symbols};
