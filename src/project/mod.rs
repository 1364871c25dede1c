//! Project: where source text comes from.
//!
//! [`FsSource`] serves a workspace directory, [`MemorySource`] serves
//! in-memory buffers, and [`WorkspaceLoader`] warms a
//! [`WorkspaceIndex`](crate::hir::WorkspaceIndex) in parallel.

mod fs;
mod memory;
mod workspace_loader;

pub use fs::{FsSource, collect_source_files};
pub use memory::MemorySource;
pub use workspace_loader::{LoadReport, WorkspaceLoader};
