//! Document and workspace symbol listings.

use smol_str::SmolStr;

use crate::base::FileId;
use crate::hir::{DocumentEntry, Symbol, SymbolKind, WorkspaceSnapshot};

/// A symbol as shown in an outline or a symbol search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    /// Owning type, for methods.
    pub container: Option<SmolStr>,
    pub version: Option<SmolStr>,
}

impl From<&Symbol> for SymbolInfo {
    fn from(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind(),
            file: symbol.file,
            line: symbol.start_line,
            col: symbol.start_col,
            container: symbol.owner().map(SmolStr::new),
            version: symbol.version().map(SmolStr::new),
        }
    }
}

/// Every declaration in one document, in source order.
pub fn document_symbols(entry: &DocumentEntry) -> Vec<SymbolInfo> {
    let mut symbols: Vec<SymbolInfo> = entry.parse.all_symbols().map(SymbolInfo::from).collect();
    symbols.sort_by_key(|s| (s.line, s.col));
    symbols
}

/// Declarations whose name contains `query`, ignoring case. An empty query
/// matches everything.
pub fn workspace_symbols(snapshot: &WorkspaceSnapshot, query: &str) -> Vec<SymbolInfo> {
    let query = query.to_lowercase();
    snapshot
        .all_symbols()
        .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&query))
        .map(SymbolInfo::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileStamp;
    use crate::hir::WorkspaceIndex;
    use std::path::Path;

    #[test]
    fn test_document_outline_in_source_order() {
        let index = WorkspaceIndex::new();
        let entry = index.update(
            Path::new("/ws/a.method"),
            FileStamp::new(1),
            "const MAX = 3\nclass Deck {\n    fn shuffle() {}\n}\nfn deal() {}\n",
        );

        let outline: Vec<_> = document_symbols(&entry)
            .into_iter()
            .map(|s| (s.name.to_string(), s.container.map(|c| c.to_string())))
            .collect();
        assert_eq!(
            outline,
            vec![
                ("MAX".to_string(), None),
                ("Deck".to_string(), None),
                ("shuffle".to_string(), Some("Deck".to_string())),
                ("deal".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_workspace_search() {
        let index = WorkspaceIndex::new();
        index.update(Path::new("/ws/a.method"), FileStamp::new(1), "fn reviewNotes() {}\n");
        index.update(Path::new("/ws/b.method"), FileStamp::new(1), "pipeline Review\nfn read() {}\n");
        let snapshot = index.snapshot();

        let names: Vec<_> = workspace_symbols(&snapshot, "REVIEW").into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["reviewNotes", "Review"]);
        assert_eq!(workspace_symbols(&snapshot, "").len(), 3);
    }
}
