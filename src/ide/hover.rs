//! Hover information for the identifier under the cursor.

use crate::base::text::ident_at;
use crate::base::{LineCol, LineIndex};
use crate::hir::{Symbol, WorkspaceSnapshot};

/// Hover contents and the word they describe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown, one section per matching declaration.
    pub contents: String,
    pub line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

/// Describe every declaration named like the identifier at `pos`.
pub fn hover(snapshot: &WorkspaceSnapshot, text: &str, pos: LineCol) -> Option<HoverResult> {
    let lines = LineIndex::new(text);
    let line = lines.line_text(text, pos.line)?;
    let (start, name) = ident_at(line, pos.col as usize)?;

    let sections: Vec<_> = snapshot.named(name).map(describe).collect();
    if sections.is_empty() {
        return None;
    }
    Some(HoverResult {
        contents: sections.join("\n\n---\n\n"),
        line: pos.line,
        start_col: start as u32,
        end_col: (start + name.len()) as u32,
    })
}

fn describe(symbol: &Symbol) -> String {
    let mut header = format!("{} `", symbol.kind().display());
    if symbol.is_static() {
        header.insert_str(0, "static ");
    }
    if let Some(owner) = symbol.owner() {
        header.push_str(owner);
        header.push('.');
    }
    header.push_str(&symbol.name);
    header.push('`');

    let mut out = format!("**{header}**");
    if let Some(version) = symbol.version() {
        out.push_str(&format!("\n\nversion: `{version}`"));
    }
    if let Some(parent) = symbol.parent_type() {
        out.push_str(&format!("\n\nextends `{parent}`"));
    }
    if let Some(value) = symbol.literal_value() {
        out.push_str(&format!("\n\n```\n{value}\n```"));
    }
    if !symbol.labels.is_empty() {
        let labels: Vec<_> = symbol.labels.iter().map(|l| format!("`{l}`")).collect();
        out.push_str(&format!("\n\nlabels: {}", labels.join(", ")));
    }
    if let Some(doc) = &symbol.doc {
        out.push_str(&format!("\n\n{doc}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileStamp;
    use crate::hir::WorkspaceIndex;
    use std::path::Path;

    #[test]
    fn test_hover_method() {
        let text = "class Book {\n    /// Opens the book.\n    @label(\"reading\")\n    static fn open(version: \"v2\") {}\n}\nBook.open()\n";
        let index = WorkspaceIndex::new();
        index.update(Path::new("/ws/a.method"), FileStamp::new(1), text);

        let result = hover(&index.snapshot(), text, LineCol::new(5, 7)).unwrap();
        assert_eq!(
            result.contents,
            "**static method `Book.open`**\n\nversion: `v2`\n\nlabels: `reading`\n\nOpens the book."
        );
        assert_eq!((result.start_col, result.end_col), (5, 9));
    }

    #[test]
    fn test_hover_nothing() {
        let index = WorkspaceIndex::new();
        assert!(hover(&index.snapshot(), "unknown", LineCol::new(0, 2)).is_none());
        assert!(hover(&index.snapshot(), "  ", LineCol::new(0, 1)).is_none());
    }
}
