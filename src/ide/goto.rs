//! Go-to-definition.

use crate::base::text::{ident_at, trailing_ident};
use crate::base::{LineCol, LineIndex};
use crate::hir::{DefinitionQuery, ReferenceShape, ResolveResult, VERSION_RE, WorkspaceSnapshot, resolve};

use super::context::DECLARATION_KEYWORDS;

/// Build the query for the identifier at `pos`, or `None` if there is no
/// identifier there or it is the name being declared.
pub fn definition_query(text: &str, pos: LineCol) -> Option<DefinitionQuery> {
    let lines = LineIndex::new(text);
    let line = lines.line_text(text, pos.line)?;
    let (start, name) = ident_at(line, pos.col as usize)?;

    let prefix = &line[..start];
    let preceding = prefix.trim_end();
    if preceding.len() < prefix.len() && DECLARATION_KEYWORDS.contains(&trailing_ident(preceding)) {
        return None;
    }

    let rest = &line[start + name.len()..];
    let shape = if rest.trim_start().starts_with('(') {
        ReferenceShape::Call
    } else {
        ReferenceShape::Name
    };
    let mut query = DefinitionQuery::new(name, shape);

    if let Some(receiver) = prefix.strip_suffix('.') {
        let owner = trailing_ident(receiver);
        if !owner.is_empty() {
            query = query.with_owner(owner);
        }
    }

    if shape == ReferenceShape::Call {
        let args = &rest[..rest.find(')').unwrap_or(rest.len())];
        if let Some(version) = VERSION_RE.captures(args).and_then(|c| c.get(1)) {
            query = query.with_version(version.as_str());
        }
    }
    Some(query)
}

/// Resolve the identifier at `pos` across the snapshot.
pub fn goto_definition(snapshot: &WorkspaceSnapshot, text: &str, pos: LineCol) -> ResolveResult {
    match definition_query(text, pos) {
        Some(query) => resolve(snapshot, &query),
        None => ResolveResult::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileStamp;
    use crate::hir::{SymbolKind, WorkspaceIndex};
    use std::path::Path;

    const DEFS: &str = "\
fn SQ3R(version: \"classic\") {}
fn SQ3R(version: \"academic\") {}
class Book {
    fn open() {}
}
const LIMIT = 3
";

    fn snapshot() -> WorkspaceSnapshot {
        let index = WorkspaceIndex::new();
        index.update(Path::new("/ws/defs.method"), FileStamp::new(1), DEFS);
        index.snapshot()
    }

    #[test]
    fn test_query_shape_owner_version() {
        let q = definition_query("x = Book.open()", LineCol::new(0, 11)).unwrap();
        assert_eq!(q.name, "open");
        assert_eq!(q.shape, ReferenceShape::Call);
        assert_eq!(q.owner.as_deref(), Some("Book"));

        let q = definition_query("SQ3R (version: \"classic\", topic: t)", LineCol::new(0, 2)).unwrap();
        assert_eq!(q.version.as_deref(), Some("classic"));

        let q = definition_query("let n = LIMIT", LineCol::new(0, 9)).unwrap();
        assert_eq!(q.shape, ReferenceShape::Name);
    }

    #[test]
    fn test_declarations_are_rejected() {
        assert!(definition_query("fn SQ3R() {}", LineCol::new(0, 4)).is_none());
        assert!(definition_query("class B extends A {", LineCol::new(0, 17)).is_none());
        assert!(definition_query("let total = 1", LineCol::new(0, 5)).is_none());
        assert!(definition_query("   ", LineCol::new(0, 1)).is_none());
    }

    #[test]
    fn test_goto_outcomes() {
        let snap = snapshot();

        let ambiguous = goto_definition(&snap, "SQ3R()", LineCol::new(0, 1));
        assert_eq!(ambiguous.candidates().len(), 2);

        let exact = goto_definition(&snap, "SQ3R(version: \"academic\")", LineCol::new(0, 1));
        assert_eq!(exact.symbol().unwrap().start_line, 1);

        let method = goto_definition(&snap, "Book.open()", LineCol::new(0, 6));
        assert_eq!(method.symbol().unwrap().kind(), SymbolKind::Method);

        let constant = goto_definition(&snap, "if LIMIT", LineCol::new(0, 4));
        assert_eq!(constant.symbol().unwrap().kind(), SymbolKind::Constant);

        assert_eq!(goto_definition(&snap, "nothing()", LineCol::new(0, 2)), ResolveResult::NotFound);
    }
}
