//! Find references: textual search for a name, line by line.
//!
//! Four independent patterns run over every line; matches that fall in a
//! `//` comment or inside a string are dropped, and the survivors are
//! deduplicated by position.

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::base::text::LineMask;
use crate::base::{FileId, LineCol};

/// How a name is used at a reference site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `name(`
    Call,
    /// After `:` or `extends`.
    TypePosition,
    /// `.name`
    Member,
    /// Any other whole-word use.
    Bare,
    /// The declaration itself.
    Declaration,
}

/// A reference with position information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    /// Line (0-indexed).
    pub line: u32,
    /// Column in bytes (0-indexed).
    pub col: u32,
    pub len: u32,
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn position(&self) -> LineCol {
        LineCol::new(self.line, self.col)
    }
}

struct Patterns {
    call: Regex,
    type_position: Regex,
    member: Regex,
    bare: Regex,
}

impl Patterns {
    fn new(name: &str) -> Option<Self> {
        let n = regex::escape(name);
        Some(Self {
            call: Regex::new(&format!(r"\b{n}\s*\(")).ok()?,
            type_position: Regex::new(&format!(r"(?::|\bextends)\s*({n})\b")).ok()?,
            member: Regex::new(&format!(r"\.({n})\b")).ok()?,
            bare: Regex::new(&format!(r"\b{n}\b")).ok()?,
        })
    }

    /// Byte offsets of every match on `line`, in dedupe priority order.
    fn matches(&self, line: &str) -> Vec<(usize, ReferenceKind)> {
        let mut out: Vec<(usize, ReferenceKind)> = self
            .call
            .find_iter(line)
            .map(|m| (m.start(), ReferenceKind::Call))
            .collect();
        out.extend(
            self.type_position
                .captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| (m.start(), ReferenceKind::TypePosition)),
        );
        out.extend(
            self.member
                .captures_iter(line)
                .filter_map(|c| c.get(1))
                .map(|m| (m.start(), ReferenceKind::Member)),
        );
        out.extend(
            self.bare
                .find_iter(line)
                .filter(|m| !matches!(line[m.end()..].chars().next(), Some(':' | '(' | '=')))
                .map(|m| (m.start(), ReferenceKind::Bare)),
        );
        out
    }
}

/// References to `name` in one document.
///
/// `declarations` are the positions where `name` is declared in this
/// document; matches there are reported only if `include_declarations`.
pub fn find_references(
    file: FileId,
    text: &str,
    name: &str,
    declarations: &[LineCol],
    include_declarations: bool,
) -> Vec<Reference> {
    let Some(patterns) = Patterns::new(name) else {
        return Vec::new();
    };

    let mut found: IndexMap<LineCol, ReferenceKind> = IndexMap::new();
    if include_declarations {
        for &pos in declarations {
            found.insert(pos, ReferenceKind::Declaration);
        }
    }

    for (line_no, line) in text.lines().enumerate() {
        if !line.contains(name) {
            continue;
        }
        let mask = LineMask::new(line);
        for (offset, kind) in patterns.matches(line) {
            if !mask.is_code(offset) {
                continue;
            }
            let pos = LineCol::new(line_no as u32, offset as u32);
            if declarations.contains(&pos) {
                continue;
            }
            found.entry(pos).or_insert(kind);
        }
    }

    let mut refs: Vec<_> = found
        .into_iter()
        .map(|(pos, kind)| Reference {
            file,
            line: pos.line,
            col: pos.col,
            len: name.len() as u32,
            kind,
        })
        .collect();
    refs.sort_by_key(|r| (r.line, r.col));
    debug!(%file, symbol = name, count = refs.len(), "references found");
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(text: &str, name: &str) -> Vec<(u32, u32, ReferenceKind)> {
        find_references(FileId::new(0), text, name, &[], false)
            .into_iter()
            .map(|r| (r.line, r.col, r.kind))
            .collect()
    }

    #[test]
    fn test_extends_is_a_single_type_match() {
        assert_eq!(refs("class B extends A {", "A"), vec![(0, 16, ReferenceKind::TypePosition)]);
    }

    #[test]
    fn test_strings_and_comments_excluded() {
        assert!(refs("let s = \"call foo() here\"", "foo").is_empty());
        assert!(refs("// foo()\n/// uses foo", "foo").is_empty());
        assert_eq!(refs("foo() // foo()", "foo"), vec![(0, 0, ReferenceKind::Call)]);
        assert_eq!(refs("x = 'it''s' + foo", "foo"), vec![(0, 14, ReferenceKind::Bare)]);
    }

    #[test]
    fn test_each_pattern() {
        let text = "foo()\nx: foo\nbook.foo\nlet y = foo\nfoo=1\nfoo: 2\nfood()";
        assert_eq!(
            refs(text, "foo"),
            vec![
                (0, 0, ReferenceKind::Call),
                (1, 3, ReferenceKind::TypePosition),
                (2, 5, ReferenceKind::Member),
                (3, 8, ReferenceKind::Bare),
            ]
        );
    }

    #[test]
    fn test_declarations_optional() {
        let text = "fn review() {}\nreview()\n";
        let decls = [LineCol::new(0, 3)];

        let without = find_references(FileId::new(0), text, "review", &decls, false);
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].line, 1);

        let with = find_references(FileId::new(0), text, "review", &decls, true);
        assert_eq!(with.len(), 2);
        assert_eq!(with[0].kind, ReferenceKind::Declaration);
    }
}
