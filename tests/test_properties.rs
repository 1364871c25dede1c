//! Property-based checks that parsing and cursor analysis are total.
//!
//! Inputs are drawn from the characters that matter to the language
//! (braces, parentheses, quotes, comment slashes, `@label`, keywords) so
//! that generated text exercises unterminated bodies and strings.

use proptest::prelude::*;

use methodic::base::{FileId, LineCol, LineIndex};
use methodic::hir::{WorkspaceSnapshot, parse};
use methodic::ide::{classify_at, definition_query, find_references, hover};

/// Fragments that get concatenated into source-like text.
fn arb_fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "fn ", "static ", "class ", "extends ", "pipeline ", "alias ", "macro ", "const ", "let ",
        "@label(\"", "study", "\")", "version: ", "\"classic\"", "SQ3R", "review", "Book", ".",
        "(", ")", "{", "}", ":", "->", "=", ",", " ", "\n", "    ", "\"", "'", "\\", "//", "///",
        "é", "1",
    ])
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..80).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_parse_is_total_and_deterministic(text in arb_source()) {
        let first = parse(FileId::new(0), &text);
        let second = parse(FileId::new(0), &text);
        prop_assert_eq!(&first, &second);

        let lines = LineIndex::new(&text);
        for symbol in first.all_symbols() {
            prop_assert!((symbol.start_line as usize) < lines.line_count());
            let line = lines.line_text(&text, symbol.start_line).unwrap_or_default();
            prop_assert!(line[symbol.start_col as usize..].starts_with(symbol.name.as_str()));
        }
    }

    #[test]
    fn prop_cursor_analysis_never_panics(text in arb_source(), split in 0usize..400) {
        let mut split = split.min(text.len());
        while !text.is_char_boundary(split) {
            split -= 1;
        }
        let (before, after) = text.split_at(split);
        let context = classify_at(before, after);
        prop_assert!(before.ends_with(context.partial()));
    }

    #[test]
    fn prop_navigation_never_panics(text in arb_source(), line in 0u32..20, col in 0u32..60) {
        let snapshot = WorkspaceSnapshot::from_entries(Vec::new());
        let pos = LineCol::new(line, col);
        let _ = definition_query(&text, pos);
        let _ = hover(&snapshot, &text, pos);

        for reference in find_references(FileId::new(0), &text, "review", &[], false) {
            let lines = LineIndex::new(&text);
            let line = lines.line_text(&text, reference.line).unwrap_or_default();
            let start = reference.col as usize;
            prop_assert_eq!(&line[start..start + reference.len as usize], "review");
        }
    }
}
