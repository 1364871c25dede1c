//! Lexical helpers shared by the parser, the classifier and the IDE layer.
//!
//! None of these build a syntax tree. They answer small questions about raw
//! text: where does this brace close, is this offset inside a string, which
//! identifier sits under the cursor.

use std::ops::Range;
use std::str::CharIndices;

/// Regex fragment matching one identifier.
pub const IDENT: &str = r"[_\p{XID_Start}]\p{XID_Continue}*";

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// The identifier that `text` ends with, or `""`.
///
/// A trailing run like `12` that does not start like an identifier yields
/// `""`.
pub fn trailing_ident(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_continue(c))
        .last()
        .map_or(text.len(), |(i, _)| i);
    let run = &text[start..];
    match run.chars().next() {
        Some(c) if is_ident_start(c) => run,
        _ => "",
    }
}

/// The identifier under (or immediately before) byte column `col` of `line`.
///
/// Returns the identifier's start column and text.
pub fn ident_at(line: &str, col: usize) -> Option<(usize, &str)> {
    let col = col.min(line.len());
    if !line.is_char_boundary(col) {
        return None;
    }
    let start = line[..col]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident_continue(c))
        .last()
        .map_or(col, |(i, _)| i);
    let end = line[col..]
        .char_indices()
        .find(|&(_, c)| !is_ident_continue(c))
        .map_or(line.len(), |(i, _)| col + i);

    let word = &line[start..end];
    match word.chars().next() {
        Some(c) if is_ident_start(c) => Some((start, word)),
        _ => None,
    }
}

/// Characters of `text` that lie outside quoted strings.
///
/// Single and double quotes both open a string, a backslash escapes the next
/// character, and a string closes at its own quote kind or at a newline.
pub struct CodeChars<'a> {
    chars: CharIndices<'a>,
    quote: Option<char>,
}

impl<'a> CodeChars<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices(),
            quote: None,
        }
    }

    /// True if the scan so far ended inside an unterminated string.
    pub fn in_string(&self) -> bool {
        self.quote.is_some()
    }
}

impl Iterator for CodeChars<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((i, c)) = self.chars.next() {
            match self.quote {
                Some(q) => {
                    if c == '\\' {
                        self.chars.next();
                    } else if c == q || c == '\n' {
                        self.quote = None;
                    }
                }
                None if c == '"' || c == '\'' => self.quote = Some(c),
                None => return Some((i, c)),
            }
        }
        None
    }
}

/// Byte offset of the `}` closing the `{` at `open`.
///
/// Braces inside string literals do not count. An unterminated body runs to
/// the end of the text, so the result is `text.len()` in that case.
pub fn matching_brace(text: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, c) in CodeChars::new(&text[open..]) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open + i;
                }
            }
            _ => {}
        }
    }
    text.len()
}

/// Offsets of every `{` in `text` that is still open at its end, outermost
/// first.
pub fn unclosed_braces(text: &str) -> Vec<usize> {
    let mut stack = Vec::new();
    for (i, c) in CodeChars::new(text) {
        match c {
            '{' => stack.push(i),
            '}' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack
}

/// Code/non-code classification of one line: string spans (quotes
/// included, an open string runs to the end of the line) and the start of a
/// `//` comment.
#[derive(Debug, Clone, Default)]
pub struct LineMask {
    strings: Vec<Range<usize>>,
    comment_start: Option<usize>,
}

impl LineMask {
    pub fn new(line: &str) -> Self {
        let mut mask = LineMask::default();
        let mut open: Option<(char, usize)> = None;
        let mut chars = line.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match open {
                Some((q, start)) => {
                    if c == '\\' {
                        chars.next();
                    } else if c == q {
                        mask.strings.push(start..i + 1);
                        open = None;
                    }
                }
                None => match c {
                    '"' | '\'' => open = Some((c, i)),
                    '/' if matches!(chars.peek(), Some((_, '/'))) => {
                        mask.comment_start = Some(i);
                        return mask;
                    }
                    _ => {}
                },
            }
        }
        if let Some((_, start)) = open {
            mask.strings.push(start..line.len());
        }
        mask
    }

    /// True if `offset` is neither inside a string nor inside a comment.
    pub fn is_code(&self, offset: usize) -> bool {
        if self.comment_start.is_some_and(|c| offset >= c) {
            return false;
        }
        !self.strings.iter().any(|span| span.contains(&offset))
    }
}

/// Normalized edit-distance similarity: `1 - distance / max(len)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}
