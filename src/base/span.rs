//! Source text positions.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both are 0-indexed; the column counts UTF-8 bytes from the line start.
/// Display is 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Converts between byte offsets and line/column positions for one text.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
        );

        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Position of a byte offset. Offsets past the end land on the last line.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        LineCol {
            line: line as u32,
            col: (offset - self.line_starts[line]).into(),
        }
    }

    /// Byte offset of a position. Columns past the end of a line are clamped
    /// to the line end (before its newline); unknown lines give `None`.
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        let range = self.line_range(pos.line)?;
        let offset = range.start() + TextSize::from(pos.col);
        Some(offset.min(range.end()))
    }

    /// Range of a line's content, excluding the trailing newline.
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let start = *self.line_starts.get(line as usize)?;
        let end = match self.line_starts.get(line as usize + 1) {
            Some(next) => *next - TextSize::from(1),
            None => self.len,
        };
        Some(TextRange::new(start, end))
    }

    /// Content of a line of `text` (the text this index was built from).
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> Option<&'a str> {
        let range = self.line_range(line)?;
        text.get(usize::from(range.start())..usize::from(range.end()))
            .map(|s| s.trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display() {
        assert_eq!(format!("{}", LineCol::new(0, 0)), "1:1");
        assert_eq!(format!("{}", LineCol::new(5, 10)), "6:11");
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("hello\nworld\n!");

        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(5)), LineCol::new(0, 5));
        assert_eq!(index.line_col(TextSize::from(6)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::from(12)), LineCol::new(2, 0));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_index_offset_clamps_to_line_end() {
        let index = LineIndex::new("hello\nworld");

        assert_eq!(index.offset(LineCol::new(1, 3)), Some(TextSize::from(9)));
        assert_eq!(index.offset(LineCol::new(0, 99)), Some(TextSize::from(5)));
        assert_eq!(index.offset(LineCol::new(4, 0)), None);
    }

    #[test]
    fn test_line_text() {
        let text = "first\r\nsecond\n";
        let index = LineIndex::new(text);

        assert_eq!(index.line_text(text, 0), Some("first"));
        assert_eq!(index.line_text(text, 1), Some("second"));
        assert_eq!(index.line_text(text, 2), Some(""));
    }
}
