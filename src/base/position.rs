//! Source positions used as resolution keys.

use std::fmt;

use text_size::{TextRange, TextSize};

use super::FileId;

/// A line and column in source text, 0-indexed, displayed 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    /// Column in UTF-8 bytes.
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Build from the 1-indexed form a parser or editor reports.
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Exactly one syntactic occurrence: the file plus the start of the node.
///
/// Resolution results are keyed by this rather than by node identity so they
/// can be compared and serialized independently of the tree that produced
/// them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    pub file: FileId,
    pub start: LineCol,
}

impl SourcePosition {
    #[inline]
    pub const fn new(file: FileId, start: LineCol) -> Self {
        Self { file, start }
    }

    #[inline]
    pub const fn line(&self) -> u32 {
        self.start.line
    }

    #[inline]
    pub const fn col(&self) -> u32 {
        self.start.col
    }
}

impl fmt::Debug for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.file, self.start)
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.start)
    }
}

/// Line boundaries of one source text.
///
/// Used to cut the offending line out of a file when a diagnostic is shown.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    /// Index the line starts of `text`.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Byte range of `line` (0-indexed), without its `\n`.
    pub fn line_range(&self, line: u32) -> Option<TextRange> {
        let start = *self.line_starts.get(line as usize)?;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map_or(self.len, |next| *next - TextSize::from(1));
        Some(TextRange::new(start, end))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_is_displayed_one_indexed() {
        assert_eq!(LineCol::new(0, 0).to_string(), "1:1");
        assert_eq!(LineCol::from_one_indexed(6, 11), LineCol::new(5, 10));
    }

    #[test]
    fn test_position_display() {
        let pos = SourcePosition::new(FileId::new(2), LineCol::new(1, 6));

        assert_eq!(pos.line(), 1);
        assert_eq!(pos.col(), 6);
        assert_eq!(pos.to_string(), "file#2:2:7");
    }

    #[test]
    fn test_line_ranges() {
        let text = "a\nbc\ndef";
        let index = LineIndex::new(text);

        assert_eq!(index.len(), 3);
        assert_eq!(&text[index.line_range(1).unwrap()], "bc");
        assert_eq!(&text[index.line_range(2).unwrap()], "def");
        assert_eq!(index.line_range(5), None);
    }

    #[test]
    fn test_trailing_newline_opens_an_empty_line() {
        let text = "x\n";
        let index = LineIndex::new(text);

        assert_eq!(&text[index.line_range(0).unwrap()], "x");
        assert_eq!(index.line_range(1).map(|r| r.is_empty()), Some(true));
    }

    #[test]
    fn test_positions_order_by_file_then_location() {
        let a = SourcePosition::new(FileId::new(0), LineCol::new(3, 1));
        let b = SourcePosition::new(FileId::new(0), LineCol::new(3, 4));
        let c = SourcePosition::new(FileId::new(1), LineCol::new(0, 0));
        assert!(a < b && b < c);
    }
}
