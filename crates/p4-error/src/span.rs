//! Source locations carried by tokens, AST nodes and errors

use std::fmt;

/// A point in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    /// Line (1-indexed)
    pub line: u32,
    /// Column (1-indexed, counted in characters)
    pub column: u32,
    /// Byte offset from the beginning of the source
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// The position of the first character of any source
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Represents a region in the source code (start to end, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    /// Start position
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `pos`
    pub fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Smallest span covering both, in either order
    pub fn merge(self, other: Span) -> Span {
        let start = std::cmp::min_by_key(self.start, other.start, |p| p.offset);
        let end = std::cmp::max_by_key(self.end, other.end, |p| p.offset);
        Span { start, end }
    }
}

/// Implemented by AST nodes so consumers can point back into the source
pub trait Spanned {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let span1 = Span::new(Position::new(1, 1, 0), Position::new(1, 5, 4));
        let span2 = Span::new(Position::new(2, 3, 9), Position::new(2, 8, 14));

        let merged = span1.merge(span2);
        assert_eq!(merged.start, Position::new(1, 1, 0));
        assert_eq!(merged.end, Position::new(2, 8, 14));

        // Merging is order independent
        assert_eq!(span2.merge(span1), merged);
    }

    #[test]
    fn test_point_merges_into_span() {
        let point = Span::point(Position::new(1, 4, 3));
        assert_eq!(point.start, point.end);

        let word = Span::new(Position::new(1, 1, 0), Position::new(1, 10, 9));
        assert_eq!(point.merge(word), word);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 14, 40).to_string(), "3:14");
    }
}
