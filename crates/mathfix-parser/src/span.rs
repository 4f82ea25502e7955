//! Source spans for tokens and tree nodes.

use std::ops::Range;

/// A byte range in the text a token or node was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Create a union of two spans (encompassing both)
    pub fn union(&self, other: Span) -> Span {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Move the span `offset` bytes to the right.
    pub fn shifted(&self, offset: usize) -> Span {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Drop the first `count` bytes of the span.
    ///
    /// Used when the parser consumes only a prefix of a literal run.
    pub(crate) fn skip(&self, count: usize) -> Span {
        Self {
            start: (self.start + count).min(self.end),
            end: self.end,
        }
    }

    /// Keep only the first `count` bytes of the span.
    pub(crate) fn take(&self, count: usize) -> Span {
        Self {
            start: self.start,
            end: (self.start + count).min(self.end),
        }
    }

    /// Get the span as a byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}
