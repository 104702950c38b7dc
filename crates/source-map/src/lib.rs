//! Source positions for vue-twig-rs.
//!
//! Parsers in this workspace attach a [`Span`] to every error they raise.
//! [`LineIndex`] turns those byte offsets into the `line:col` pairs printed
//! by the command line front end.

use std::fmt;

/// A half-open byte range `[start, end)` into a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Move the span right by `delta` bytes.
    ///
    /// Block contents are parsed on their own, so spans reported by the
    /// template parser are relative to the block and need shifting before
    /// they can be resolved against the whole file.
    #[inline]
    pub const fn offset_by(self, delta: u32) -> Span {
        Span {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

/// Line start table of a source file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| (i + 1) as u32))
            .collect();
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Line and column of the start of `span`. Offsets past the end clamp
    /// to the last position.
    pub fn locate(&self, span: Span) -> LineCol {
        let offset = span.start.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        LineCol {
            line: line as u32,
            col: offset - self.line_starts[line],
        }
    }
}

/// A 0-indexed line and column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    /// Byte offset within the line.
    pub col: u32,
}

impl LineCol {
    /// Convert to 1-indexed for display.
    #[inline]
    pub const fn to_display(self) -> (u32, u32) {
        (self.line + 1, self.col + 1)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.to_display();
        write!(f, "{}:{}", line, col)
    }
}
