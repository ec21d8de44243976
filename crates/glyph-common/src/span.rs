//! Span - source location tracking for type terms and diagnostics.
//!
//! A Span represents a range of source code by byte offsets. Every type
//! term carries one (or none, for synthetic terms produced by
//! `generalize`/`instantiate`) so that a downstream diagnostic can point
//! back at the source that produced a given term.
//!
//! Spans are small (8 bytes) and cheap to copy.

use serde::{Deserialize, Serialize};

/// A span of source code, represented as a byte range.
///
/// Spans use half-open intervals: `[start, end)`. An empty span has
/// `start == end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a new span from start and end offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create an empty span at the given position.
    #[inline]
    pub const fn at(pos: u32) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// Create a dummy/invalid span (used for synthetic terms produced by
    /// `generalize`/`instantiate`, which have no direct source origin).
    #[inline]
    pub const fn dummy() -> Self {
        Span {
            start: u32::MAX,
            end: u32::MAX,
        }
    }

    /// Check if this is a dummy/invalid span.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create a span covering both.
    #[inline]
    pub const fn merge(&self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A trait for types that have a source span.
pub trait Spanned {
    /// Get the source span of this element.
    fn span(&self) -> Span;

    /// Get the start byte offset.
    fn start(&self) -> u32 {
        self.span().start
    }

    /// Get the end byte offset.
    fn end(&self) -> u32 {
        self.span().end
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// Helper for building spans while walking the AST that feeds this engine.
#[derive(Clone, Copy, Debug)]
pub struct SpanBuilder {
    start: u32,
}

impl SpanBuilder {
    /// Start building a span at the given position.
    #[inline]
    pub const fn start(pos: u32) -> Self {
        SpanBuilder { start: pos }
    }

    /// Finish building the span at the given position.
    #[inline]
    pub const fn end(&self, pos: u32) -> Span {
        Span::new(self.start, pos)
    }
}

/// Opaque source location attached to a type term.
///
/// This engine never decodes a `SourceLocation` into line/column text or
/// reads through it for any reason other than carrying it along; that is
/// the responsibility of the out-of-scope diagnostics layer. It exists
/// here purely so every `TypeTerm` can answer "where did you come from".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation(Span);

impl SourceLocation {
    /// Wrap a byte span as a source location.
    #[inline]
    pub const fn new(span: Span) -> Self {
        SourceLocation(span)
    }

    /// A location standing in for "no real source", used by synthetic
    /// terms produced during `generalize`/`instantiate`.
    #[inline]
    pub const fn synthetic() -> Self {
        SourceLocation(Span::dummy())
    }

    /// Check whether this location is synthetic.
    #[inline]
    pub const fn is_synthetic(&self) -> bool {
        self.0.is_dummy()
    }

    /// Recover the underlying byte span.
    #[inline]
    pub const fn span(&self) -> Span {
        self.0
    }
}

impl From<Span> for SourceLocation {
    fn from(span: Span) -> Self {
        SourceLocation::new(span)
    }
}

#[cfg(test)]
#[path = "../tests/span.rs"]
mod tests;
