//! Common types and utilities for the glyph type inference engine.
//!
//! This crate provides foundational, domain-agnostic building blocks used
//! by `glyph-types`:
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`) and an opaque
//!   `SourceLocation` attached to type terms for diagnostics.
//! - Centralized recursion and capacity limits.

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{SourceLocation, Span, SpanBuilder, Spanned};

// Centralized limits and thresholds
pub mod limits;
