//! Typed span-to-span links.
//!
//! SpanLink represents a typed edge from an anchor span to a target span.
//! Opinion frames use it to attach holder and target arguments to an
//! expression span.

use crate::TokenSpan;

/// Binary relation from an anchor span to a target span.
///
/// The anchor is whatever value stores the link.
///
/// # Type Parameters
/// - `R`: Role enum specific to the relation family
/// - `S`: Span type, usually [`TokenSpan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SpanLink<R, S> {
    /// Semantic role of target with respect to anchor
    pub role: R,
    /// The target span
    pub target: S,
}

impl<R, S> SpanLink<R, S> {
    pub fn new(role: R, target: S) -> Self {
        Self { role, target }
    }

    /// Replace the target, keeping the role.
    pub fn map_target<T>(self, f: impl FnOnce(S) -> T) -> SpanLink<R, T> {
        SpanLink {
            role: self.role,
            target: f(self.target),
        }
    }
}

/// Link whose target is a span in a borrowed document.
pub type TokenSpanLink<'d, R> = SpanLink<R, TokenSpan<'d>>;
