//! Byte positions into the source text.

use crate::ast::Span;

/// An immutable position in the source, measured in bytes.
///
/// Only the rule engine moves the live cursor; everything else holds copies.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl Cursor {
    pub const START: Cursor = Cursor(0);

    pub fn offset(self) -> usize {
        self.0
    }

    pub(crate) fn advanced(self, bytes: usize) -> Cursor {
        Cursor(self.0 + bytes)
    }

    /// The span from `self` up to `end`.
    pub fn span_to(self, end: Cursor) -> Span {
        Span {
            start: self.0,
            end: end.0.max(self.0),
        }
    }
}
