//! Shared, append-only diagnostics sink.
//!
//! One sink is created per parse session and handed explicitly to every
//! parser, including the nested parsers spawned for `include` statements.
//! Nothing ever removes entries while a parse is running.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::ParseError;

/// Cheap-clone handle onto the session's ordered list of diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Rc<RefCell<Vec<ParseError>>>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic unless an identical one (same kind, span and
    /// source) is already recorded. Backtracking can re-parse the same input
    /// under several alternatives, each reaching the same failure.
    pub fn report(&self, error: ParseError) {
        if self.contains(&error) {
            log::trace!("dropping repeated diagnostic: {}", error.message());
            return;
        }
        log::debug!(
            "{}:{}: {}",
            error.source_name(),
            error.position(),
            error.message()
        );
        self.0.borrow_mut().push(error);
    }

    fn contains(&self, error: &ParseError) -> bool {
        self.0.borrow().iter().any(|existing| {
            existing.kind == error.kind
                && existing.source_info.primary_span == error.source_info.primary_span
                && existing.source_name() == error.source_name()
        })
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of everything reported so far, in report order.
    pub fn errors(&self) -> Vec<ParseError> {
        self.0.borrow().clone()
    }

    /// Messages only; convenient for assertions and summaries.
    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().iter().map(ParseError::message).collect()
    }

    /// Drains the sink. Only called once the session is over.
    pub fn take(&self) -> Vec<ParseError> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::errors::{ErrorReporting, SourceContext};

    #[test]
    fn test_clones_share_one_list() {
        let sink = Diagnostics::new();
        let nested = sink.clone();
        let source = SourceContext::from_file("a.ink", "x");
        nested.report(source.expected("thing", Span::point(0)));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.messages(), vec!["Expected thing".to_string()]);
    }

    #[test]
    fn test_identical_reports_are_kept_once() {
        let sink = Diagnostics::new();
        let source = SourceContext::from_file("a.ink", "xy");
        sink.report(source.expected("thing", Span::point(1)));
        sink.report(source.expected("thing", Span::point(1)));
        sink.report(source.expected("thing", Span::point(0)));
        let other = SourceContext::from_file("b.ink", "xy");
        sink.report(other.expected("thing", Span::point(1)));
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_take_drains_in_order() {
        let sink = Diagnostics::new();
        let source = SourceContext::from_file("a.ink", "xy");
        sink.report(source.expected("first", Span::point(0)));
        sink.report(source.expected("second", Span::point(1)));
        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].message(), "Expected second");
        assert!(sink.is_empty());
    }
}
