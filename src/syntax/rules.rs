//! Backtracking rule engine.
//!
//! Every rule attempt opens a [`Frame`] recording the cursor it started
//! from, and must close it exactly once:
//!
//! - [`RuleStack::fail`] rewinds to the saved cursor and yields
//!   [`Outcome::Failure`];
//! - [`RuleStack::succeed`] keeps the cursor where the rule left it.
//!
//! Frames are plain values that are consumed on resolution, so a frame can
//! never be resolved twice. Frames nest strictly LIFO; resolving out of order
//! is a bug and trips a debug assertion.

use super::cursor::Cursor;

/// The result of one rule attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The rule matched and produced a payload.
    Success(T),
    /// A required rule was missing, the problem was reported, and a recovery
    /// rule resynchronised the cursor. Callers treat this as success without
    /// a payload.
    Recovered,
    /// The rule did not match. The cursor is where it was before the attempt.
    Failure,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure)
    }

    /// The payload, if there is one.
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Recovered | Outcome::Failure => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Recovered => Outcome::Recovered,
            Outcome::Failure => Outcome::Failure,
        }
    }
}

/// A rule value: a function from parser state to outcome.
pub type Rule<P, T> = fn(&mut P) -> Outcome<T>;

/// The saved state of one in-flight rule attempt.
#[must_use = "a frame must be resolved with `fail` or `succeed`"]
#[derive(Debug)]
pub struct Frame {
    saved: Cursor,
    depth: usize,
    rule: &'static str,
}

impl Frame {
    /// Cursor at the moment the rule began.
    pub fn start(&self) -> Cursor {
        self.saved
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }
}

/// The live cursor plus the depth of the frame stack above it.
#[derive(Debug, Default)]
pub struct RuleStack {
    cursor: Cursor,
    depth: usize,
}

impl RuleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of unresolved frames.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Moves the live cursor forward. Only scanning primitives call this.
    pub(crate) fn advance(&mut self, bytes: usize) {
        self.cursor = self.cursor.advanced(bytes);
    }

    pub fn begin(&mut self, rule: &'static str) -> Frame {
        self.depth += 1;
        Frame {
            saved: self.cursor,
            depth: self.depth,
            rule,
        }
    }

    pub fn fail<T>(&mut self, frame: Frame) -> Outcome<T> {
        self.pop(&frame);
        self.cursor = frame.saved;
        Outcome::Failure
    }

    pub fn succeed<T>(&mut self, frame: Frame, payload: T) -> Outcome<T> {
        self.pop(&frame);
        Outcome::Success(payload)
    }

    /// Closes `frame` according to `outcome`: rewinds on failure, commits
    /// otherwise, and passes the outcome through.
    pub fn resolve<T>(&mut self, frame: Frame, outcome: Outcome<T>) -> Outcome<T> {
        match outcome {
            Outcome::Failure => self.fail(frame),
            other => {
                self.pop(&frame);
                other
            }
        }
    }

    fn pop(&mut self, frame: &Frame) {
        debug_assert_eq!(
            frame.depth, self.depth,
            "rule '{}' resolved out of order",
            frame.rule
        );
        self.depth -= 1;
    }
}

/// Anything that owns a [`RuleStack`] and can report structural errors.
///
/// The provided methods are the whole engine API the combinators and
/// grammar are written against.
pub trait Backtrack: Sized {
    fn rules(&self) -> &RuleStack;

    fn rules_mut(&mut self) -> &mut RuleStack;

    /// Records "Expected `description`" at the current cursor.
    fn report_expected(&mut self, description: &str);

    fn cursor(&self) -> Cursor {
        self.rules().cursor()
    }

    fn begin(&mut self, rule: &'static str) -> Frame {
        self.rules_mut().begin(rule)
    }

    fn fail<T>(&mut self, frame: Frame) -> Outcome<T> {
        self.rules_mut().fail(frame)
    }

    fn succeed<T>(&mut self, frame: Frame, payload: T) -> Outcome<T> {
        self.rules_mut().succeed(frame, payload)
    }

    fn resolve<T>(&mut self, frame: Frame, outcome: Outcome<T>) -> Outcome<T> {
        self.rules_mut().resolve(frame, outcome)
    }

    /// Discards everything consumed since `frame` began.
    fn rollback(&mut self, frame: Frame) {
        let _ = self.fail::<()>(frame);
    }

    /// Keeps everything consumed since `frame` began.
    fn commit(&mut self, frame: Frame) {
        let _ = self.succeed(frame, ());
    }

    /// Runs a rule that is required at this point.
    ///
    /// On failure reports "Expected `description`". With a `recovery` rule,
    /// runs it to resynchronise the cursor and returns
    /// [`Outcome::Recovered`]; without one the failure propagates.
    fn expect<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Outcome<T>,
        description: &str,
        recovery: Option<Rule<Self, ()>>,
    ) -> Outcome<T> {
        let outcome = rule(self);
        if outcome.is_success() {
            return outcome;
        }

        self.report_expected(description);

        match recovery {
            Some(recover) => {
                let _ = recover(self);
                Outcome::Recovered
            }
            None => Outcome::Failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_rewinds_to_saved_cursor() {
        let mut stack = RuleStack::new();
        stack.advance(2);
        let frame = stack.begin("outer");
        stack.advance(5);
        let outcome: Outcome<()> = stack.fail(frame);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(stack.cursor().offset(), 2);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_succeed_keeps_progress() {
        let mut stack = RuleStack::new();
        let frame = stack.begin("rule");
        stack.advance(3);
        assert_eq!(stack.succeed(frame, 'x'), Outcome::Success('x'));
        assert_eq!(stack.cursor().offset(), 3);
    }

    #[test]
    fn test_nested_failure_inside_success() {
        let mut stack = RuleStack::new();
        let outer = stack.begin("outer");
        stack.advance(1);
        let inner = stack.begin("inner");
        stack.advance(4);
        stack.fail::<()>(inner);
        assert_eq!(stack.cursor().offset(), 1);
        stack.succeed(outer, ());
        assert_eq!(stack.cursor().offset(), 1);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_resolve_recovered_commits() {
        let mut stack = RuleStack::new();
        let frame = stack.begin("rule");
        stack.advance(2);
        let outcome: Outcome<u8> = stack.resolve(frame, Outcome::Recovered);
        assert_eq!(outcome, Outcome::Recovered);
        assert_eq!(stack.cursor().offset(), 2);
    }

    #[test]
    #[should_panic(expected = "resolved out of order")]
    #[cfg(debug_assertions)]
    fn test_out_of_order_resolution_panics() {
        let mut stack = RuleStack::new();
        let outer = stack.begin("outer");
        let _inner = stack.begin("inner");
        stack.fail::<()>(outer);
    }

    #[test]
    fn test_outcome_map_and_success() {
        assert_eq!(Outcome::Success(2).map(|n| n * 2).success(), Some(4));
        assert_eq!(Outcome::<u8>::Recovered.map(|n| n * 2), Outcome::Recovered);
        assert!(Outcome::<u8>::Recovered.is_success());
        assert!(Outcome::<u8>::Failure.is_failure());
    }
}
