//! Grammar-agnostic parsing operators built only on the rule engine.

use super::rules::{Backtrack, Outcome, Rule};

pub trait Combinators: Backtrack {
    /// Skips whitespace that carries no meaning, returning whether any was
    /// consumed.
    fn skip_whitespace(&mut self) -> bool;

    /// Tries `rules` in order and returns the first that does not fail.
    /// Order is priority; rejected attempts leave no trace.
    fn one_of<T>(&mut self, rules: &[Rule<Self, T>]) -> Outcome<T> {
        for rule in rules {
            let frame = self.begin("one_of");
            match rule(self) {
                Outcome::Failure => self.rollback(frame),
                outcome => return self.resolve(frame, outcome),
            }
        }
        Outcome::Failure
    }

    /// Never fails: a failed `rule` becomes `Success(None)` having consumed
    /// nothing.
    fn optional<T>(&mut self, rule: impl FnOnce(&mut Self) -> Outcome<T>) -> Outcome<Option<T>> {
        let frame = self.begin("optional");
        match rule(self) {
            Outcome::Success(value) => self.succeed(frame, Some(value)),
            Outcome::Recovered => self.succeed(frame, None),
            Outcome::Failure => {
                self.rollback(frame);
                Outcome::Success(None)
            }
        }
    }

    /// Consumes like `rule` but contributes nothing to collected output.
    fn exclude<T, U>(&mut self, rule: impl FnOnce(&mut Self) -> Outcome<U>) -> Outcome<Option<T>> {
        let frame = self.begin("exclude");
        match rule(self) {
            Outcome::Failure => self.fail(frame),
            _ => self.succeed(frame, None),
        }
    }

    /// Zero-width lookahead: reports whether `rule` would match here.
    fn peek<T>(&mut self, rule: impl FnOnce(&mut Self) -> Outcome<T>) -> bool {
        let frame = self.begin("peek");
        let matched = rule(self).is_success();
        self.rollback(frame);
        matched
    }

    /// `rule`, tolerating incidental whitespace on either side.
    fn spaced<T>(&mut self, rule: impl FnOnce(&mut Self) -> Outcome<T>) -> Outcome<T> {
        let frame = self.begin("spaced");
        self.skip_whitespace();
        match rule(self) {
            Outcome::Failure => self.fail(frame),
            outcome => {
                self.skip_whitespace();
                self.resolve(frame, outcome)
            }
        }
    }

    /// Alternates `a`, `b`, `a`, ... collecting every payload in order, until
    /// neither can make progress.
    ///
    /// A step that succeeds without consuming input is rejected, so this
    /// always terminates. It never fails; with nothing to collect the result
    /// is empty.
    ///
    /// Each payload is kept as one element. Rules returning single nodes
    /// therefore build a flat run, while rules returning groups (such as a
    /// `Vec` per branch) build a nested grouping.
    fn interleave<T>(
        &mut self,
        mut a: impl FnMut(&mut Self) -> Outcome<Option<T>>,
        mut b: impl FnMut(&mut Self) -> Outcome<Option<T>>,
    ) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            let took_a = advancing_step(self, &mut a, &mut items);
            let took_b = advancing_step(self, &mut b, &mut items);
            if !took_a && !took_b {
                break;
            }
        }
        items
    }
}

fn advancing_step<P, T>(
    parser: &mut P,
    rule: &mut impl FnMut(&mut P) -> Outcome<Option<T>>,
    items: &mut Vec<T>,
) -> bool
where
    P: Combinators,
{
    let frame = parser.begin("interleave");
    let start = frame.start();
    let outcome = rule(parser);
    if outcome.is_failure() || parser.cursor() == start {
        parser.rollback(frame);
        return false;
    }
    items.extend(outcome.success().flatten());
    parser.commit(frame);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::rules::RuleStack;

    /// Minimal scanner over a fixed string, enough to drive the combinators.
    struct Toy {
        text: &'static str,
        rules: RuleStack,
        reported: Vec<String>,
    }

    impl Toy {
        fn new(text: &'static str) -> Self {
            Self {
                text,
                rules: RuleStack::new(),
                reported: Vec::new(),
            }
        }

        fn offset(&self) -> usize {
            self.cursor().offset()
        }

        fn lit(&mut self, literal: &str) -> Outcome<String> {
            if self.text[self.offset()..].starts_with(literal) {
                self.rules.advance(literal.len());
                Outcome::Success(literal.to_string())
            } else {
                Outcome::Failure
            }
        }

        fn letter(&mut self) -> Outcome<String> {
            match self.text[self.offset()..].chars().next() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.rules.advance(1);
                    Outcome::Success(c.to_string())
                }
                _ => Outcome::Failure,
            }
        }

        fn ab(&mut self) -> Outcome<String> {
            let frame = self.begin("ab");
            if self.lit("a").is_failure() {
                return self.fail(frame);
            }
            match self.lit("b") {
                Outcome::Success(_) => self.succeed(frame, "ab".to_string()),
                _ => self.fail(frame),
            }
        }

        fn a(&mut self) -> Outcome<String> {
            self.lit("a")
        }

        fn nothing(&mut self) -> Outcome<String> {
            Outcome::Success(String::new())
        }
    }

    impl Backtrack for Toy {
        fn rules(&self) -> &RuleStack {
            &self.rules
        }

        fn rules_mut(&mut self) -> &mut RuleStack {
            &mut self.rules
        }

        fn report_expected(&mut self, description: &str) {
            self.reported.push(format!("Expected {description}"));
        }
    }

    impl Combinators for Toy {
        fn skip_whitespace(&mut self) -> bool {
            let count = self.text[self.offset()..]
                .chars()
                .take_while(|c| *c == ' ')
                .count();
            self.rules.advance(count);
            count > 0
        }
    }

    #[test]
    fn test_one_of_prefers_listed_order() {
        let mut toy = Toy::new("ab");
        let outcome = toy.one_of(&[Toy::ab, Toy::a]);
        assert_eq!(outcome, Outcome::Success("ab".to_string()));

        let mut toy = Toy::new("ab");
        let outcome = toy.one_of(&[Toy::a, Toy::ab]);
        assert_eq!(outcome, Outcome::Success("a".to_string()));
        assert_eq!(toy.offset(), 1);
    }

    #[test]
    fn test_one_of_rolls_back_partial_attempts() {
        let mut toy = Toy::new("ac");
        let outcome = toy.one_of(&[Toy::ab]);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(toy.offset(), 0);
        assert_eq!(toy.rules.depth(), 0);
    }

    #[test]
    fn test_optional_never_fails() {
        let mut toy = Toy::new("x");
        assert_eq!(toy.optional(Toy::ab), Outcome::Success(None));
        assert_eq!(toy.offset(), 0);

        let mut toy = Toy::new("abx");
        assert_eq!(toy.optional(Toy::ab), Outcome::Success(Some("ab".to_string())));
        assert_eq!(toy.offset(), 2);
    }

    #[test]
    fn test_interleave_terminates_on_empty_input() {
        let mut toy = Toy::new("");
        let items: Vec<String> = toy.interleave(|t| t.optional(Toy::letter), |t| t.optional(Toy::nothing));
        assert!(items.is_empty());
        assert_eq!(toy.offset(), 0);
    }

    #[test]
    fn test_interleave_rejects_zero_width_steps() {
        let mut toy = Toy::new("abc");
        let items = toy.interleave(
            |t: &mut Toy| t.nothing().map(Some),
            |t: &mut Toy| t.letter().map(Some),
        );
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(toy.offset(), 3);
    }

    #[test]
    fn test_interleave_with_excluded_separator() {
        let mut toy = Toy::new("a,b,c!");
        let items: Vec<String> = toy.interleave(
            |t| t.optional(Toy::letter),
            |t| t.exclude(|t: &mut Toy| t.lit(",")),
        );
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(toy.offset(), 5);
    }

    #[test]
    fn test_peek_is_zero_width() {
        let mut toy = Toy::new("ab");
        assert!(toy.peek(Toy::ab));
        assert!(!toy.peek(|t: &mut Toy| t.lit("b")));
        assert_eq!(toy.offset(), 0);
    }

    #[test]
    fn test_spaced_consumes_surrounding_whitespace() {
        let mut toy = Toy::new("  a  b");
        assert!(toy.spaced(Toy::a).is_success());
        assert_eq!(toy.offset(), 5);

        let mut toy = Toy::new("  b");
        assert!(toy.spaced(Toy::a).is_failure());
        assert_eq!(toy.offset(), 0);
    }

    #[test]
    fn test_expect_reports_and_recovers() {
        let mut toy = Toy::new("xyz");
        let outcome = toy.expect(Toy::ab, "ab", None);
        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(toy.reported, vec!["Expected ab"]);

        fn skip_all(toy: &mut Toy) -> Outcome<()> {
            let rest = toy.text.len() - toy.offset();
            toy.rules.advance(rest);
            Outcome::Success(())
        }
        let outcome = toy.expect(Toy::ab, "ab", Some(skip_all));
        assert_eq!(outcome, Outcome::Recovered);
        assert_eq!(toy.offset(), 3);
        assert_eq!(toy.reported.len(), 2);
    }

    #[test]
    fn test_expect_passes_success_through_silently() {
        let mut toy = Toy::new("ab");
        assert_eq!(toy.expect(Toy::ab, "ab", None), Outcome::Success("ab".to_string()));
        assert!(toy.reported.is_empty());
    }
}
