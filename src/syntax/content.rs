//! Story content: text runs, glue, and inline `{ }` logic.

use crate::ast::{Conditional, Node, Span};
use crate::errors::ErrorKind;

use super::combinators::Combinators;
use super::parser::Parser;
use super::rules::{Backtrack, Outcome, Rule};
use super::scan::is_inline_whitespace;

/// Inner-logic candidates in priority order.
const INNER_LOGIC: [Rule<Parser, Node>; 3] = [
    Parser::inner_conditional_content,
    Parser::inner_expression,
    Parser::inner_sequence,
];

impl Parser {
    /// A full line of text and inline logic, terminated by a newline marker.
    pub fn line_of_mixed_text_and_logic(&mut self) -> Outcome<Vec<Node>> {
        let frame = self.begin("line_of_mixed_text_and_logic");
        let Outcome::Success(mut nodes) = self.mixed_text_and_logic() else {
            return self.fail(frame);
        };

        if let Some(first) = nodes.first_mut().and_then(Node::as_text_mut) {
            first.text = first.text.trim_start_matches(is_inline_whitespace).to_string();
            if first.text.is_empty() {
                nodes.remove(0);
            }
        }
        if nodes.is_empty() {
            return self.fail(frame);
        }

        // Trailing logic keeps its own node; the newline never merges into it.
        match nodes.last_mut().and_then(Node::as_text_mut) {
            Some(last) => {
                let kept = last.text.trim_end_matches(is_inline_whitespace).len();
                last.text.truncate(kept);
                last.text.push('\n');
            }
            None => nodes.push(Node::text("\n")),
        }

        let _ = self.expect(
            Parser::end_of_line,
            "end of line",
            Some(Parser::skip_to_next_line),
        );
        self.succeed(frame, nodes)
    }

    /// Text and inline logic in any order, as one flat run.
    pub fn mixed_text_and_logic(&mut self) -> Outcome<Vec<Node>> {
        let nodes = self.interleave(
            |p| p.optional(Parser::content_text),
            |p| p.optional(Parser::inline_logic_or_glue),
        );
        if nodes.is_empty() {
            Outcome::Failure
        } else {
            Outcome::Success(nodes)
        }
    }

    pub fn content_text(&mut self) -> Outcome<Node> {
        match self.scan_content_text() {
            Some(text) => Outcome::Success(Node::text(text)),
            None => Outcome::Failure,
        }
    }

    pub fn inline_logic_or_glue(&mut self) -> Outcome<Node> {
        self.one_of(&[Parser::inline_logic, Parser::glue])
    }

    /// `::` with no surrounding whitespace consumed.
    pub fn glue(&mut self) -> Outcome<Node> {
        if self.scan_literal("::") {
            Outcome::Success(Node::glue())
        } else {
            Outcome::Failure
        }
    }

    /// `{` inner logic `}`.
    ///
    /// Each opening brace is parsed at most once per pass. Later attempts at
    /// the same offset, from other inner-logic candidates or interleave
    /// steps, replay the stored result.
    pub fn inline_logic(&mut self) -> Outcome<Node> {
        if self.aborted || !self.remaining().starts_with('{') {
            return Outcome::Failure;
        }
        let start = self.cursor();
        if let Some(stored) = self.inline_logic_cache.get(&start.offset()).cloned() {
            log::trace!("replaying inline logic at {}", start.offset());
            return match stored {
                Some((end, node)) => {
                    self.rules_mut().advance(end.offset() - start.offset());
                    Outcome::Success(node)
                }
                None => Outcome::Failure,
            };
        }

        let outcome = self.braced_logic();
        if !self.aborted {
            let stored = match &outcome {
                Outcome::Success(node) => Some((self.cursor(), node.clone())),
                _ => None,
            };
            self.inline_logic_cache.insert(start.offset(), stored);
        }
        outcome
    }

    fn braced_logic(&mut self) -> Outcome<Node> {
        let frame = self.begin("inline_logic");
        if !self.scan_literal("{") || !self.enter_nesting() {
            return self.fail(frame);
        }

        self.scan_whitespace();
        let inner = self.expect(
            Parser::inner_logic,
            "inner logic or sequence between '{' and '}' braces",
            None,
        );
        self.nesting -= 1;
        let Outcome::Success(node) = inner else {
            return self.fail(frame);
        };

        // inner_logic only succeeds in front of '}'; this is a safety net.
        self.scan_whitespace();
        let closed = self.expect(
            |p: &mut Parser| p.literal("}"),
            "closing brace '}' for inline logic",
            None,
        );
        if closed.is_failure() {
            return self.fail(frame);
        }
        self.succeed(frame, node)
    }

    /// Picks the first candidate that accounts for everything up to the
    /// closing brace. A candidate that parses only a prefix is discarded and
    /// the next one starts again from the opening position.
    pub fn inner_logic(&mut self) -> Outcome<Node> {
        for candidate in INNER_LOGIC {
            let frame = self.begin("inner_logic");
            if let Outcome::Success(node) = candidate(self) {
                if self.peek(|p| p.spaced(|p: &mut Parser| p.literal("}"))) {
                    return self.succeed(frame, node);
                }
            }
            self.rollback(frame);
        }
        Outcome::Failure
    }

    pub fn inner_expression(&mut self) -> Outcome<Node> {
        self.expression().map(|expr| Node::expression(expr, true))
    }

    /// Branches separated by `|`. Empty branches contribute nothing.
    pub fn inner_sequence(&mut self) -> Outcome<Node> {
        let frame = self.begin("inner_sequence");
        let branches = self.interleave(
            |p| p.optional(Parser::mixed_text_and_logic),
            |p| p.exclude(|p: &mut Parser| p.literal("|")),
        );
        if branches.is_empty() {
            return self.fail(frame);
        }
        self.succeed(frame, Node::sequence(branches))
    }

    /// `condition: when-true` or `condition: when-true | when-false`.
    pub fn inner_conditional_content(&mut self) -> Outcome<Node> {
        let frame = self.begin("conditional_content");
        let Outcome::Success(condition) = self.expression() else {
            return self.fail(frame);
        };

        self.scan_whitespace();
        if self.remaining().starts_with("::") || !self.scan_literal(":") {
            return self.fail(frame);
        }
        self.scan_whitespace();
        let when_true = self.branch_content();

        let when_false = if self.scan_literal("|") {
            self.scan_whitespace();
            Some(self.branch_content())
        } else {
            None
        };

        self.succeed(
            frame,
            Node::Conditional(Conditional {
                condition,
                when_true,
                when_false,
            }),
        )
    }

    fn branch_content(&mut self) -> Vec<Node> {
        self.optional(Parser::mixed_text_and_logic)
            .success()
            .flatten()
            .unwrap_or_default()
    }

    /// Enters one more level of `{ }`. Past the configured limit the whole
    /// parse is abandoned.
    fn enter_nesting(&mut self) -> bool {
        let limit = self.config.max_nesting_depth;
        if self.nesting >= limit {
            let offset = self.cursor().offset();
            self.report(ErrorKind::NestingTooDeep { limit }, Span::point(offset));
            log::warn!(
                "{}: inline logic nested deeper than {} levels, abandoning parse",
                self.source.name,
                limit
            );
            self.aborted = true;
            return false;
        }
        self.nesting += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> (Option<String>, Vec<String>) {
        let mut parser = Parser::standalone("content.ink", text);
        let nodes = parser.line_of_mixed_text_and_logic().success().map(|nodes| {
            nodes.iter().map(Node::pretty).collect::<Vec<_>>().join(" ")
        });
        (nodes, parser.diagnostics().messages())
    }

    #[test]
    fn test_outer_whitespace_is_trimmed() {
        let (nodes, errors) = line("   Hello there  \n");
        assert_eq!(nodes.as_deref(), Some(r#""Hello there\n""#));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_trailing_logic_gets_separate_newline() {
        let (nodes, _) = line("Score: {points}\n");
        assert_eq!(nodes.as_deref(), Some(r#""Score: " (emit points) "\n""#));
    }

    #[test]
    fn test_whitespace_only_line_fails() {
        let mut parser = Parser::standalone("content.ink", "   \n");
        assert!(parser.line_of_mixed_text_and_logic().is_failure());
        assert_eq!(parser.cursor().offset(), 0);
    }

    #[test]
    fn test_expression_must_cover_braces() {
        let (nodes, _) = line("{x}\n");
        assert_eq!(nodes.as_deref(), Some(r#"(emit x) "\n""#));

        let (nodes, _) = line("{x|y}\n");
        assert_eq!(nodes.as_deref(), Some(r#"(seq ["x"] ["y"]) "\n""#));
    }

    #[test]
    fn test_conditional_content() {
        let (nodes, _) = line("{met: Hello again|Nice to meet you}\n");
        assert_eq!(
            nodes.as_deref(),
            Some(r#"(if met ["Hello again"] ["Nice to meet you"]) "\n""#)
        );

        let (nodes, _) = line("{gold > 5: rich}\n");
        assert_eq!(nodes.as_deref(), Some(r#"(if (> gold 5) ["rich"]) "\n""#));
    }

    #[test]
    fn test_too_many_branches_for_conditional_is_a_sequence() {
        let (nodes, _) = line("{x: a|b|c}\n");
        assert_eq!(nodes.as_deref(), Some(r#"(seq ["x: a"] ["b"] ["c"]) "\n""#));
    }

    #[test]
    fn test_empty_braces_are_reported() {
        let (nodes, errors) = line("before {} after\n");
        assert_eq!(nodes.as_deref(), Some(r#""before\n""#));
        assert_eq!(
            errors,
            vec![
                "Expected inner logic or sequence between '{' and '}' braces".to_string(),
                "Expected end of line".to_string(),
            ]
        );
    }

    #[test]
    fn test_repeated_brace_attempts_reuse_result() {
        let mut parser = Parser::standalone("content.ink", "{a|{b}} tail\n");
        assert!(parser.inline_logic().is_success());
        let end = parser.cursor();
        assert_eq!(end.offset(), 7);

        let mut replay = Parser::standalone("content.ink", "{a|{b}} tail\n");
        replay
            .inline_logic_cache
            .insert(0, Some((end, Node::text("stored"))));
        assert_eq!(replay.inline_logic(), Outcome::Success(Node::text("stored")));
        assert_eq!(replay.cursor(), end);
    }

    #[test]
    fn test_failed_brace_is_remembered() {
        let mut parser = Parser::standalone("content.ink", "{a:\n");
        assert!(parser.inline_logic().is_failure());
        assert_eq!(parser.inline_logic_cache.get(&0), Some(&None));
        assert!(parser.inline_logic().is_failure());
        assert_eq!(parser.cursor().offset(), 0);
    }

    #[test]
    fn test_nested_sequences() {
        let (nodes, _) = line("{a|{b|c}}\n");
        assert_eq!(nodes.as_deref(), Some(r#"(seq ["a"] [(seq ["b"] ["c"])]) "\n""#));
    }
}
