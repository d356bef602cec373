//! `~` logic lines: includes, returns, variable assignment and bare
//! expressions.

use crate::ast::{Assignment, Document, Node, Return, Span};
use crate::errors::ErrorKind;

use super::combinators::Combinators;
use super::expression::is_reserved;
use super::parser::Parser;
use super::rules::{Backtrack, Outcome};
use super::scan::is_inline_whitespace;

impl Parser {
    /// `~` followed by exactly one statement and the end of the line.
    pub fn logic_line(&mut self) -> Outcome<Node> {
        let frame = self.begin("logic_line");
        self.scan_whitespace();
        if !self.scan_literal("~") {
            return self.fail(frame);
        }
        self.scan_whitespace();

        // Assignment before expression: both may start with an identifier.
        let statement = self.expect(
            |p: &mut Parser| {
                p.one_of(&[
                    Parser::include_statement,
                    Parser::return_statement,
                    Parser::variable_declaration_or_assignment,
                    Parser::expression_statement,
                ])
            },
            "expression after '~'",
            Some(Parser::skip_to_next_line),
        );

        if let Outcome::Success(_) = statement {
            self.scan_whitespace();
            let _ = self.expect(
                Parser::end_of_line,
                "end of line",
                Some(Parser::skip_to_next_line),
            );
        }
        self.resolve(frame, statement)
    }

    /// `include <filename>`. Succeeds whenever the keyword is present; any
    /// problem with the file is reported and leaves the document absent.
    pub fn include_statement(&mut self) -> Outcome<Node> {
        let frame = self.begin("include_statement");
        if !self.scan_keyword("include") {
            return self.fail(frame);
        }
        self.scan_whitespace();

        let start = self.cursor();
        let filename = match self.expect(
            Parser::include_filename,
            "filename for include statement",
            None,
        ) {
            Outcome::Success(filename) => filename,
            _ => return self.succeed(frame, Node::include("", None)),
        };
        let span = start.span_to(self.cursor());

        let document = self.resolve_include(&filename, span);
        self.succeed(frame, Node::include(filename, document))
    }

    fn include_filename(&mut self) -> Outcome<String> {
        let Some(raw) = self.scan_until(&['\n', '\r']) else {
            return Outcome::Failure;
        };
        Outcome::Success(raw.trim_end_matches(is_inline_whitespace).to_string())
    }

    /// Reads and parses an included file with a fresh parser sharing this
    /// one's diagnostics.
    fn resolve_include(&mut self, filename: &str, span: Span) -> Option<Document> {
        if self.include_chain.iter().any(|active| active == filename) {
            self.report(
                ErrorKind::IncludeCycle {
                    filename: filename.to_string(),
                },
                span,
            );
            return None;
        }

        let limit = self.config.max_include_depth;
        if self.include_chain.len() > limit {
            self.report(
                ErrorKind::IncludeTooDeep {
                    filename: filename.to_string(),
                    limit,
                },
                span,
            );
            return None;
        }

        let text = match self.files.read_file(filename) {
            Ok(text) => text,
            Err(err) => {
                log::debug!("include '{}' could not be read: {}", filename, err);
                self.report(
                    ErrorKind::IncludeNotFound {
                        filename: filename.to_string(),
                    },
                    span,
                );
                return None;
            }
        };

        log::debug!(
            "parsing include '{}' from '{}' (depth {})",
            filename,
            self.source.name,
            self.include_chain.len()
        );
        let mut nested = self.nested(filename, text);
        let document = nested.parse();

        // The nested parse usually explains its own failure.
        if document.is_none() && !nested.had_error() {
            self.report(
                ErrorKind::IncludeFailed {
                    filename: filename.to_string(),
                },
                span,
            );
        }
        document
    }

    /// `return` with an optional value.
    pub fn return_statement(&mut self) -> Outcome<Node> {
        let frame = self.begin("return_statement");
        if !self.scan_keyword("return") {
            return self.fail(frame);
        }
        self.scan_whitespace();
        let value = self.optional(Parser::expression).success().flatten();
        self.succeed(frame, Node::Return(Return { value }))
    }

    /// `var name = value`, `var name` or `name = value`.
    pub fn variable_declaration_or_assignment(&mut self) -> Outcome<Node> {
        let frame = self.begin("variable_declaration_or_assignment");

        let keyword = self.begin("var_keyword");
        let declares = self.scan_keyword("var") && self.scan_whitespace();
        if declares {
            self.commit(keyword);
        } else {
            self.rollback(keyword);
        }

        let Some(name) = self.scan_identifier().filter(|name| !is_reserved(name)) else {
            return self.fail(frame);
        };
        self.scan_whitespace();

        // `==` is comparison, never assignment.
        if self.remaining().starts_with("==") || !self.scan_literal("=") {
            if !declares {
                return self.fail(frame);
            }
            let node = Node::Assignment(Assignment {
                name,
                value: None,
                declares,
            });
            return self.succeed(frame, node);
        }

        self.scan_whitespace();
        match self.expression() {
            Outcome::Success(value) => self.succeed(
                frame,
                Node::Assignment(Assignment {
                    name,
                    value: Some(value),
                    declares,
                }),
            ),
            _ => self.fail(frame),
        }
    }

    /// A bare expression evaluated for its effect; its value is not output.
    pub fn expression_statement(&mut self) -> Outcome<Node> {
        self.expression().map(|expr| Node::expression(expr, false))
    }
}
