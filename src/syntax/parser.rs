//! The ink parser: state shared by every grammar production, and the
//! document-level entry point.
//!
//! Productions are spread over sibling modules as `impl Parser` blocks:
//! [`scan`](super::scan) for character-level primitives,
//! [`logic`](super::logic) for `~` lines and includes,
//! [`content`](super::content) for text, glue and inline logic, and
//! [`expression`](super::expression) for the expression grammar.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Document, Node, Span};
use crate::config::ParserConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::{ErrorKind, ErrorReporting, SourceContext};
use crate::files::{FileSource, MemoryFileSource};

use super::combinators::Combinators;
use super::cursor::Cursor;
use super::rules::{Backtrack, Outcome, RuleStack};

/// A recursive-descent parser over one source file.
///
/// Included files are parsed by fresh `Parser`s that share this parser's
/// diagnostics sink, file source and configuration.
pub struct Parser {
    pub(crate) source: SourceContext,
    pub(crate) rules: RuleStack,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) files: Rc<dyn FileSource>,
    pub(crate) config: Rc<ParserConfig>,
    /// Files currently being included, outermost first, this file last.
    pub(crate) include_chain: Vec<String>,
    /// Current `{ ... }` depth.
    pub(crate) nesting: usize,
    /// Current depth of parenthesised and unary sub-expressions.
    pub(crate) expression_depth: usize,
    /// Set once a limit is exceeded; the document is then discarded.
    pub(crate) aborted: bool,
    /// Finished `{ ... }` attempts by start offset: the end cursor and node,
    /// or `None` if the attempt failed.
    pub(crate) inline_logic_cache: HashMap<usize, Option<(Cursor, Node)>>,
    /// Diagnostics this parser raised, including repeats the sink dropped.
    reported: usize,
}

impl Parser {
    pub fn new(
        source: SourceContext,
        diagnostics: Diagnostics,
        files: Rc<dyn FileSource>,
        config: Rc<ParserConfig>,
    ) -> Self {
        let include_chain = vec![source.name.clone()];
        Self {
            source,
            rules: RuleStack::new(),
            diagnostics,
            files,
            config,
            include_chain,
            nesting: 0,
            expression_depth: 0,
            aborted: false,
            inline_logic_cache: HashMap::new(),
            reported: 0,
        }
    }

    /// A parser with default configuration, its own diagnostics sink and no
    /// includable files.
    pub fn standalone(name: &str, text: &str) -> Self {
        Self::new(
            SourceContext::from_file(name, text),
            Diagnostics::new(),
            Rc::new(MemoryFileSource::new()),
            Rc::new(ParserConfig::default()),
        )
    }

    /// Parser for a file included from this one.
    pub(crate) fn nested(&self, filename: &str, text: String) -> Parser {
        let mut parser = Parser::new(
            SourceContext::from_file(filename, text),
            self.diagnostics.clone(),
            Rc::clone(&self.files),
            Rc::clone(&self.config),
        );
        let mut chain = self.include_chain.clone();
        chain.push(filename.to_string());
        parser.include_chain = chain;
        parser
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn source(&self) -> &SourceContext {
        &self.source
    }

    /// Whether this parser reported anything since its parse began, even
    /// if the sink already held an identical diagnostic.
    pub fn had_error(&self) -> bool {
        self.reported > 0
    }

    /// Parses the whole source.
    ///
    /// Recoverable problems are reported to the diagnostics sink and the
    /// parse carries on. The document is absent only when the parse had to
    /// be abandoned.
    pub fn parse(&mut self) -> Option<Document> {
        self.reported = 0;
        let content = self.document_content();
        if self.aborted {
            return None;
        }
        Some(Document {
            name: self.source.name.clone(),
            content,
        })
    }

    /// Parses statements until the input is exhausted.
    pub fn document_content(&mut self) -> Vec<Node> {
        let mut content = Vec::new();
        loop {
            self.multiline_whitespace();
            if self.at_end() || self.aborted {
                break;
            }

            let before = self.cursor();
            match self.expect(
                Parser::statement,
                "line of content",
                Some(Parser::skip_to_next_line),
            ) {
                Outcome::Success(nodes) => content.extend(nodes),
                Outcome::Recovered => {}
                Outcome::Failure => break,
            }
            if self.cursor() == before {
                break;
            }
        }
        content
    }

    /// A single logic line or line of mixed text and logic.
    pub fn statement(&mut self) -> Outcome<Vec<Node>> {
        self.one_of(&[
            |p: &mut Parser| p.logic_line().map(|node| vec![node]),
            Parser::line_of_mixed_text_and_logic,
        ])
    }

    /// Adds a diagnostic for this source, unless the parse was abandoned.
    pub(crate) fn report(&mut self, kind: ErrorKind, span: Span) {
        if self.aborted {
            return;
        }
        self.reported += 1;
        self.diagnostics.report(self.source.report(kind, span));
    }
}

impl Backtrack for Parser {
    fn rules(&self) -> &RuleStack {
        &self.rules
    }

    fn rules_mut(&mut self) -> &mut RuleStack {
        &mut self.rules
    }

    fn report_expected(&mut self, description: &str) {
        let span = Span::point(self.cursor().offset());
        self.report(
            ErrorKind::Expected {
                description: description.to_string(),
            },
            span,
        );
    }
}

impl Combinators for Parser {
    fn skip_whitespace(&mut self) -> bool {
        self.scan_whitespace()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("source", &self.source.name)
            .field("cursor", &self.rules.cursor())
            .field("include_chain", &self.include_chain)
            .field("nesting", &self.nesting)
            .field("expression_depth", &self.expression_depth)
            .field("aborted", &self.aborted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Option<Document>, Vec<String>) {
        let mut parser = Parser::standalone("test.ink", text);
        let document = parser.parse();
        (document, parser.diagnostics().messages())
    }

    #[test]
    fn test_empty_input() {
        let (document, errors) = parse("");
        assert!(document.unwrap().content.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let (document, errors) = parse("\n  \nHello\n\n\nWorld\n");
        assert_eq!(document.unwrap().pretty(), r#""Hello\n" "World\n""#);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unparseable_line_is_reported_and_skipped() {
        let (document, errors) = parse("}\nafter\n");
        assert_eq!(document.unwrap().pretty(), r#""after\n""#);
        assert_eq!(errors, vec!["Expected line of content".to_string()]);
    }

    #[test]
    fn test_had_error_counts_only_own_reports() {
        let sink = Diagnostics::new();
        let first = SourceContext::from_file("a.ink", "}\n");
        let mut parser = Parser::new(
            first,
            sink.clone(),
            Rc::new(MemoryFileSource::new()),
            Rc::new(ParserConfig::default()),
        );
        parser.parse();
        assert!(parser.had_error());

        let second = SourceContext::from_file("b.ink", "fine\n");
        let mut parser = Parser::new(
            second,
            sink.clone(),
            Rc::new(MemoryFileSource::new()),
            Rc::new(ParserConfig::default()),
        );
        parser.parse();
        assert!(!parser.had_error());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_had_error_survives_repeat_suppression() {
        let sink = Diagnostics::new();
        for _ in 0..2 {
            let mut parser = Parser::new(
                SourceContext::from_file("a.ink", "}\n"),
                sink.clone(),
                Rc::new(MemoryFileSource::new()),
                Rc::new(ParserConfig::default()),
            );
            parser.parse();
            assert!(parser.had_error());
        }
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_cursor_is_balanced_after_parse() {
        let mut parser = Parser::standalone("t.ink", "Hi {a|b}\n~ x = 1\n");
        parser.parse();
        assert_eq!(parser.rules.depth(), 0);
        assert!(parser.at_end());
    }
}
