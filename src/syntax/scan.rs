//! Character-level scanning primitives.
//!
//! These are the only functions that move the cursor forward. Each one either
//! consumes exactly what it matched or leaves the cursor where it was.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Expr;

use super::parser::Parser;
use super::rules::{Backtrack, Outcome};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern is valid"));

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?").expect("number pattern is valid"));

/// Spaces and tabs; line breaks are significant and never count.
pub(crate) fn is_inline_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl Parser {
    /// Unconsumed input.
    pub(crate) fn remaining(&self) -> &str {
        &self.source.content[self.cursor().offset()..]
    }

    pub fn at_end(&self) -> bool {
        self.remaining().is_empty()
    }

    fn consume(&mut self, bytes: usize) -> String {
        let text = self.remaining()[..bytes].to_string();
        self.rules.advance(bytes);
        text
    }

    pub fn scan_literal(&mut self, literal: &str) -> bool {
        if self.remaining().starts_with(literal) {
            self.rules.advance(literal.len());
            true
        } else {
            false
        }
    }

    /// Skips spaces and tabs.
    pub fn scan_whitespace(&mut self) -> bool {
        self.scan_char_class(is_inline_whitespace).is_some()
    }

    /// The longest non-empty run of characters satisfying `class`.
    pub fn scan_char_class(&mut self, class: impl Fn(char) -> bool) -> Option<String> {
        let len: usize = self
            .remaining()
            .chars()
            .take_while(|c| class(*c))
            .map(char::len_utf8)
            .sum();
        (len > 0).then(|| self.consume(len))
    }

    /// Everything up to (not including) the first of `stop`, or to the end.
    pub fn scan_until(&mut self, stop: &[char]) -> Option<String> {
        self.scan_char_class(|c| !stop.contains(&c))
    }

    pub fn scan_identifier(&mut self) -> Option<String> {
        let len = IDENTIFIER.find(self.remaining())?.end();
        Some(self.consume(len))
    }

    /// Matches `keyword` only as a whole identifier, so `include` does not
    /// match the start of `included`.
    pub fn scan_keyword(&mut self, keyword: &str) -> bool {
        let matched = IDENTIFIER
            .find(self.remaining())
            .filter(|m| m.as_str() == keyword)
            .map(|m| m.end());
        match matched {
            Some(len) => {
                self.rules.advance(len);
                true
            }
            None => false,
        }
    }

    /// An integer or decimal literal. Integers that do not fit in `i64` are
    /// not matched.
    pub fn scan_number(&mut self) -> Option<Expr> {
        let len = NUMBER.find(self.remaining())?.end();
        let digits = &self.remaining()[..len];
        let value = if digits.contains('.') {
            Expr::Float(digits.parse().ok()?)
        } else {
            Expr::Int(digits.parse().ok()?)
        };
        self.rules.advance(len);
        Some(value)
    }

    /// A double-quoted string on a single line, with escapes resolved.
    pub fn scan_string(&mut self) -> Option<String> {
        let (value, len) = string_literal(self.remaining())?;
        self.rules.advance(len);
        Some(value)
    }

    /// Literal story text: stops at braces, pipes, glue and line breaks.
    pub fn scan_content_text(&mut self) -> Option<String> {
        let rest = self.remaining();
        let mut len = 0;
        for (index, c) in rest.char_indices() {
            if matches!(c, '{' | '}' | '|' | '\n' | '\r') || rest[index..].starts_with("::") {
                break;
            }
            len = index + c.len_utf8();
        }
        (len > 0).then(|| self.consume(len))
    }

    pub fn literal(&mut self, text: &str) -> Outcome<()> {
        if self.scan_literal(text) {
            Outcome::Success(())
        } else {
            Outcome::Failure
        }
    }

    /// A line terminator, or the end of input.
    pub fn end_of_line(&mut self) -> Outcome<()> {
        if self.scan_literal("\r\n") || self.scan_literal("\n") || self.scan_literal("\r") || self.at_end() {
            Outcome::Success(())
        } else {
            Outcome::Failure
        }
    }

    /// Recovery: discards the rest of the current line and its terminator.
    pub fn skip_to_next_line(&mut self) -> Outcome<()> {
        self.scan_until(&['\n', '\r']);
        let _ = self.end_of_line();
        Outcome::Success(())
    }

    /// Skips blank lines, including trailing whitespace at the end of input.
    pub fn multiline_whitespace(&mut self) -> bool {
        let mut consumed = false;
        loop {
            let frame = self.begin("blank_line");
            self.scan_whitespace();
            if self.at_end() {
                consumed |= self.cursor() != frame.start();
                self.commit(frame);
                break;
            }
            if self.end_of_line().is_success() {
                consumed = true;
                self.commit(frame);
            } else {
                self.rollback(frame);
                break;
            }
        }
        consumed
    }
}

fn string_literal(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }

    let mut value = String::new();
    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Some((value, index + 1)),
            '\n' | '\r' => return None,
            '\\' => match chars.next()?.1 {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                escaped @ ('"' | '\\') => value.push(escaped),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            },
            _ => value.push(c),
        }
    }
    None
}
