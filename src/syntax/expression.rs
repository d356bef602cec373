//! Expression grammar shared by `~` lines and inline `{ }` logic.
//!
//! Precedence climbs from `||` (loosest) to unary operators. Only spaces and
//! tabs may separate tokens; an expression never spans lines.

use crate::ast::{BinaryOp, Expr, Span, UnaryOp};
use crate::errors::ErrorKind;

use super::parser::Parser;
use super::rules::{Backtrack, Outcome};

/// Binary operators by precedence level, loosest first. Within a level the
/// longer spelling must come first.
const LEVELS: &[&[(&str, BinaryOp)]] = &[
    &[("||", BinaryOp::Or), ("or", BinaryOp::Or)],
    &[("&&", BinaryOp::And), ("and", BinaryOp::And)],
    &[("==", BinaryOp::Equal), ("!=", BinaryOp::NotEqual)],
    &[
        ("<=", BinaryOp::LessEqual),
        (">=", BinaryOp::GreaterEqual),
        ("<", BinaryOp::Less),
        (">", BinaryOp::Greater),
    ],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Subtract)],
    &[
        ("*", BinaryOp::Multiply),
        ("/", BinaryOp::Divide),
        ("%", BinaryOp::Modulo),
    ],
];

/// Words that can never name a variable.
const RESERVED: &[&str] = &["and", "or", "not", "var", "return", "include"];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

impl Parser {
    pub fn expression(&mut self) -> Outcome<Expr> {
        if self.aborted || !self.enter_expression() {
            return Outcome::Failure;
        }
        let frame = self.begin("expression");
        let outcome = self.binary_level(0);
        self.expression_depth -= 1;
        self.resolve(frame, outcome)
    }

    /// Enters one more level of parentheses or unary operators. Past the
    /// configured limit the whole parse is abandoned.
    fn enter_expression(&mut self) -> bool {
        let limit = self.config.max_expression_depth;
        if self.expression_depth >= limit {
            let offset = self.cursor().offset();
            self.report(ErrorKind::ExpressionTooDeep { limit }, Span::point(offset));
            log::warn!(
                "{}: expression nested deeper than {} levels, abandoning parse",
                self.source.name,
                limit
            );
            self.aborted = true;
            return false;
        }
        self.expression_depth += 1;
        true
    }

    fn binary_level(&mut self, level: usize) -> Outcome<Expr> {
        let Some(operators) = LEVELS.get(level) else {
            return self.unary();
        };

        let Outcome::Success(mut left) = self.binary_level(level + 1) else {
            return Outcome::Failure;
        };

        loop {
            // Operator and right operand stand or fall together, so `a +`
            // leaves the `+` unconsumed.
            let frame = self.begin("binary_operator");
            self.scan_whitespace();
            let Some(op) = self.binary_operator(operators) else {
                self.rollback(frame);
                break;
            };
            self.scan_whitespace();
            match self.binary_level(level + 1) {
                Outcome::Success(right) => {
                    self.commit(frame);
                    left = Expr::binary(op, left, right);
                }
                _ => {
                    self.rollback(frame);
                    break;
                }
            }
        }
        Outcome::Success(left)
    }

    fn binary_operator(&mut self, operators: &[(&str, BinaryOp)]) -> Option<BinaryOp> {
        operators.iter().find_map(|&(symbol, op)| {
            let matched = if symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
                self.scan_keyword(symbol)
            } else {
                self.scan_literal(symbol)
            };
            matched.then_some(op)
        })
    }

    fn unary(&mut self) -> Outcome<Expr> {
        let frame = self.begin("unary");
        let op = if self.scan_literal("-") {
            Some(UnaryOp::Negate)
        } else if !self.remaining().starts_with("!=") && self.scan_literal("!") {
            Some(UnaryOp::Not)
        } else if self.scan_keyword("not") {
            Some(UnaryOp::Not)
        } else {
            None
        };

        let Some(op) = op else {
            let outcome = self.primary();
            return self.resolve(frame, outcome);
        };

        if !self.enter_expression() {
            return self.fail(frame);
        }
        self.scan_whitespace();
        let operand = self.unary();
        self.expression_depth -= 1;
        match operand {
            Outcome::Success(operand) => self.succeed(frame, Expr::unary(op, operand)),
            _ => self.fail(frame),
        }
    }

    fn primary(&mut self) -> Outcome<Expr> {
        let frame = self.begin("primary");

        if let Some(number) = self.scan_number() {
            return self.succeed(frame, number);
        }
        if let Some(text) = self.scan_string() {
            return self.succeed(frame, Expr::Str(text));
        }
        if self.scan_literal("(") {
            self.scan_whitespace();
            let Outcome::Success(inner) = self.expression() else {
                return self.fail(frame);
            };
            self.scan_whitespace();
            if !self.scan_literal(")") {
                return self.fail(frame);
            }
            return self.succeed(frame, inner);
        }

        let Some(name) = self.scan_identifier() else {
            return self.fail(frame);
        };
        if name == "true" || name == "false" {
            return self.succeed(frame, Expr::Bool(name == "true"));
        }
        if is_reserved(&name) {
            return self.fail(frame);
        }
        if !self.scan_literal("(") {
            return self.succeed(frame, Expr::Variable(name));
        }
        match self.call_arguments() {
            Outcome::Success(args) => self.succeed(frame, Expr::Call { name, args }),
            _ => self.fail(frame),
        }
    }

    /// Comma-separated arguments after an opening parenthesis, through the
    /// closing one.
    fn call_arguments(&mut self) -> Outcome<Vec<Expr>> {
        let frame = self.begin("call_arguments");
        let mut args = Vec::new();

        self.scan_whitespace();
        if self.scan_literal(")") {
            return self.succeed(frame, args);
        }
        loop {
            self.scan_whitespace();
            let Outcome::Success(arg) = self.expression() else {
                return self.fail(frame);
            };
            args.push(arg);
            self.scan_whitespace();
            if self.scan_literal(")") {
                return self.succeed(frame, args);
            }
            if !self.scan_literal(",") {
                return self.fail(frame);
            }
        }
    }
}
