//! Syntax module for the ink language
//!
//! A backtracking recursive-descent parser built in layers:
//!
//! - [`rules`]: the cursor-owning rule engine (`begin`/`fail`/`succeed`/`expect`)
//! - [`combinators`]: grammar-agnostic operators built only on the engine
//! - [`parser`] with the productions in `scan`, `expression`, `logic` and
//!   `content`: the ink grammar itself

pub mod combinators;
pub mod cursor;
mod content;
mod expression;
mod logic;
pub mod parser;
pub mod rules;
mod scan;

pub use combinators::Combinators;
pub use cursor::Cursor;
pub use parser::Parser;
pub use rules::{Backtrack, Frame, Outcome, Rule, RuleStack};
