//! inkparse: the parsing front end for the ink interactive-fiction language.
//!
//! ```rust
//! use inkparse::ParseSession;
//!
//! let report = ParseSession::default().parse_source("story.ink", "Hello {name}!\n");
//! assert!(!report.had_errors());
//! assert_eq!(
//!     report.document.unwrap().pretty(),
//!     r#""Hello " (emit name) "!\n""#
//! );
//! ```

pub use crate::ast::{Document, Expr, Node};
pub use crate::config::ParserConfig;
pub use crate::diagnostics::Diagnostics;
pub use crate::errors::{ErrorKind, InkError, ParseError};
pub use crate::files::{FileSource, FsFileSource, MemoryFileSource};
pub use crate::session::{ParseReport, ParseSession};
pub use crate::syntax::Parser;

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod files;
pub mod session;
pub mod syntax;
