//! inkparse Error Handling
//!
//! Two families of errors live here:
//!
//! - [`ParseError`]: a recoverable problem found during a parse pass. These are
//!   appended to the shared [`Diagnostics`](crate::diagnostics::Diagnostics)
//!   sink and never abort the parse.
//! - [`InkError`]: failures outside a parse pass (unreadable top-level file,
//!   bad configuration, output serialisation).

use miette::{Diagnostic, LabeledSpan, NamedSource, Severity, SourceSpan};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::ast::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Source text plus the name it is reported under.
///
/// The miette source is built once; every diagnostic for this source shares it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: Arc<str>,
    named: Arc<NamedSource<String>>,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        let content: Arc<str> = content.into();
        let named = Arc::new(NamedSource::new(name.clone(), content.to_string()));
        Self {
            name,
            content,
            named,
        }
    }

    /// The shared NamedSource used for miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::clone(&self.named)
    }

    /// Line and column (both 1-based) of a byte offset. Columns count
    /// grapheme clusters so combined characters occupy a single column.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len());
        let before = &self.content[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].graphemes(true).count() + 1;
        Position { line, column }
    }
}

/// A human-facing source location.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// A recoverable diagnostic raised during parsing.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// Everything the grammar can complain about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Expected {description}")]
    Expected { description: String },

    #[error("Included file not found: {filename}")]
    IncludeNotFound { filename: String },

    #[error("Failed to parse included file '{filename}'")]
    IncludeFailed { filename: String },

    #[error("Include cycle: '{filename}' is already being included")]
    IncludeCycle { filename: String },

    #[error("Include of '{filename}' exceeds the maximum include depth of {limit}")]
    IncludeTooDeep { filename: String, limit: usize },

    #[error("Inline logic is nested deeper than the maximum of {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("Expression is nested deeper than the maximum of {limit} levels")]
    ExpressionTooDeep { limit: usize },
}

impl ErrorKind {
    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Expected { .. } => "expected",
            Self::IncludeNotFound { .. } => "include_not_found",
            Self::IncludeFailed { .. } => "include_failed",
            Self::IncludeCycle { .. } => "include_cycle",
            Self::IncludeTooDeep { .. } => "include_too_deep",
            Self::NestingTooDeep { .. } => "nesting_too_deep",
            Self::ExpressionTooDeep { .. } => "expression_too_deep",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::Expected { .. } => "expected here",
            Self::IncludeNotFound { .. } => "file not found",
            Self::IncludeFailed { .. } => "included file failed to parse",
            Self::IncludeCycle { .. } => "cyclic include",
            Self::IncludeTooDeep { .. } => "include too deep",
            Self::NestingTooDeep { .. } | Self::ExpressionTooDeep { .. } => "nested too deeply",
        }
    }

    fn default_help(&self) -> Option<&'static str> {
        match self {
            Self::IncludeNotFound { .. } => {
                Some("include paths are resolved relative to the including file")
            }
            Self::NestingTooDeep { .. }
            | Self::ExpressionTooDeep { .. }
            | Self::IncludeTooDeep { .. } => {
                Some("raise the limit in the parser configuration if this is intended")
            }
            _ => None,
        }
    }
}

/// Where in which source a diagnostic points.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub position: Position,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl ParseError {
    /// The plain message, e.g. `Expected end of line`.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn position(&self) -> Position {
        self.source_info.position
    }

    /// Name of the source the error was found in.
    pub fn source_name(&self) -> &str {
        self.source_info.source.name()
    }
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

/// Context-aware error creation - each context knows how to create appropriate errors
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: Span) -> ParseError;

    /// Convenience for the most common structural failure.
    fn expected(&self, description: &str, span: Span) -> ParseError {
        self.report(
            ErrorKind::Expected {
                description: description.into(),
            },
            span,
        )
    }
}

impl ErrorReporting for SourceContext {
    fn report(&self, kind: ErrorKind, span: Span) -> ParseError {
        let error_code = format!("inkparse::parse::{}", kind.code_suffix());
        let help = kind.default_help().map(String::from);

        ParseError {
            source_info: SourceInfo {
                source: self.to_named_source(),
                primary_span: to_source_span(span),
                position: self.position(span.start),
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
            kind,
        }
    }
}

/// Converts an AST Span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

// ============================================================================
// FATAL ERRORS
// ============================================================================

/// Failures that stop a command rather than being collected as diagnostics.
#[derive(Debug, Error, Diagnostic)]
pub enum InkError {
    #[error("Failed to read '{path}'")]
    #[diagnostic(code(inkparse::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory '{path}'")]
    #[diagnostic(code(inkparse::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid configuration in '{path}'")]
    #[diagnostic(
        code(inkparse::config),
        help("see ParserConfig for the supported keys")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialise the syntax tree")]
    #[diagnostic(code(inkparse::output))]
    Output(#[from] serde_json::Error),
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an error with full miette diagnostics
pub fn print_error<E>(error: E)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_counts_lines_and_graphemes() {
        let source = SourceContext::from_file("t.ink", "one\ne\u{301}x");
        assert_eq!(source.position(0), Position { line: 1, column: 1 });
        // "é" written as e + combining accent is one column wide
        assert_eq!(source.position(7), Position { line: 2, column: 2 });
    }

    #[test]
    fn test_report_fills_code_and_position() {
        let source = SourceContext::from_file("t.ink", "ab\ncd");
        let error = source.expected("end of line", Span::point(4));
        assert_eq!(error.message(), "Expected end of line");
        assert_eq!(error.diagnostic_info.error_code, "inkparse::parse::expected");
        assert_eq!(error.position(), Position { line: 2, column: 2 });
        assert_eq!(error.source_name(), "t.ink");
    }

    #[test]
    fn test_reports_share_one_source_copy() {
        let source = SourceContext::from_file("t.ink", "ab\ncd");
        let first = source.expected("one", Span::point(0));
        let second = source.report(ErrorKind::NestingTooDeep { limit: 2 }, Span::point(3));
        assert!(Arc::ptr_eq(&first.source_info.source, &second.source_info.source));
        assert!(Arc::ptr_eq(
            &source.to_named_source(),
            &source.clone().to_named_source()
        ));
    }
}
