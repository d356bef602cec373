//! Handles all user-facing output for the CLI.
//!
//! Syntax trees go to stdout, diagnostics to stderr. Colour is only used
//! when the stream is a terminal.

use std::io::Write;
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::{InkError, ParseError};
use crate::session::ParseReport;

/// Pass/fail counts for `check`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckSummary {
    pub passed: usize,
    pub failed: usize,
}

impl CheckSummary {
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints one outline line per top-level node.
pub fn print_document(report: &ParseReport) {
    let Some(document) = &report.document else {
        eprintln!("{}: no document produced", report.name);
        return;
    };
    if document.content.is_empty() {
        println!("(empty)");
        return;
    }
    for node in &document.content {
        println!("{}", node.pretty());
    }
}

pub fn print_json(report: &ParseReport) -> Result<(), InkError> {
    let json = serde_json::to_string_pretty(&report.document)?;
    println!("{json}");
    Ok(())
}

/// Renders each diagnostic with its source snippet.
pub fn print_diagnostics(diagnostics: &[ParseError]) {
    for error in diagnostics {
        let report = miette::Report::new(error.clone());
        eprintln!("{report:?}");
    }
}

pub fn print_check_line(file: &Path, passed: bool, diagnostics: usize) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let (mark, color) = if passed {
        ("✓", Color::Green)
    } else {
        ("✗", Color::Red)
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{mark}");
    let _ = stdout.reset();
    if diagnostics > 0 {
        let _ = writeln!(stdout, " {} ({} diagnostics)", file.display(), diagnostics);
    } else {
        let _ = writeln!(stdout, " {}", file.display());
    }
}

pub fn print_summary(summary: &CheckSummary) {
    let mut stdout = StandardStream::stdout(color_choice(atty::Stream::Stdout));
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(stdout, "\nCheck Summary");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "═════════════");

    if summary.passed > 0 {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        let _ = writeln!(stdout, "✓ Passed: {} files", summary.passed);
    }
    if summary.failed > 0 {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        let _ = writeln!(stdout, "✗ Failed: {} files", summary.failed);
    }
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
