//! The inkparse Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use crate::{
    config::ParserConfig,
    errors::print_error,
    session::{discover_ink_files, ParseSession},
};

pub mod output;

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "inkparse",
    version,
    about = "Parse ink stories into syntax trees and report every recoverable problem."
)]
pub struct InkArgs {
    /// YAML file with parser limits and the include root.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ArgsCommand,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Parse one file and print its syntax tree.
    Parse {
        /// The path to the ink file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON instead of an outline.
        #[arg(long)]
        json: bool,
    },
    /// Parse every `.ink` file under a directory and summarise the results.
    Check {
        /// A directory to search, or a single file.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI. Exits with status 1 when any file
/// produced diagnostics.
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = InkArgs::parse();
    let config = load_config_or_exit(args.config.as_deref());
    let session = ParseSession::new(config);

    let clean = match args.command {
        ArgsCommand::Parse { file, json } => parse_command(&session, &file, json),
        ArgsCommand::Check { path } => check_command(&session, &path),
    };

    if !clean {
        process::exit(1);
    }
}

fn parse_command(session: &ParseSession, file: &Path, json: bool) -> bool {
    let report = session.parse_file(file).unwrap_or_else(|e| {
        print_error(e);
        process::exit(1);
    });

    if json {
        if let Err(e) = output::print_json(&report) {
            print_error(e);
            process::exit(1);
        }
    } else {
        output::print_document(&report);
    }
    output::print_diagnostics(&report.diagnostics);

    !report.had_errors()
}

fn check_command(session: &ParseSession, path: &Path) -> bool {
    let files = discover_ink_files(path).unwrap_or_else(|e| {
        print_error(e);
        process::exit(1);
    });

    let mut summary = output::CheckSummary::default();
    for file in &files {
        match session.parse_file(file) {
            Ok(report) => {
                output::print_check_line(file, !report.had_errors(), report.diagnostics.len());
                output::print_diagnostics(&report.diagnostics);
                summary.record(!report.had_errors());
            }
            Err(e) => {
                output::print_check_line(file, false, 0);
                print_error(e);
                summary.record(false);
            }
        }
    }
    output::print_summary(&summary);

    summary.failed == 0
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn load_config_or_exit(path: Option<&Path>) -> ParserConfig {
    let Some(path) = path else {
        return ParserConfig::default();
    };
    log::debug!("loading configuration from {}", path.display());
    ParserConfig::load(path).unwrap_or_else(|e| {
        print_error(e);
        process::exit(1);
    })
}
