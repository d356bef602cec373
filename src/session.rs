//! Parse sessions: one diagnostics sink, one configuration, any number of
//! files.
//!
//! A session is the owner of everything a parse pass shares. Each call to
//! [`ParseSession::parse_source`] or [`ParseSession::parse_file`] gets a fresh
//! sink, so reports never leak between files.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use walkdir::WalkDir;

use crate::ast::Document;
use crate::config::ParserConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::{InkError, ParseError, SourceContext};
use crate::files::{FileSource, FsFileSource};
use crate::syntax::Parser;

/// Everything a parse pass produced.
#[derive(Debug)]
pub struct ParseReport {
    pub name: String,
    /// Absent only when the parse had to be abandoned.
    pub document: Option<Document>,
    pub diagnostics: Vec<ParseError>,
}

impl ParseReport {
    pub fn had_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub struct ParseSession {
    config: Rc<ParserConfig>,
    files: Option<Rc<dyn FileSource>>,
}

impl ParseSession {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config: Rc::new(config),
            files: None,
        }
    }

    /// Serves includes from `files` instead of the filesystem.
    pub fn with_files(mut self, files: impl FileSource + 'static) -> Self {
        self.files = Some(Rc::new(files));
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses in-memory text. Includes resolve against the configured
    /// include root, or the working directory.
    pub fn parse_source(&self, name: &str, text: &str) -> ParseReport {
        let root = self
            .config
            .include_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        self.run(SourceContext::from_file(name, text), root)
    }

    /// Reads and parses a file. Includes resolve against the configured
    /// include root, or the file's own directory.
    pub fn parse_file(&self, path: &Path) -> Result<ParseReport, InkError> {
        let text = std::fs::read_to_string(path).map_err(|source| InkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = match &self.config.include_root {
            Some(root) => root.clone(),
            None => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let name = path.display().to_string();
        Ok(self.run(SourceContext::from_file(name, text), root))
    }

    fn run(&self, source: SourceContext, root: PathBuf) -> ParseReport {
        let files = match &self.files {
            Some(files) => Rc::clone(files),
            None => Rc::new(FsFileSource::new(root)) as Rc<dyn FileSource>,
        };
        let diagnostics = Diagnostics::new();
        let name = source.name.clone();

        log::debug!("parsing '{}'", name);
        let mut parser = Parser::new(source, diagnostics.clone(), files, Rc::clone(&self.config));
        let document = parser.parse();

        let diagnostics = diagnostics.take();
        log::debug!("'{}' parsed with {} diagnostic(s)", name, diagnostics.len());
        ParseReport {
            name,
            document,
            diagnostics,
        }
    }
}

impl Default for ParseSession {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

/// Recursively finds `.ink` files under `root`, sorted for a stable order.
/// A `root` that is itself a file is returned as is.
pub fn discover_ink_files(root: &Path) -> Result<Vec<PathBuf>, InkError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| InkError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if entry.depth() == 0 || is_ink_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_ink_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("ink")
}
