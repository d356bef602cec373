//! File access for `include` statements.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Where included files come from. Text is expected to be UTF-8.
pub trait FileSource {
    fn read_file(&self, path: &str) -> io::Result<String>;
}

/// Reads files from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsFileSource {
    root: PathBuf,
}

impl FsFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl FileSource for FsFileSource {
    fn read_file(&self, path: &str) -> io::Result<String> {
        let resolved = self.root.join(path);
        log::debug!("reading include {}", resolved.display());
        std::fs::read_to_string(resolved)
    }
}

/// In-memory files, keyed by the exact include name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    files: HashMap<String, String>,
}

impl MemoryFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }
}

impl FileSource for MemoryFileSource {
    fn read_file(&self, path: &str) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
        })
    }
}
