//! Parser configuration, loaded from YAML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::InkError;

/// Limits and include resolution settings for a parse session.
///
/// ```yaml
/// max_nesting_depth: 32
/// max_expression_depth: 64
/// max_include_depth: 16
/// include_root: stories/
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Deepest allowed `{ ... }` nesting before the parse is abandoned.
    pub max_nesting_depth: usize,
    /// Deepest allowed nesting of parentheses and unary operators inside one
    /// expression before the parse is abandoned.
    pub max_expression_depth: usize,
    /// Deepest allowed chain of `include` statements.
    pub max_include_depth: usize,
    /// Directory include paths are resolved against. Defaults to the
    /// directory of the top-level file.
    pub include_root: Option<PathBuf>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 32,
            max_expression_depth: 64,
            max_include_depth: 16,
            include_root: None,
        }
    }
}

impl ParserConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Reads and parses a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, InkError> {
        let text = std::fs::read_to_string(path).map_err(|source| InkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| InkError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
