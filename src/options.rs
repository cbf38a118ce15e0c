//! Parser limits and behavior switches.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Max tokens in a single WIDTH/HEIGHT/WHEN expression.
pub const MAX_SZEXP_SIZE: usize = 32;
/// Max HOOK directives per pass.
pub const SHADER_MAX_HOOKS: usize = 16;
/// Max BIND directives per pass.
pub const SHADER_MAX_BINDS: usize = 6;
/// Max (hooked) passes kept from one shader file.
pub const SHADER_MAX_PASSES: usize = 32;

/// Limits applied while parsing. Missing JSON fields fall back to the
/// compiled-in constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    pub max_szexp_size: usize,
    pub max_hooks: usize,
    pub max_binds: usize,
    pub max_passes: usize,
    /// Reject size-expression words like `+foo` instead of reading them as
    /// a bare operator.
    pub strict_operators: bool,
    /// Require OFFSET, COMPONENTS and size-expression constants to be whole
    /// numbers with nothing after them, instead of reading the leading value.
    pub strict_numbers: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_szexp_size: MAX_SZEXP_SIZE,
            max_hooks: SHADER_MAX_HOOKS,
            max_binds: SHADER_MAX_BINDS,
            max_passes: SHADER_MAX_PASSES,
            strict_operators: false,
            strict_numbers: false,
        }
    }
}

impl ParserOptions {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid parser options json")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("in options file {}", path.display()))
    }
}
