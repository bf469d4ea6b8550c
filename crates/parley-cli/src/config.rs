//! CLI configuration.
//!
//! Read from a TOML file, looked up at `--config`, then `$PARLEY_CONFIG`,
//! then `./parley.toml`. A missing file yields the defaults; command-line
//! flags override whatever the file sets.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::render::OutputFormat;

const DEFAULT_CONFIG_FILE: &str = "parley.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    /// Default output format when `--format` is not given.
    #[serde(default)]
    pub format: OutputFormat,

    /// Number of connections listed by the table renderer.
    #[serde(default = "default_top_edges")]
    pub top_edges: usize,

    /// Decimal places for strengths in text output.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            top_edges: default_top_edges(),
            precision: default_precision(),
        }
    }
}

/// Telegram export adapter options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramConfig {
    /// Detect `@handle` mentions in plain text when a message has no entities.
    #[serde(default = "default_true")]
    pub text_mentions: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            text_mentions: true,
        }
    }
}

fn default_top_edges() -> usize {
    20
}

fn default_precision() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Pick the config file location.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(path) = std::env::var_os("PARLEY_CONFIG") {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}
