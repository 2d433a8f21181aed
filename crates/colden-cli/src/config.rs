//! CLI configuration.

use serde::Deserialize;
use std::path::Path;

use colden_core::{Error, Result};
use colden_huffman::pipeline::{
    PipelineOptions, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE,
};
use tracing::Level;

/// Settings read from a JSON file and overridden by command-line flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replace existing output files
    #[serde(default)]
    pub overwrite: bool,

    /// File I/O buffer size (bytes)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            overwrite: false,
            buffer_size: default_buffer_size(),
        }
    }
}

impl CliConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Tracing level for `log_level`, if it names one.
    pub fn level(&self) -> Option<Level> {
        parse_level(&self.log_level)
    }

    /// Pipeline options with the buffer size clamped to its accepted range.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::default()
            .with_buffer_size(self.buffer_size)
            .with_overwrite(self.overwrite)
    }
}

/// Parse a level name (trace, debug, info, warn, error), ignoring case.
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
