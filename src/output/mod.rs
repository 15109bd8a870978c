//! Output formatting for the update matrix
//!
//! This module provides:
//! - Matrix assembly with an optional group limit
//! - JSON output, the machine contract consumed by CI
//! - Text output for human-readable display
//! - Appending the matrix to a GitHub Actions output file

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::UpdateGroup;
use crate::error::IoError;
use crate::orchestrator::RunResult;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Key under which the matrix is written to the CI output file
pub const GITHUB_OUTPUT_KEY: &str = "matrix";

/// The build matrix: one entry per update group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixOutput {
    pub include: Vec<UpdateGroup>,
}

impl MatrixOutput {
    /// Keep the first `limit` groups (all when `None`, none when `Some(0)`)
    pub fn assemble(mut groups: Vec<UpdateGroup>, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            groups.truncate(limit);
        }
        Self { include: groups }
    }

    pub fn len(&self) -> usize {
        self.include.len()
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    /// Serialize as `{"include":[...]}`
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Append `matrix=<json>` to a GitHub Actions output file
pub fn write_github_output(path: &Path, json: &str) -> Result<(), IoError> {
    let to_io_error = |source| IoError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_io_error)?;
    writeln!(file, "{}={}", GITHUB_OUTPUT_KEY, json).map_err(to_io_error)
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `{"include": [...]}` on stdout
    #[default]
    Json,
    /// Human-readable summary
    Text,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Detailed output with additional information
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// Indent JSON output
    pub pretty: bool,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            pretty: false,
            color: true,
        }
    }
}

impl OutputConfig {
    pub fn new(format: OutputFormat, verbosity: Verbosity, pretty: bool) -> Self {
        Self {
            format,
            verbosity,
            pretty,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the run result
    fn format(&self, result: &RunResult, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Json => Box::new(JsonFormatter::new(config.pretty)),
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
    }
}
