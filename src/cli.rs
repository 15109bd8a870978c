//! CLI argument parsing module for depmatrix
//!
//! Every option that CI sets through the environment (`INPUT_*` for action
//! inputs, `GITHUB_OUTPUT`, `NPM_CONFIG_REGISTRY`) is also accepted as a flag;
//! the flag wins when both are present.

use crate::output::OutputFormat;
use crate::registry::LookupKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Build an update matrix from the outdated npm dependencies of a workspace
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "depmatrix",
    version,
    about = "Group outdated npm dependencies into an update build matrix"
)]
pub struct CliArgs {
    /// Workspace root (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Scanning
    /// Extra directories to scan, relative to the root (comma or newline separated, repeatable)
    #[arg(long, env = "INPUT_DIRECTORIES", action = ArgAction::Append)]
    pub directories: Vec<String>,

    /// Packages to leave out, `*` matches anything (comma or newline separated, repeatable)
    #[arg(long, env = "INPUT_EXCLUDE-PACKAGES", action = ArgAction::Append)]
    pub exclude_packages: Vec<String>,

    /// Emit at most this many groups (empty means no limit)
    #[arg(long, env = "INPUT_LIMIT")]
    pub limit: Option<String>,

    // Registry
    /// How to look up latest versions
    #[arg(long, value_enum)]
    pub lookup: Option<LookupKind>,

    /// npm registry base URL
    #[arg(long, env = "NPM_CONFIG_REGISTRY")]
    pub registry: Option<String>,

    /// Maximum number of registry lookups in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Config file (default: depmatrix.toml in the workspace root, if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    // Output
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Also append `matrix=<json>` to this file
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,

    /// Enable verbose output (debug logs, skipped dependencies)
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - errors only, no progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
