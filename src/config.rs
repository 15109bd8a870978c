//! Run settings
//!
//! Settings come from, highest precedence first: command-line flags, the
//! environment (handled by clap), a `depmatrix.toml` file, and built-in
//! defaults.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::output::{OutputConfig, Verbosity};
use crate::registry::{LookupKind, DEFAULT_REGISTRY_URL};
use crate::update::DEFAULT_CONCURRENCY;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file looked up in the workspace root
pub const CONFIG_FILENAME: &str = "depmatrix.toml";

/// Contents of `depmatrix.toml`; every key is optional
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub directories: Vec<String>,

    #[serde(default)]
    pub exclude_packages: Vec<String>,

    pub limit: Option<usize>,

    pub lookup: Option<LookupKind>,

    pub registry: Option<String>,

    pub concurrency: Option<usize>,
}

impl FileConfig {
    /// Parse TOML content; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Load the explicit config file, or `<root>/depmatrix.toml` when it exists
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = root.join(CONFIG_FILENAME);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub directories: Vec<String>,
    pub exclude_packages: Vec<String>,
    pub limit: Option<usize>,
    pub lookup: LookupKind,
    pub registry: String,
    pub concurrency: usize,
    pub github_output: Option<PathBuf>,
    pub output: OutputConfig,
}

impl Settings {
    /// Resolve settings from CLI args and the discovered config file
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::discover(args.config.as_deref(), &args.path)?;
        Self::from_parts(args, file)
    }

    /// Merge CLI args over a loaded config file
    pub fn from_parts(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let directories = prefer_cli(split_list(&args.directories), file.directories);
        let exclude_packages = prefer_cli(split_list(&args.exclude_packages), file.exclude_packages);

        let limit = args.limit.as_deref().and_then(parse_limit).or(file.limit);

        let concurrency = args
            .concurrency
            .or(file.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: concurrency.to_string(),
            });
        }

        let registry = args
            .registry
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or(file.registry)
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        let verbosity = Verbosity::from_flags(args.verbose, args.quiet);

        Ok(Self {
            root: args.path.clone(),
            directories,
            exclude_packages,
            limit,
            lookup: args.lookup.or(file.lookup).unwrap_or_default(),
            registry,
            concurrency,
            github_output: args.github_output.clone().filter(|p| !p.as_os_str().is_empty()),
            output: OutputConfig::new(args.format, verbosity, args.pretty),
        })
    }
}

fn prefer_cli(cli: Vec<String>, file: Vec<String>) -> Vec<String> {
    if cli.is_empty() {
        split_list(&file)
    } else {
        cli
    }
}

/// Split values on commas and newlines, trimming and dropping empty entries
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split([',', '\n']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a group limit; blank or non-numeric input means no limit.
///
/// `0` is a valid limit and yields an empty matrix.
pub fn parse_limit(value: &str) -> Option<usize> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    match value.parse::<usize>() {
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!(limit = value, "limit is not a non-negative integer, including all groups");
            None
        }
    }
}
