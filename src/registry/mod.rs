//! Registry lookups for latest published versions
//!
//! This module provides:
//! - The `RegistryLookup` capability the update grouper queries
//! - HTTP client shared foundation with retry logic
//! - npm registry HTTP adapter
//! - `npm view` command adapter
//! - Repository descriptor normalization and browsable URL extraction

mod client;
mod npm;
mod npm_cli;

pub use client::HttpClient;
pub use npm::{NpmRegistryLookup, DEFAULT_REGISTRY_URL};
pub use npm_cli::NpmCliLookup;

use crate::error::RegistryError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Latest-version metadata for a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Latest published version
    pub version: String,
    /// Source repository descriptor, if published
    pub repository: Option<Repository>,
}

impl PackageMetadata {
    pub fn new(version: impl Into<String>, repository: Option<Repository>) -> Self {
        Self {
            version: version.into(),
            repository,
        }
    }

    /// Browsable repository URL, see [`git_url`]
    pub fn repository_url(&self) -> Option<String> {
        self.repository.as_ref().and_then(git_url)
    }
}

/// Normalized `{type, url}` repository descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub kind: String,
    pub url: String,
}

impl Repository {
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
        }
    }

    pub fn git(url: impl Into<String>) -> Self {
        Self::new("git", url)
    }

    /// Normalize a raw `repository` value from registry metadata.
    ///
    /// Accepts the object form (`{"type": "git", "url": "..."}`, type defaults
    /// to git) and the string shorthands (`github:user/repo`, `user/repo`, a URL).
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value::<RepositoryField>(value.clone()).ok()? {
            RepositoryField::Detailed { kind, url } => {
                Some(Self::new(kind.unwrap_or_else(|| "git".to_string()), url))
            }
            RepositoryField::Shorthand(s) => Self::from_shorthand(&s),
        }
    }

    fn from_shorthand(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let hosts = [
            ("github:", "https://github.com/"),
            ("gitlab:", "https://gitlab.com/"),
            ("bitbucket:", "https://bitbucket.org/"),
        ];
        for (prefix, base) in hosts {
            if let Some(path) = s.strip_prefix(prefix) {
                return Some(Self::git(format!("{}{}", base, path)));
            }
        }

        // Bare `user/repo` means GitHub
        if !s.contains(':') && s.matches('/').count() == 1 {
            return Some(Self::git(format!("https://github.com/{}", s)));
        }

        Some(Self::git(s))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        url: String,
    },
    Shorthand(String),
}

/// Browsable URL of a git repository.
///
/// Strips an optional `git+` prefix and an optional `.git` suffix; any
/// repository type other than `git` yields no URL.
pub fn git_url(repository: &Repository) -> Option<String> {
    if repository.kind != "git" {
        return None;
    }

    let url = repository.url.trim();
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Which registry backend to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKind {
    /// npm registry HTTP API
    #[default]
    Registry,
    /// `npm view` command
    NpmCli,
}

/// Capability for looking up the latest version of a package
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Backend name used in logs and errors
    fn registry_name(&self) -> &'static str;

    /// Latest version and repository of `package`; `Ok(None)` when the
    /// registry knows the package but reports no version
    async fn latest(&self, package: &str) -> Result<Option<PackageMetadata>, RegistryError>;
}

/// Create the lookup backend for `kind`
pub fn create_lookup(
    kind: LookupKind,
    registry_url: &str,
) -> Result<Box<dyn RegistryLookup>, RegistryError> {
    match kind {
        LookupKind::Registry => {
            let client = HttpClient::new()?;
            Ok(Box::new(NpmRegistryLookup::with_base_url(
                client,
                registry_url,
            )))
        }
        LookupKind::NpmCli => Ok(Box::new(NpmCliLookup::new())),
    }
}
