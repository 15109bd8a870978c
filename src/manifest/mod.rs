//! Manifest discovery and parsing
//!
//! This module provides:
//! - The filesystem capability the collector reads through
//! - package.json dependency parsing
//! - The recursive workspace walk (root, `packages/*`, extra directories)

mod collector;
mod package_json;

pub use collector::{collect, DependencyCollector, MAX_WALK_DEPTH, PACKAGES_DIR};
pub use package_json::{PackageJsonParser, MANIFEST_FILENAME};

use crate::error::ManifestError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read-only view of a project tree
pub trait ManifestSource {
    /// Contents of the manifest in `dir`, `None` when there is none
    fn read_manifest(&self, dir: &Path) -> Result<Option<String>, ManifestError>;

    /// Whether `path` is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate child directories of `dir`, sorted by name
    fn child_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>, ManifestError>;

    /// Identity of a directory for cycle detection
    fn canonical(&self, dir: &Path) -> PathBuf {
        dir.to_path_buf()
    }
}

/// Manifest source backed by the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsManifestSource;

impl ManifestSource for FsManifestSource {
    fn read_manifest(&self, dir: &Path) -> Result<Option<String>, ManifestError> {
        let path = dir.join(MANIFEST_FILENAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ManifestError::read_error(path, e)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn child_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
        let entries = std::fs::read_dir(dir).map_err(|source| ManifestError::ListError {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        Ok(dirs)
    }

    fn canonical(&self, dir: &Path) -> PathBuf {
        dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
    }
}
