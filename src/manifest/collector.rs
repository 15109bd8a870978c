//! Workspace dependency collection
//!
//! Walks the workspace root, every `packages/*` child (recursively), and
//! each configured extra directory, folding their manifests into a single
//! dependency map where the lowest declared version of a name wins.

use super::{ManifestSource, PackageJsonParser, MANIFEST_FILENAME};
use crate::domain::DependencyMap;
use crate::error::IoError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Conventional sub-package directory
pub const PACKAGES_DIR: &str = "packages";

/// Nesting limit for `packages/*/packages/*...` chains
pub const MAX_WALK_DEPTH: usize = 16;

/// Recursive manifest walker over a [`ManifestSource`]
pub struct DependencyCollector<'a> {
    source: &'a dyn ManifestSource,
    parser: PackageJsonParser,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(source: &'a dyn ManifestSource) -> Self {
        Self {
            source,
            parser: PackageJsonParser,
        }
    }

    /// Collect dependencies from `root` and each of `extra_paths` (relative to `root`).
    ///
    /// Fails only when `root` itself is not a directory.
    pub fn collect(&self, root: &Path, extra_paths: &[String]) -> Result<DependencyMap, IoError> {
        if !self.source.is_dir(root) {
            return Err(IoError::directory_not_found(root));
        }

        let mut all = self.walk_tree(root);

        for extra in extra_paths {
            let dir = root.join(extra);
            if !self.source.is_dir(&dir) {
                warn!(path = %dir.display(), "extra directory does not exist, skipping");
                continue;
            }
            all.merge(&self.walk_tree(&dir));
        }

        info!(count = all.len(), "collected declared dependencies");
        Ok(all)
    }

    /// Walk one tree with its own cycle guard
    pub fn walk_tree(&self, dir: &Path) -> DependencyMap {
        let mut visited = HashSet::new();
        self.walk(dir, 0, &mut visited)
    }

    fn walk(&self, dir: &Path, depth: usize, visited: &mut HashSet<PathBuf>) -> DependencyMap {
        if depth > MAX_WALK_DEPTH {
            warn!(path = %dir.display(), "maximum nesting depth reached, skipping");
            return DependencyMap::new();
        }
        if !visited.insert(self.source.canonical(dir)) {
            debug!(path = %dir.display(), "directory already visited, skipping");
            return DependencyMap::new();
        }

        let mut dependencies = self.read_dependencies(dir);

        let packages = dir.join(PACKAGES_DIR);
        if self.source.is_dir(&packages) {
            match self.source.child_dirs(&packages) {
                Ok(children) => {
                    for child in children {
                        let nested = self.walk(&child, depth + 1, visited);
                        dependencies.merge(&nested);
                    }
                }
                Err(e) => warn!(error = %e, "could not list sub-packages"),
            }
        }

        dependencies
    }

    fn read_dependencies(&self, dir: &Path) -> DependencyMap {
        let manifest_path = dir.join(MANIFEST_FILENAME);

        match self.source.read_manifest(dir) {
            Ok(Some(content)) => match self.parser.parse(&content, &manifest_path) {
                Ok(deps) => {
                    debug!(path = %manifest_path.display(), count = deps.len(), "read manifest");
                    deps
                }
                Err(e) => {
                    warn!(error = %e, "skipping unparseable manifest");
                    DependencyMap::new()
                }
            },
            Ok(None) => {
                debug!(path = %dir.display(), "no manifest, skipping");
                DependencyMap::new()
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable manifest");
                DependencyMap::new()
            }
        }
    }
}

/// Collect dependencies through `source`; see [`DependencyCollector::collect`]
pub fn collect(
    source: &dyn ManifestSource,
    root: &Path,
    extra_paths: &[String],
) -> Result<DependencyMap, IoError> {
    DependencyCollector::new(source).collect(root, extra_paths)
}
