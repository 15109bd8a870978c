//! package.json parser
//!
//! Handles:
//! - dependencies
//! - devDependencies
//!
//! Both sections are folded into one map with the "lowest version wins" rule.

use crate::domain::DependencyMap;
use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::path::Path;

/// Manifest file name looked up in every visited directory
pub const MANIFEST_FILENAME: &str = "package.json";

/// Sections read from the manifest, in merge order
const DEPENDENCY_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// Parser for package.json files
pub struct PackageJsonParser;

impl PackageJsonParser {
    /// Parse the declared dependencies of a manifest.
    ///
    /// `path` is only used for error context.
    pub fn parse(&self, content: &str, path: &Path) -> Result<DependencyMap, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(path, e.to_string()))?;

        let mut dependencies = DependencyMap::new();

        for section in DEPENDENCY_SECTIONS {
            if let Some(deps) = json.get(section).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, &mut dependencies);
            }
        }

        Ok(dependencies)
    }
}

fn parse_dependency_object(deps: &Map<String, Value>, output: &mut DependencyMap) {
    for (name, range) in deps {
        if let Some(range) = range.as_str() {
            output.insert(name.clone(), range);
        }
    }
}
