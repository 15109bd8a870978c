//! Update decision types: resolved packages, skip reasons and update groups

use super::version::{BareVersion, SemverLabel};
use serde::Serialize;
use std::fmt;

/// Reason why a declared dependency produced no update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// URL, git, path or tag declaration with no registry version
    NotUpgradeable,
    /// Registry lookup failed
    LookupFailed(String),
    /// Registry returned no latest version
    NoLatestVersion,
    /// Registry's latest version could not be parsed
    InvalidLatestVersion(String),
    /// Declared version is already at (or ahead of) latest
    AlreadyLatest,
    /// `@types/*` package with no matching unscoped package to ride along with
    OrphanTypes,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotUpgradeable => write!(f, "not a registry version"),
            SkipReason::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
            SkipReason::NoLatestVersion => write!(f, "no latest version"),
            SkipReason::InvalidLatestVersion(v) => write!(f, "invalid latest version '{}'", v),
            SkipReason::AlreadyLatest => write!(f, "already at latest"),
            SkipReason::OrphanTypes => write!(f, "types package without its runtime package"),
        }
    }
}

/// A dependency that will not appear in the matrix, with the reason why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDependency {
    pub name: String,
    pub declared: String,
    pub reason: SkipReason,
}

impl SkippedDependency {
    pub fn new(name: impl Into<String>, declared: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            declared: declared.into(),
            reason,
        }
    }
}

/// A dependency confirmed to need an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    pub name: String,
    pub current_version: BareVersion,
    pub latest_version: BareVersion,
    /// Browsable source repository URL
    pub repository_url: Option<String>,
}

impl ResolvedPackage {
    pub fn new(
        name: impl Into<String>,
        current_version: BareVersion,
        latest_version: BareVersion,
        repository_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version,
            latest_version,
            repository_url,
        }
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} → {}",
            self.name, self.current_version, self.latest_version
        )
    }
}

/// A batch of packages upgraded together by one automated action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroup {
    pub packages: Vec<ResolvedPackage>,
    /// Publishing scope without the leading `@`; `None` for unscoped groups
    pub scope: Option<String>,
    pub group_current_version: BareVersion,
    pub group_latest_version: BareVersion,
    pub semver_label: SemverLabel,
    pub display_name: String,
    /// Short hash of the member names, safe for branch names
    pub identifier: String,
    /// Human-readable name/version slug
    pub slug: String,
    /// Markdown bullet list describing each bump
    pub changelog_body: String,
}

impl UpdateGroup {
    /// Names of the member packages in group order
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}

impl fmt::Display for UpdateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} → {} ({})",
            self.display_name,
            self.group_current_version,
            self.group_latest_version,
            self.semver_label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strip_range;

    fn resolved(name: &str, current: &str, latest: &str) -> ResolvedPackage {
        ResolvedPackage::new(
            name,
            strip_range(current).unwrap(),
            strip_range(latest).unwrap(),
            None,
        )
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NotUpgradeable.to_string(), "not a registry version");
        assert_eq!(
            SkipReason::LookupFailed("timeout".to_string()).to_string(),
            "lookup failed: timeout"
        );
        assert_eq!(SkipReason::AlreadyLatest.to_string(), "already at latest");
        assert_eq!(
            SkipReason::InvalidLatestVersion("next".to_string()).to_string(),
            "invalid latest version 'next'"
        );
    }

    #[test]
    fn test_resolved_package_display() {
        let pkg = resolved("lodash", "^4.17.0", "4.17.21");
        assert_eq!(pkg.to_string(), "lodash: 4.17.0 → 4.17.21");
    }

    #[test]
    fn test_resolved_package_serializes_camel_case() {
        let mut pkg = resolved("left-pad", "1.2.0", "1.3.0");
        pkg.repository_url = Some("https://github.com/x/left-pad".to_string());
        let json = serde_json::to_value(&pkg).unwrap();
        assert_eq!(json["name"], "left-pad");
        assert_eq!(json["currentVersion"], "1.2.0");
        assert_eq!(json["latestVersion"], "1.3.0");
        assert_eq!(json["repositoryUrl"], "https://github.com/x/left-pad");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_update_group_serialization() {
        let group = UpdateGroup {
            packages: vec![resolved("@foo/a", "1.0.0", "1.1.0")],
            scope: None,
            group_current_version: strip_range("1.0.0").unwrap(),
            group_latest_version: strip_range("1.1.0").unwrap(),
            semver_label: SemverLabel::Minor,
            display_name: "@foo/a".to_string(),
            identifier: "abc".to_string(),
            slug: "foo_a-1_1_0".to_string(),
            changelog_body: "- Bumps @foo/a from 1.0.0 to 1.1.0\n".to_string(),
        };

        let json = serde_json::to_value(&group).unwrap();
        assert!(json["scope"].is_null());
        assert_eq!(json["groupCurrentVersion"], "1.0.0");
        assert_eq!(json["groupLatestVersion"], "1.1.0");
        assert_eq!(json["semverLabel"], "minor");
        assert_eq!(json["displayName"], "@foo/a");
        assert_eq!(json["packages"][0]["name"], "@foo/a");
        assert!(json["packages"][0]["repositoryUrl"].is_null());
        assert!(json["packages"][0].get("url").is_none());
        assert_eq!(group.to_string(), "@foo/a 1.0.0 → 1.1.0 (minor)");
    }
}
