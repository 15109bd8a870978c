//! Bare versions extracted from npm range expressions
//!
//! Handles declarations like:
//! - Exact: `1.2.3`
//! - Caret / tilde: `^1.2.3`, `~1.2.3`
//! - Comparison: `>=1.2.3`, `>=1.0.0 <2.0.0` (first bound wins)
//! - Partial: `1.x`, `2` (missing components count as `0`)
//!
//! URLs, protocol references (`git+https:`, `github:`, `file:`,
//! `workspace:`, `npm:` aliases), local paths and dist-tags yield no version.
//!
//! Comparison only looks at the numeric major/minor/patch triple. Pre-release
//! and build suffixes are carried in the raw text but never compared, so
//! `1.0.0-beta.1` and `1.0.0` are considered the same version.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static VERSION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[0-9A-Za-z.+\-]*").unwrap());

/// A version with its range operator removed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BareVersion {
    raw: String,
    major: u64,
    minor: u64,
    patch: u64,
}

impl BareVersion {
    /// Parse a bare version token such as `1.2.3` or `4.0.0-rc.1`
    fn from_token(token: &str) -> Option<Self> {
        let numeric_end = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(token.len());
        let mut parts = token[..numeric_end].split('.');

        let mut component = || -> Option<u64> {
            match parts.next() {
                Some("") | None => Some(0),
                Some(digits) => digits.parse().ok(),
            }
        };

        Some(Self {
            major: component()?,
            minor: component()?,
            patch: component()?,
            raw: token.to_string(),
        })
    }

    /// The bare version text, suffix included
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric (major, minor, patch) triple
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Numeric comparison of the triples, ignoring suffixes
    pub fn compare(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Display for BareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for BareVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Extract the bare version from a range expression.
///
/// Returns `None` when the expression does not reference a registry version
/// at all; such dependencies cannot be upgraded and are skipped.
pub fn strip_range(expr: &str) -> Option<BareVersion> {
    let expr = expr.trim();

    // Protocols, URLs and local paths. Plain semver ranges never contain these.
    if expr.contains(':') || expr.contains('/') || expr.contains('\\') || expr.starts_with('.') {
        return None;
    }

    let token = VERSION_TOKEN_RE.find(expr)?;
    BareVersion::from_token(token.as_str())
}

/// True when `a` is semantically at least `b`
pub fn is_at_least(a: &BareVersion, b: &BareVersion) -> bool {
    a.compare(b) != Ordering::Less
}

/// The lower of two versions; `a` wins ties
pub fn lower<'a>(a: &'a BareVersion, b: &'a BareVersion) -> &'a BareVersion {
    if is_at_least(b, a) {
        a
    } else {
        b
    }
}

/// Classification of an update's magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemverLabel {
    Major,
    Minor,
    Patch,
    /// Numeric triples are equal ("none"); serialized as `null`
    Unchanged,
}

impl SemverLabel {
    /// Label text, `None` for unchanged versions
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            SemverLabel::Major => Some("major"),
            SemverLabel::Minor => Some("minor"),
            SemverLabel::Patch => Some("patch"),
            SemverLabel::Unchanged => None,
        }
    }
}

impl fmt::Display for SemverLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("none"))
    }
}

impl Serialize for SemverLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(label) => serializer.serialize_str(label),
            None => serializer.serialize_none(),
        }
    }
}

/// Classify the change from `current` to `latest`
pub fn diff_kind(current: &BareVersion, latest: &BareVersion) -> SemverLabel {
    if current.triple() == latest.triple() {
        SemverLabel::Unchanged
    } else if current.major != latest.major {
        SemverLabel::Major
    } else if current.minor != latest.minor {
        SemverLabel::Minor
    } else {
        SemverLabel::Patch
    }
}
