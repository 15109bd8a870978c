//! Exclusion filter for dependency names
//!
//! Patterns are globs where `*` matches any run of characters; every other
//! character is literal and the pattern must match the whole name.

use crate::domain::DependencyMap;
use crate::error::ConfigError;
use regex::Regex;

/// Compiled set of exclude patterns
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<(String, Regex)>,
}

impl ExcludeFilter {
    /// Create an empty filter that excludes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile glob patterns into a filter
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref();
                glob_to_regex(pattern).map(|re| (pattern.to_string(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The patterns as given
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(p, _)| p.as_str())
    }

    /// Check if a package name matches any pattern
    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(name))
    }

    /// Remove every excluded name from `dependencies`, returning how many went
    pub fn apply(&self, dependencies: &mut DependencyMap) -> usize {
        if self.is_empty() {
            return 0;
        }
        let before = dependencies.len();
        dependencies.retain(|dep| !self.is_excluded(&dep.name));
        before - dependencies.len()
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, ConfigError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{}$", body)).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> ExcludeFilter {
        ExcludeFilter::from_patterns(patterns).unwrap()
    }

    #[test]
    fn test_empty_filter_excludes_nothing() {
        let filter = ExcludeFilter::new();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("react"));
    }

    #[test]
    fn test_exact_pattern() {
        let filter = filter(&["react"]);
        assert!(filter.is_excluded("react"));
        assert!(!filter.is_excluded("react-dom"));
        assert!(!filter.is_excluded("preact"));
    }

    #[test]
    fn test_scope_wildcard() {
        let filter = filter(&["@foo/*"]);
        assert!(filter.is_excluded("@foo/a"));
        assert!(filter.is_excluded("@foo/b-c"));
        assert!(!filter.is_excluded("@foobar/a"));
        assert!(!filter.is_excluded("foo"));
    }

    #[test]
    fn test_wildcard_positions() {
        let filter = filter(&["eslint-*", "*-loader", "*babel*"]);
        assert!(filter.is_excluded("eslint-plugin-react"));
        assert!(filter.is_excluded("css-loader"));
        assert!(filter.is_excluded("@babel/core"));
        assert!(!filter.is_excluded("eslint"));
        assert!(!filter.is_excluded("loader"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let filter = filter(&["lodash.get", "a+b"]);
        assert!(filter.is_excluded("lodash.get"));
        assert!(!filter.is_excluded("lodashXget"));
        assert!(filter.is_excluded("a+b"));
        assert!(!filter.is_excluded("aab"));
    }

    #[test]
    fn test_apply_is_set_subtraction() {
        let mut deps: DependencyMap = [
            ("@foo/a", "^1.0.0"),
            ("react", "^18.0.0"),
            ("@foo/b", "~1.0.2"),
            ("lodash", "^4.17.0"),
        ]
        .into_iter()
        .collect();

        let removed = filter(&["@foo/*"]).apply(&mut deps);
        assert_eq!(removed, 2);
        assert_eq!(deps.names().collect::<Vec<_>>(), vec!["react", "lodash"]);
        assert_eq!(deps.get("lodash"), Some("^4.17.0"));
    }

    #[test]
    fn test_patterns_round_trip() {
        let filter = filter(&["@types/*", "typescript"]);
        assert_eq!(
            filter.patterns().collect::<Vec<_>>(),
            vec!["@types/*", "typescript"]
        );
    }
}
