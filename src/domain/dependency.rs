//! Declared dependencies and the merged, insertion-ordered dependency map

use super::version::{lower, strip_range};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A dependency as declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredDependency {
    /// Package name
    pub name: String,
    /// Range expression, URL or path as written in the manifest
    pub range: String,
}

impl DeclaredDependency {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
        }
    }
}

impl fmt::Display for DeclaredDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.range)
    }
}

/// Name → range mapping with unique names, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMap {
    entries: Vec<DeclaredDependency>,
    index: HashMap<String, usize>,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].range.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclaredDependency> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.name.as_str())
    }

    /// Add a declaration, reconciling with an existing one for the same name
    pub fn insert(&mut self, name: impl Into<String>, range: impl Into<String>) {
        let name = name.into();
        let range = range.into();

        match self.index.get(&name) {
            Some(&i) => {
                if let Some(winner) = reconcile(&self.entries[i].range, &range) {
                    self.entries[i].range = winner;
                }
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(DeclaredDependency::new(name, range));
            }
        }
    }

    /// Merge `other` into `self`, keeping the lower declaration per name
    pub fn merge(&mut self, other: &DependencyMap) {
        for dep in other.iter() {
            self.insert(dep.name.clone(), dep.range.clone());
        }
    }

    /// Merged copy of `self` and `other`
    pub fn merged(mut self, other: &DependencyMap) -> Self {
        self.merge(other);
        self
    }

    /// Keep only the entries the predicate accepts, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&DeclaredDependency) -> bool) {
        self.entries.retain(|d| keep(d));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
    }
}

impl<N: Into<String>, R: Into<String>> FromIterator<(N, R)> for DependencyMap {
    fn from_iter<T: IntoIterator<Item = (N, R)>>(iter: T) -> Self {
        let mut map = DependencyMap::new();
        for (name, range) in iter {
            map.insert(name, range);
        }
        map
    }
}

impl<'a> IntoIterator for &'a DependencyMap {
    type Item = &'a DeclaredDependency;
    type IntoIter = std::slice::Iter<'a, DeclaredDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Pick the declaration to keep when `existing` and `incoming` collide.
///
/// Returns `Some(incoming)` only when it should replace `existing`.
fn reconcile(existing: &str, incoming: &str) -> Option<String> {
    match (strip_range(existing), strip_range(incoming)) {
        (Some(a), Some(b)) if lower(&a, &b) != &a => Some(incoming.to_string()),
        (None, Some(_)) => Some(incoming.to_string()),
        _ => None,
    }
}
