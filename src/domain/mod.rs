//! Core domain models for depmatrix
//!
//! This module contains the fundamental types used throughout the application:
//! - Bare versions and the "lowest version wins" comparison rules
//! - Declared dependencies and the merged dependency map
//! - Resolved packages, skip reasons and update groups

mod dependency;
mod update_group;
mod version;

pub use dependency::{DeclaredDependency, DependencyMap};
pub use update_group::{ResolvedPackage, SkipReason, SkippedDependency, UpdateGroup};
pub use version::{diff_kind, is_at_least, lower, strip_range, BareVersion, SemverLabel};
