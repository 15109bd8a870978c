//! Update grouping for outdated dependencies
//!
//! This module provides:
//! - Exclusion filtering of dependency names
//! - Registry lookups with bounded parallelism
//! - Partitioning of outdated packages into scoped, unscoped and `@types` groups
//! - Group identifiers, slugs and changelog text

mod filter;
mod identifier;

pub use filter::ExcludeFilter;
pub use identifier::{changelog_body, identifier, slug};

use crate::domain::{
    diff_kind, is_at_least, lower, strip_range, BareVersion, DependencyMap, ResolvedPackage,
    SkipReason, SkippedDependency, UpdateGroup,
};
use crate::error::RegistryError;
use crate::progress::Progress;
use crate::registry::{PackageMetadata, RegistryLookup};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Default number of registry lookups in flight
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Scope of `@types/*` companion packages
const TYPES_SCOPE: &str = "@types";

/// Outcome of evaluating every declared dependency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Update groups in emission order
    pub groups: Vec<UpdateGroup>,
    /// Dependencies that produced no update, in mapping order
    pub skipped: Vec<SkippedDependency>,
}

struct Candidate<'a> {
    name: &'a str,
    declared: &'a str,
    current: BareVersion,
}

/// Look up, filter and group `dependencies` into update groups.
///
/// Lookups run `concurrency` at a time; results are consumed in mapping order,
/// so the plan does not depend on which lookup finishes first.
pub async fn plan_updates(
    dependencies: &DependencyMap,
    lookup: &dyn RegistryLookup,
    concurrency: usize,
    progress: &Progress,
) -> UpdatePlan {
    let mut skipped = Vec::new();
    let mut candidates = Vec::new();

    for dep in dependencies {
        match strip_range(&dep.range) {
            Some(current) => candidates.push(Candidate {
                name: &dep.name,
                declared: &dep.range,
                current,
            }),
            None => {
                debug!(package = %dep.name, range = %dep.range, "not a registry version, skipping");
                skipped.push(SkippedDependency::new(
                    &dep.name,
                    &dep.range,
                    SkipReason::NotUpgradeable,
                ));
            }
        }
    }

    // Only parseable declarations reach the registry
    progress.set_total(candidates.len() as u64);

    let looked_up: Vec<_> = stream::iter(candidates)
        .map(|candidate| async move {
            let result = lookup.latest(candidate.name).await;
            progress.inc();
            (candidate, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut resolved = Vec::new();
    for (candidate, result) in looked_up {
        match resolve(&candidate, result) {
            Ok(package) => resolved.push(package),
            Err(reason) => skipped.push(SkippedDependency::new(
                candidate.name,
                candidate.declared,
                reason,
            )),
        }
    }

    let (groups, orphans) = group_resolved(resolved);
    skipped.extend(orphans);

    info!(
        groups = groups.len(),
        skipped = skipped.len(),
        "grouped outdated dependencies"
    );
    UpdatePlan { groups, skipped }
}

/// Update groups for `dependencies`, without skip details or progress
pub async fn group_updates(
    dependencies: &DependencyMap,
    lookup: &dyn RegistryLookup,
    concurrency: usize,
) -> Vec<UpdateGroup> {
    plan_updates(dependencies, lookup, concurrency, &Progress::disabled())
        .await
        .groups
}

fn resolve(
    candidate: &Candidate<'_>,
    result: Result<Option<PackageMetadata>, RegistryError>,
) -> Result<ResolvedPackage, SkipReason> {
    let metadata = match result {
        Ok(Some(metadata)) => metadata,
        Ok(None) => {
            debug!(package = candidate.name, "registry reported no version");
            return Err(SkipReason::NoLatestVersion);
        }
        Err(e) => {
            warn!(package = candidate.name, error = %e, "lookup failed, skipping");
            return Err(SkipReason::LookupFailed(e.to_string()));
        }
    };

    let Some(latest) = strip_range(&metadata.version) else {
        debug!(package = candidate.name, version = %metadata.version, "unparseable latest version");
        return Err(SkipReason::InvalidLatestVersion(metadata.version));
    };

    if is_at_least(&candidate.current, &latest) {
        debug!(package = candidate.name, current = %candidate.current, latest = %latest, "up to date");
        return Err(SkipReason::AlreadyLatest);
    }

    Ok(ResolvedPackage::new(
        candidate.name,
        candidate.current.clone(),
        latest,
        metadata.repository_url(),
    ))
}

/// Scope buckets keyed by latest version, both in first-seen order
type ScopeBuckets = Vec<(String, Vec<(String, Vec<ResolvedPackage>)>)>;

/// Partition resolved packages into groups; returns orphaned `@types` packages as skipped
fn group_resolved(resolved: Vec<ResolvedPackage>) -> (Vec<UpdateGroup>, Vec<SkippedDependency>) {
    let mut scoped: ScopeBuckets = Vec::new();
    let mut types: HashMap<String, ResolvedPackage> = HashMap::new();
    let mut types_order: Vec<String> = Vec::new();
    let mut unscoped: Vec<ResolvedPackage> = Vec::new();

    for package in resolved {
        let Some((scope, rest)) = package.name.split_once('/') else {
            unscoped.push(package);
            continue;
        };

        if scope == TYPES_SCOPE {
            let rest = rest.to_string();
            types_order.push(rest.clone());
            types.insert(rest, package);
            continue;
        }

        let scope = scope.strip_prefix('@').unwrap_or(scope).to_string();
        let latest = package.latest_version.as_str().to_string();

        let index = match scoped.iter().position(|(s, _)| *s == scope) {
            Some(index) => index,
            None => {
                scoped.push((scope, Vec::new()));
                scoped.len() - 1
            }
        };
        let versions = &mut scoped[index].1;
        match versions.iter().position(|(v, _)| *v == latest) {
            Some(i) => versions[i].1.push(package),
            None => versions.push((latest, vec![package])),
        }
    }

    let mut groups = Vec::new();

    for (scope, versions) in scoped {
        for (_, members) in versions {
            groups.push(scoped_group(&scope, members));
        }
    }

    for package in unscoped {
        let companion = types.remove(&package.name);
        groups.push(unscoped_group(package, companion));
    }

    let orphans = types_order
        .into_iter()
        .filter_map(|rest| types.remove(&rest))
        .map(|package| {
            debug!(package = %package.name, "types package without a runtime package, dropping");
            let declared = package.current_version.to_string();
            SkippedDependency::new(package.name, declared, SkipReason::OrphanTypes)
        })
        .collect();

    (groups, orphans)
}

fn scoped_group(scope: &str, members: Vec<ResolvedPackage>) -> UpdateGroup {
    let first = &members[0];
    let current = members
        .iter()
        .fold(&first.current_version, |acc, m| lower(acc, &m.current_version))
        .clone();
    let latest = first.latest_version.clone();

    let (display_name, slug_name) = if members.len() > 1 {
        (format!("{} packages", scope), scope.to_string())
    } else {
        (first.name.clone(), first.name.clone())
    };

    build_group(members, Some(scope.to_string()), current, latest, display_name, &slug_name)
}

fn unscoped_group(primary: ResolvedPackage, companion: Option<ResolvedPackage>) -> UpdateGroup {
    let current = primary.current_version.clone();
    let latest = primary.latest_version.clone();
    let name = primary.name.clone();

    let mut members = vec![primary];
    members.extend(companion);

    build_group(members, None, current, latest, name.clone(), &name)
}

fn build_group(
    packages: Vec<ResolvedPackage>,
    scope: Option<String>,
    current: BareVersion,
    latest: BareVersion,
    display_name: String,
    slug_name: &str,
) -> UpdateGroup {
    UpdateGroup {
        identifier: identifier(packages.iter().map(|p| p.name.as_str())),
        slug: slug(slug_name, latest.as_str()),
        changelog_body: changelog_body(&packages),
        semver_label: diff_kind(&current, &latest),
        packages,
        scope,
        group_current_version: current,
        group_latest_version: latest,
        display_name,
    }
}
