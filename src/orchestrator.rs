//! Orchestrator for a complete matrix run
//!
//! This module provides:
//! - Workflow coordination: collect → exclude → look up → group → assemble
//! - Construction of the configured registry lookup
//! - Progress display around the slow phases

use crate::config::Settings;
use crate::domain::SkippedDependency;
use crate::error::AppError;
use crate::manifest::{collect, FsManifestSource, ManifestSource};
use crate::output::{MatrixOutput, Verbosity};
use crate::progress::Progress;
use crate::registry::{create_lookup, RegistryLookup};
use crate::update::{plan_updates, ExcludeFilter};
use tracing::info;

/// Result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// The matrix, already limited
    pub matrix: MatrixOutput,
    /// Dependencies that produced no update
    pub skipped: Vec<SkippedDependency>,
    /// Declared dependencies found in the workspace
    pub scanned: usize,
    /// Dependencies removed by exclude patterns
    pub excluded: usize,
    /// Groups dropped by the limit
    pub truncated: usize,
}

/// Orchestrator for coordinating a run
pub struct Orchestrator {
    settings: Settings,
    source: Box<dyn ManifestSource>,
    lookup: Box<dyn RegistryLookup>,
}

impl Orchestrator {
    /// Create an orchestrator reading the real filesystem and the configured registry
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let lookup = create_lookup(settings.lookup, &settings.registry)?;
        Ok(Self::with_parts(settings, Box::new(FsManifestSource), lookup))
    }

    /// Create an orchestrator with injected collaborators (for testing)
    pub fn with_parts(
        settings: Settings,
        source: Box<dyn ManifestSource>,
        lookup: Box<dyn RegistryLookup>,
    ) -> Self {
        Self {
            settings,
            source,
            lookup,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the workflow
    pub async fn run(&self) -> Result<RunResult, AppError> {
        let show_progress = self.settings.output.verbosity != Verbosity::Quiet
            && std::io::IsTerminal::is_terminal(&std::io::stderr());
        self.run_with_progress(show_progress).await
    }

    /// Run the workflow with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> Result<RunResult, AppError> {
        let settings = &self.settings;
        let mut progress = Progress::new(show_progress);

        // Exclude patterns are validated before any I/O
        let filter = ExcludeFilter::from_patterns(&settings.exclude_packages)?;

        progress.spinner("Scanning package manifests...");
        let mut dependencies = collect(
            self.source.as_ref(),
            &settings.root,
            &settings.directories,
        )?;
        let scanned = dependencies.len();

        let excluded = filter.apply(&mut dependencies);
        if excluded > 0 {
            info!(excluded, "applied exclude patterns");
        }

        // plan_updates shrinks the total to the declarations it looks up
        progress.start(dependencies.len() as u64, "Checking latest versions");
        let plan = plan_updates(
            &dependencies,
            self.lookup.as_ref(),
            settings.concurrency,
            &progress,
        )
        .await;
        progress.finish_and_clear();

        let total_groups = plan.groups.len();
        let matrix = MatrixOutput::assemble(plan.groups, settings.limit);
        let truncated = total_groups - matrix.len();
        if truncated > 0 {
            info!(kept = matrix.len(), truncated, "applied group limit");
        }

        Ok(RunResult {
            matrix,
            skipped: plan.skipped,
            scanned,
            excluded,
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use crate::config::FileConfig;
    use crate::error::{IoError, RegistryError};
    use crate::registry::PackageMetadata;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    struct StaticLookup(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl RegistryLookup for StaticLookup {
        fn registry_name(&self) -> &'static str {
            "static"
        }

        async fn latest(&self, package: &str) -> Result<Option<PackageMetadata>, RegistryError> {
            Ok(self
                .0
                .get(package)
                .map(|version| PackageMetadata::new(*version, None)))
        }
    }

    fn settings(root: &Path, configure: impl FnOnce(&mut CliArgs)) -> Settings {
        let mut args = CliArgs {
            path: root.to_path_buf(),
            ..CliArgs::default()
        };
        configure(&mut args);
        Settings::from_parts(&args, FileConfig::default()).unwrap()
    }

    fn orchestrator(settings: Settings, latest: &[(&'static str, &'static str)]) -> Orchestrator {
        let lookup = StaticLookup(latest.iter().copied().collect());
        Orchestrator::with_parts(settings, Box::new(FsManifestSource), Box::new(lookup))
    }

    fn workspace() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"dependencies": {"left-pad": "1.2.0", "@foo/a": "^1.0.0"}}"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("packages/b")).unwrap();
        fs::write(
            temp.path().join("packages/b/package.json"),
            r#"{"devDependencies": {"@foo/b": "~1.0.2", "webpack": "4.0.0"}}"#,
        )
        .unwrap();
        temp
    }

    const LATEST: &[(&str, &str)] = &[
        ("left-pad", "1.3.0"),
        ("@foo/a", "1.1.0"),
        ("@foo/b", "1.1.0"),
        ("webpack", "3.9.0"),
    ];

    #[tokio::test]
    async fn test_run_end_to_end() {
        let temp = workspace();
        let result = orchestrator(settings(temp.path(), |_| {}), LATEST)
            .run_with_progress(false)
            .await
            .unwrap();

        assert_eq!(result.scanned, 4);
        assert_eq!(result.excluded, 0);
        assert_eq!(result.truncated, 0);
        let names: Vec<_> = result
            .matrix
            .include
            .iter()
            .map(|g| g.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["foo packages", "left-pad"]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].name, "webpack");
    }

    #[tokio::test]
    async fn test_run_with_exclude_and_limit() {
        let temp = workspace();
        let settings = settings(temp.path(), |args| {
            args.exclude_packages = vec!["@foo/*".to_string()];
            args.limit = Some("1".to_string());
        });

        let result = orchestrator(settings, LATEST)
            .run_with_progress(false)
            .await
            .unwrap();

        assert_eq!(result.excluded, 2);
        assert_eq!(result.matrix.len(), 1);
        assert_eq!(result.matrix.include[0].display_name, "left-pad");
        assert!(result
            .matrix
            .include
            .iter()
            .all(|g| g.package_names().all(|n| !n.starts_with("@foo/"))));
    }

    #[tokio::test]
    async fn test_run_limit_truncates() {
        let temp = workspace();
        let settings = settings(temp.path(), |args| args.limit = Some("1".to_string()));

        let result = orchestrator(settings, LATEST)
            .run_with_progress(false)
            .await
            .unwrap();

        assert_eq!(result.matrix.len(), 1);
        assert_eq!(result.matrix.include[0].display_name, "foo packages");
        assert_eq!(result.truncated, 1);
    }

    #[tokio::test]
    async fn test_run_missing_root_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let settings = settings(&temp.path().join("nope"), |_| {});

        let err = orchestrator(settings, LATEST)
            .run_with_progress(false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Io(IoError::DirectoryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_everything_excluded() {
        let temp = workspace();
        let settings = settings(temp.path(), |args| {
            args.exclude_packages = vec!["*".to_string()];
        });

        let result = orchestrator(settings, LATEST)
            .run_with_progress(false)
            .await
            .unwrap();

        assert_eq!(result.scanned, 4);
        assert_eq!(result.excluded, 4);
        assert!(result.matrix.is_empty());
        assert!(result.skipped.is_empty());
    }
}
