//! `npm view` adapter
//!
//! Asks the locally installed npm for `version` and `repository`, so the
//! user's `.npmrc` (registry, auth) applies without any extra configuration.

use crate::error::RegistryError;
use crate::registry::{PackageMetadata, RegistryLookup, Repository};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;

/// Default time allowed for one `npm view` invocation
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry lookup backed by the `npm` command
pub struct NpmCliLookup {
    program: String,
    timeout: Duration,
}

impl Default for NpmCliLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl NpmCliLookup {
    pub fn new() -> Self {
        Self {
            program: "npm".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different executable in place of `npm`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_line(&self, package: &str) -> String {
        format!("{} view {} version repository --json", self.program, package)
    }
}

/// Parse the JSON printed by `npm view <name> version repository --json`.
///
/// npm prints a bare string when only `version` is set and an object when
/// both fields are; empty output means the package has neither.
pub fn parse_view_output(stdout: &str) -> Result<Option<PackageMetadata>, String> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(stdout).map_err(|e| e.to_string())?;
    match value {
        Value::String(version) => Ok(Some(PackageMetadata::new(version, None))),
        Value::Object(fields) => {
            let Some(version) = fields.get("version").and_then(Value::as_str) else {
                return Ok(None);
            };
            let repository = fields.get("repository").and_then(Repository::from_value);
            Ok(Some(PackageMetadata::new(version, repository)))
        }
        Value::Null => Ok(None),
        other => Err(format!("unexpected output: {}", other)),
    }
}

#[async_trait]
impl RegistryLookup for NpmCliLookup {
    fn registry_name(&self) -> &'static str {
        "npm view"
    }

    async fn latest(&self, package: &str) -> Result<Option<PackageMetadata>, RegistryError> {
        let command = self.command_line(package);
        let mut cmd = Command::new(&self.program);
        cmd.args(["view", package, "version", "repository", "--json"])
            .kill_on_drop(true);
        let run = cmd.output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| RegistryError::timeout(package, self.registry_name()))?
            .map_err(|e| RegistryError::command_failed(package, &command, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("E404") {
                return Err(RegistryError::package_not_found(package, self.registry_name()));
            }
            return Err(RegistryError::command_failed(
                package,
                &command,
                stderr.lines().next().unwrap_or("non-zero exit status"),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_view_output(&stdout).map_err(|message| {
            RegistryError::invalid_response(package, self.registry_name(), message)
        })
    }
}
