//! npm Registry adapter
//!
//! Fetches the latest version and repository of a package from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}

use crate::error::RegistryError;
use crate::registry::{HttpClient, PackageMetadata, RegistryLookup, Repository};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// npm registry base URL
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmRegistryLookup {
    client: HttpClient,
    base_url: String,
}

/// npm package document (packument), only the fields we read
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Per-version manifests, kept raw so one odd version cannot fail the parse
    #[serde(default)]
    versions: HashMap<String, Value>,
    #[serde(default)]
    repository: Option<Value>,
}

impl NpmRegistryLookup {
    /// Create a new npm adapter against the public registry
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_REGISTRY_URL)
    }

    /// Create a new npm adapter against a custom registry (mirrors, tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build the URL for a package; the scope separator is percent-encoded
    fn build_url(&self, package: &str) -> String {
        let encoded = if package.starts_with('@') {
            package.replacen('/', "%2F", 1)
        } else {
            package.to_string()
        };
        format!("{}/{}", self.base_url, encoded)
    }
}

impl NpmPackageResponse {
    fn into_metadata(self) -> Option<PackageMetadata> {
        let version = self.dist_tags.get("latest")?.clone();

        // Repository as published with the latest version, like `npm view`
        let repository = self
            .versions
            .get(&version)
            .and_then(|manifest| manifest.get("repository"))
            .and_then(Repository::from_value)
            .or_else(|| self.repository.as_ref().and_then(Repository::from_value));

        Some(PackageMetadata::new(version, repository))
    }
}

#[async_trait]
impl RegistryLookup for NpmRegistryLookup {
    fn registry_name(&self) -> &'static str {
        "npm"
    }

    async fn latest(&self, package: &str) -> Result<Option<PackageMetadata>, RegistryError> {
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        Ok(response.into_metadata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(base_url: &str) -> NpmRegistryLookup {
        let client = HttpClient::new().unwrap().with_max_retries(0);
        NpmRegistryLookup::with_base_url(client, base_url)
    }

    #[test]
    fn test_registry_name() {
        assert_eq!(adapter(DEFAULT_REGISTRY_URL).registry_name(), "npm");
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            adapter(DEFAULT_REGISTRY_URL).build_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }

    #[test]
    fn test_build_url_scoped_package() {
        assert_eq!(
            adapter("https://npm.example.com/").build_url("@types/node"),
            "https://npm.example.com/@types%2Fnode"
        );
    }

    #[tokio::test]
    async fn test_latest_reads_dist_tag_and_version_repository() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "name": "left-pad",
            "dist-tags": {"latest": "1.3.0", "next": "2.0.0-rc.1"},
            "repository": {"type": "git", "url": "git+https://github.com/old/left-pad.git"},
            "versions": {
                "1.2.0": {},
                "1.3.0": {"repository": {"type": "git", "url": "git+https://github.com/x/left-pad.git"}}
            }
        }"#;
        server
            .mock("GET", "/left-pad")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let meta = adapter(&server.url())
            .latest("left-pad")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.version, "1.3.0");
        assert_eq!(
            meta.repository_url().as_deref(),
            Some("https://github.com/x/left-pad")
        );
    }

    #[tokio::test]
    async fn test_latest_falls_back_to_top_level_repository() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "dist-tags": {"latest": "4.17.21"},
            "repository": "lodash/lodash",
            "versions": {"4.17.21": {"repository": 7}}
        }"#;
        server
            .mock("GET", "/lodash")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let meta = adapter(&server.url()).latest("lodash").await.unwrap().unwrap();
        assert_eq!(meta.version, "4.17.21");
        assert_eq!(
            meta.repository_url().as_deref(),
            Some("https://github.com/lodash/lodash")
        );
    }

    #[tokio::test]
    async fn test_latest_scoped_package() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/@foo(%2F|%2f|/)a$".to_string()),
            )
            .with_status(200)
            .with_body(r#"{"dist-tags": {"latest": "1.1.0"}, "versions": {}}"#)
            .create_async()
            .await;

        let meta = adapter(&server.url()).latest("@foo/a").await.unwrap().unwrap();
        assert_eq!(meta.version, "1.1.0");
        assert!(meta.repository.is_none());
    }

    #[tokio::test]
    async fn test_latest_without_dist_tag() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/unpublished")
            .with_status(200)
            .with_body(r#"{"time": {"unpublished": {}}}"#)
            .create_async()
            .await;

        let meta = adapter(&server.url()).latest("unpublished").await.unwrap();
        assert!(meta.is_none());
    }

    #[tokio::test]
    async fn test_latest_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/nope")
            .with_status(404)
            .create_async()
            .await;

        let err = adapter(&server.url()).latest("nope").await.unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }
}
