//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling

use crate::error::RegistryError;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depmatrix/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic and error context
    pub async fn get_with_context(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RegistryError::RateLimitExceeded {
                            registry: registry.to_string(),
                        });

                        if attempt < self.max_retries {
                            debug!(package, attempt, "rate limited, backing off");
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        }
                        break;
                    }

                    if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(RegistryError::package_not_found(package, registry));
                    }

                    if !response.status().is_success() {
                        let status = response.status();
                        return Err(RegistryError::network_error(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(RegistryError::timeout(package, registry));
                    } else {
                        last_error = Some(RegistryError::network_error(
                            package,
                            registry,
                            e.to_string(),
                        ));
                    }

                    if attempt < self.max_retries {
                        debug!(package, attempt, error = %e, "request failed, retrying");
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "unknown error")))
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self.get_with_context(url, package, registry).await?;

        response.json::<T>().await.map_err(|e| {
            RegistryError::invalid_response(package, registry, format!("failed to parse JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_max_retries() {
        let client = HttpClient::new().unwrap().with_max_retries(5);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("depmatrix/"));
        assert_eq!(MAX_RETRIES, 3);
        assert_eq!(BASE_DELAY_MS, 100);
    }

    #[tokio::test]
    async fn test_get_json_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap().with_max_retries(0);
        let url = format!("{}/missing", server.url());
        let err = client
            .get_json::<serde_json::Value>(&url, "missing", "npm")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_json_retries_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/busy")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap().with_max_retries(1);
        let url = format!("{}/busy", server.url());
        let err = client
            .get_json::<serde_json::Value>(&url, "busy", "npm")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, RegistryError::RateLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/garbage", server.url());
        let err = client
            .get_json::<serde_json::Value>(&url, "garbage", "npm")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidResponse { .. }));
    }
}
