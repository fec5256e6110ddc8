//! # Core Configuration Module
//!
//! Provides configuration management for the StudySync core.
//!
//! ## Overview
//!
//! A builder assembles a [`CoreConfig`] holding the host bridges and the
//! settings the sync engine needs to reach the remote store. Validation is
//! fail-fast: `build()` refuses a config that could never sync.
//!
//! ## Required
//!
//! - Remote store base URL (`http://` or `https://`)
//! - `HttpClient` (desktop default: reqwest, injected with `desktop-shims`)
//!
//! ## Optional (with defaults)
//!
//! - API token for the remote store (none)
//! - `Clock` (system clock)
//! - Request timeout (30 seconds)
//! - Local history file path (none; the host passes items directly)
//! - Generator cache capacity (128 entries)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .remote_base_url("https://study.example.com")
//!     .api_token("secret")
//!     .history_path("/home/me/.local/share/studysync/history.json")
//!     .http_client(Arc::new(MyHttpClient))
//!     .build()?;
//! ```
//!
//! Missing capabilities produce an actionable error:
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! // Without `desktop-shims` and without an injected client this fails
//! // with Error::CapabilityMissing { capability: "HttpClient", .. }.
//! let config = CoreConfig::builder()
//!     .remote_base_url("https://study.example.com")
//!     .build();
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_GENERATOR_CACHE_CAPACITY: usize = 128;

/// Core configuration for the StudySync core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the remote store, without trailing slash
    pub remote_base_url: String,

    /// Bearer token sent with every remote store request
    pub api_token: Option<String>,

    /// HTTP client used by the remote store client
    pub http_client: Arc<dyn HttpClient>,

    /// Time source for default-filled timestamps
    pub clock: Arc<dyn Clock>,

    /// Per-request timeout for remote store calls
    pub request_timeout: Duration,

    /// Where the local offline copy of the history lives, if the core manages it
    pub history_path: Option<PathBuf>,

    /// Maximum number of generated results kept in memory
    pub generator_cache_capacity: usize,

    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("remote_base_url", &self.remote_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("http_client", &"HttpClient { ... }")
            .field("clock", &"Clock { ... }")
            .field("request_timeout", &self.request_timeout)
            .field("history_path", &self.history_path)
            .field("generator_cache_capacity", &self.generator_cache_capacity)
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Publish sync progress on the event bus in addition to the callback
    pub publish_sync_events: bool,

    /// Memoize content generator results
    pub cache_generated_content: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            publish_sync_events: true,
            cache_generated_content: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL is non-empty and uses http(s)
    /// - Request timeout is within (0, 10 minutes]
    /// - Generator cache capacity is non-zero when caching is enabled
    pub fn validate(&self) -> Result<()> {
        if self.remote_base_url.trim().is_empty() {
            return Err(Error::Config("Remote base URL cannot be empty".to_string()));
        }

        if !(self.remote_base_url.starts_with("http://")
            || self.remote_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "Remote base URL must start with http:// or https://, got '{}'",
                self.remote_base_url
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.features.cache_generated_content && self.generator_cache_capacity == 0 {
            return Err(Error::Config(
                "Generator cache enabled with zero capacity. \
                 Disable the feature or set a capacity of at least 1."
                    .to_string(),
            ));
        }

        if matches!(&self.api_token, Some(token) if token.trim().is_empty()) {
            return Err(Error::Config(
                "API token is set but empty. Omit it for anonymous access.".to_string(),
            ));
        }

        Ok(())
    }

    /// Endpoint URL for a resource path such as `/api/documents`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.remote_base_url, path)
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject an adapter with .http_client()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    remote_base_url: Option<String>,
    api_token: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
    request_timeout: Option<Duration>,
    history_path: Option<PathBuf>,
    generator_cache_capacity: Option<usize>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    /// Sets the remote store base URL. A trailing slash is removed.
    pub fn remote_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.remote_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn history_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.history_path = Some(path.into());
        self
    }

    pub fn generator_cache_capacity(mut self, capacity: usize) -> Self {
        self.generator_cache_capacity = Some(capacity);
        self
    }

    pub fn publish_sync_events(mut self, enabled: bool) -> Self {
        self.features.publish_sync_events = enabled;
        self
    }

    pub fn cache_generated_content(mut self, enabled: bool) -> Self {
        self.features.cache_generated_content = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the configuration, injecting platform defaults where allowed.
    ///
    /// # Errors
    ///
    /// - `Error::Config` when the base URL is missing or a value is out of range
    /// - `Error::CapabilityMissing` when no `HttpClient` is available
    pub fn build(self) -> Result<CoreConfig> {
        let remote_base_url = self.remote_base_url.ok_or_else(|| {
            Error::Config(
                "Remote base URL is required. Use .remote_base_url() to set it.".to_string(),
            )
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = CoreConfig {
            remote_base_url,
            api_token: self.api_token,
            http_client,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            request_timeout,
            history_path: self.history_path,
            generator_cache_capacity: self
                .generator_cache_capacity
                .unwrap_or(DEFAULT_GENERATOR_CACHE_CAPACITY),
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{HttpRequest, HttpResponse};

    struct StubHttpClient;

    #[async_trait]
    impl HttpClient for StubHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Default::default(),
            })
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder().http_client(Arc::new(StubHttpClient))
    }

    #[test]
    fn test_build_with_defaults() {
        let config = builder()
            .remote_base_url("https://study.example.com/")
            .build()
            .unwrap();

        assert_eq!(config.remote_base_url, "https://study.example.com");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(
            config.generator_cache_capacity,
            DEFAULT_GENERATOR_CACHE_CAPACITY
        );
        assert!(config.api_token.is_none());
        assert!(config.history_path.is_none());
        assert_eq!(config.features, FeatureFlags::default());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = builder()
            .remote_base_url("http://localhost:3000")
            .build()
            .unwrap();

        assert_eq!(
            config.endpoint("/api/question-banks"),
            "http://localhost:3000/api/question-banks"
        );
    }

    #[test]
    fn test_missing_base_url() {
        let err = builder().build().unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("remote_base_url")));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = builder()
            .remote_base_url("ftp://study.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = builder()
            .remote_base_url("https://study.example.com")
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("timeout")));
    }

    #[test]
    fn test_rejects_excessive_timeout() {
        let err = builder()
            .remote_base_url("https://study.example.com")
            .request_timeout(Duration::from_secs(3600))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_cache_capacity_requires_disabled_cache() {
        let err = builder()
            .remote_base_url("https://study.example.com")
            .generator_cache_capacity(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("capacity")));

        let config = builder()
            .remote_base_url("https://study.example.com")
            .generator_cache_capacity(0)
            .cache_generated_content(false)
            .build()
            .unwrap();
        assert!(!config.features.cache_generated_content);
    }

    #[test]
    fn test_rejects_blank_token() {
        let err = builder()
            .remote_base_url("https://study.example.com")
            .api_token("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = builder()
            .remote_base_url("https://study.example.com")
            .api_token("super-secret")
            .build()
            .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_without_shims() {
        let err = CoreConfig::builder()
            .remote_base_url("https://study.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { capability, .. } if capability == "HttpClient"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_default_http_client_with_shims() {
        let config = CoreConfig::builder()
            .remote_base_url("https://study.example.com")
            .build()
            .unwrap();
        assert_eq!(config.remote_base_url, "https://study.example.com");
    }
}
