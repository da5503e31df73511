//! Configuration for a Dashboard session.
//!
//! A [`DashboardConfig`] describes everything needed to open one authenticated
//! session: endpoint, credentials, TLS trust, retry budgets and batch limits.

use crate::client::{
    ClientConfig, RetryPolicy, DASHBOARD_DEFAULT_TIMEOUT, DEFAULT_BASE_URL,
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_RETRIES, DEFAULT_PER_PAGE,
    DEFAULT_RATE_LIMIT_RETRIES,
};
use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for a Dashboard client session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    /// Dashboard API base URL
    #[validate(url)]
    pub base_url: String,

    /// API key used as bearer token
    #[serde(skip)]
    pub api_key: Option<SecretString>,

    /// Optional path to an extra PEM root certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retries for server and transport errors
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Maximum number of retries while rate limited
    #[validate(range(min = 0, max = 1000))]
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,

    /// Whether to wait and retry on HTTP 429
    #[serde(default = "default_wait_on_rate_limit")]
    pub wait_on_rate_limit: bool,

    /// Maximum concurrently in-flight requests per batch
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_maximum_concurrent_requests")]
    pub maximum_concurrent_requests: usize,

    /// Page size for paginated list endpoints
    #[validate(range(min = 3, max = 1000))]
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

const fn default_request_timeout_secs() -> u64 {
    DASHBOARD_DEFAULT_TIMEOUT
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_rate_limit_retries() -> u32 {
    DEFAULT_RATE_LIMIT_RETRIES
}

const fn default_wait_on_rate_limit() -> bool {
    true
}

const fn default_maximum_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

const fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl DashboardConfig {
    /// Create a new configuration for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the extra root certificate path.
    #[must_use]
    pub fn with_certificate_path(mut self, path: Option<PathBuf>) -> Self {
        self.certificate_path = path;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the rate-limit retry budget.
    #[must_use]
    pub const fn with_rate_limit_retries(mut self, retries: u32) -> Self {
        self.rate_limit_retries = retries;
        self
    }

    /// Enable or disable waiting on rate limits.
    #[must_use]
    pub const fn with_wait_on_rate_limit(mut self, wait: bool) -> Self {
        self.wait_on_rate_limit = wait;
        self
    }

    /// Set the maximum number of concurrent requests per batch.
    #[must_use]
    pub const fn with_concurrency(mut self, limit: usize) -> Self {
        self.maximum_concurrent_requests = limit;
        self
    }

    /// Set the page size for list endpoints.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expose the API key for building request headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if no key was configured or it is blank.
    pub fn api_key(&self) -> Result<&str, Error> {
        require_api_key(self.api_key.as_ref())
    }

    /// Parse and validate the base URL.
    ///
    /// A trailing slash is appended so relative paths join below the API version.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        normalize_base_url(&self.base_url)
    }

    /// Derive the HTTP client settings from this configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let retry = RetryPolicy::new()
            .with_max_retries(self.max_retries)
            .with_rate_limit_retries(self.rate_limit_retries)
            .with_wait_on_rate_limit(self.wait_on_rate_limit);

        ClientConfig::new()
            .with_timeout(self.timeout())
            .with_retry_policy(retry)
            .with_pool_max_idle(self.maximum_concurrent_requests)
    }
}

/// Return the trimmed API key, rejecting a missing or blank one.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if `key` is `None` or only whitespace.
pub fn require_api_key(key: Option<&SecretString>) -> Result<&str, Error> {
    match key.map(|key| key.expose_secret().trim()) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(Error::ConfigError("API key is required".to_string())),
    }
}

/// Parse a Dashboard base URL, appending the trailing slash relative paths
/// need to join below the API version.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the URL cannot be parsed.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid base URL `{raw}`: {e}")))
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            certificate_path: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_retries: default_rate_limit_retries(),
            wait_on_rate_limit: default_wait_on_rate_limit(),
            maximum_concurrent_requests: default_maximum_concurrent_requests(),
            per_page: default_per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_config_new() {
        let config = DashboardConfig::new("https://api.example.com/api/v1").unwrap();
        assert_eq!(config.base_url, "https://api.example.com/api/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.rate_limit_retries, 100);
        assert!(config.wait_on_rate_limit);
        assert_eq!(config.maximum_concurrent_requests, 10);
        assert_eq!(config.per_page, 1000);
    }

    #[test]
    fn test_dashboard_config_default_points_at_dashboard() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dashboard_config_invalid_url() {
        assert!(DashboardConfig::new("not-a-url").is_err());
    }

    #[test]
    fn test_dashboard_config_builder() {
        let config = DashboardConfig::default()
            .with_api_key("abc123")
            .with_certificate_path(Some(PathBuf::from("/tmp/ca.pem")))
            .with_timeout(60)
            .with_max_retries(5)
            .with_rate_limit_retries(20)
            .with_wait_on_rate_limit(false)
            .with_concurrency(4)
            .with_per_page(50);

        assert_eq!(config.api_key().unwrap(), "abc123");
        assert_eq!(config.certificate_path, Some(PathBuf::from("/tmp/ca.pem")));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.rate_limit_retries, 20);
        assert!(!config.wait_on_rate_limit);
        assert_eq!(config.maximum_concurrent_requests, 4);
        assert_eq!(config.per_page, 50);
    }

    #[test]
    fn test_api_key_required() {
        let config = DashboardConfig::default();
        assert!(matches!(config.api_key(), Err(Error::ConfigError(_))));

        let blank = DashboardConfig::default().with_api_key("   ");
        assert!(blank.api_key().is_err());

        let padded = DashboardConfig::default().with_api_key("  key \n");
        assert_eq!(padded.api_key().unwrap(), "key");
    }

    #[test]
    fn test_api_key_not_serialized_or_debugged() {
        let config = DashboardConfig::default().with_api_key("super-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let config = DashboardConfig::new("https://api.example.com/api/v1").unwrap();
        let url = config.parse_base_url().unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/");
        assert_eq!(
            url.join("organizations").unwrap().as_str(),
            "https://api.example.com/api/v1/organizations"
        );
    }

    #[test]
    fn test_normalize_base_url() {
        let url = normalize_base_url("  https://api.example.com/api/v1/ ").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/");
        assert!(matches!(
            normalize_base_url("::not a url"),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_client_config_derivation() {
        let config = DashboardConfig::default()
            .with_timeout(45)
            .with_max_retries(1)
            .with_rate_limit_retries(9)
            .with_concurrency(7);
        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(45));
        assert_eq!(client.retry_policy.max_retries, 1);
        assert_eq!(client.retry_policy.rate_limit_retries, 9);
        assert_eq!(client.pool_max_idle_per_host, 7);
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = DashboardConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.request_timeout_secs = 30;

        config.maximum_concurrent_requests = 0;
        assert!(config.validate().is_err());
        config.maximum_concurrent_requests = 101;
        assert!(config.validate().is_err());
        config.maximum_concurrent_requests = 10;

        config.max_retries = 11;
        assert!(config.validate().is_err());
        config.max_retries = 3;

        config.per_page = 2;
        assert!(config.validate().is_err());
        config.per_page = 1000;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"base_url": "https://api.example.com/api/v1"}"#).unwrap();
        assert_eq!(config.maximum_concurrent_requests, 10);
        assert_eq!(config.rate_limit_retries, 100);
        assert!(config.api_key.is_none());
    }
}
