//! Asynchronous Dashboard API client implementation.

use crate::models::{
    ApplianceSettings, CombineNetworksRequest, CombineNetworksResponse, Device, LicenseOverview,
    Network, Organization, UpdateNetworkRequest,
};
use crate::Result;
use async_trait::async_trait;
use orgsplit_core::client::{ClientConfig, RetryPolicy, DEFAULT_PER_PAGE};
use orgsplit_core::config::{self, DashboardConfig};
use orgsplit_core::ids::{NetworkId, OrganizationId};
use orgsplit_core::query::QueryParams;
use orgsplit_core::Error;
use reqwest::header::{HeaderMap, ACCEPT, LINK, RETRY_AFTER};
use reqwest::{Certificate, Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("orgsplit/", env!("CARGO_PKG_VERSION"));

/// Dashboard operations consumed by the orgsplit workflows.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// List every organization the API key can access.
    async fn list_organizations(&self) -> Result<Vec<Organization>>;

    /// List all networks of an organization, across all pages.
    async fn list_organization_networks(&self, org: &OrganizationId) -> Result<Vec<Network>>;

    /// List all devices of an organization, across all pages.
    async fn list_organization_devices(&self, org: &OrganizationId) -> Result<Vec<Device>>;

    /// Fetch the security appliance settings of a network.
    async fn get_network_appliance_settings(
        &self,
        network: &NetworkId,
    ) -> Result<ApplianceSettings>;

    /// Fetch the license overview of an organization.
    async fn get_organization_licenses_overview(
        &self,
        org: &OrganizationId,
    ) -> Result<LicenseOverview>;

    /// Update a network; only the name is ever changed by this tool.
    async fn update_network(
        &self,
        network: &NetworkId,
        request: &UpdateNetworkRequest,
    ) -> Result<Network>;

    /// Combine several networks of an organization into one.
    async fn combine_organization_networks(
        &self,
        org: &OrganizationId,
        request: &CombineNetworksRequest,
    ) -> Result<CombineNetworksResponse>;
}

/// Builder for [`DashboardClient`].
#[derive(Debug, Clone)]
pub struct DashboardClientBuilder {
    base_url: Url,
    http_config: ClientConfig,
    retry_policy: RetryPolicy,
    api_key: Option<SecretString>,
    certificate_path: Option<PathBuf>,
    per_page: u32,
}

impl DashboardClientBuilder {
    /// Create a new builder from the provided base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        config::normalize_base_url(base_url.as_ref()).map(Self::with_base_url)
    }

    /// Create a builder carrying every setting of a validated configuration.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let mut builder = Self::with_base_url(config.parse_base_url()?)
            .with_http_config(config.client_config())
            .with_per_page(config.per_page)
            .with_api_key(config.api_key()?);
        builder.certificate_path.clone_from(&config.certificate_path);
        Ok(builder)
    }

    fn with_base_url(base_url: Url) -> Self {
        let http_config = ClientConfig::new();
        Self {
            base_url,
            retry_policy: http_config.retry_policy,
            http_config,
            api_key: None,
            certificate_path: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.retry_policy = config.retry_policy;
        self.http_config = config;
        self
    }

    /// Set the API key sent as bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Trust an extra PEM root certificate, e.g. for TLS-intercepting proxies.
    #[must_use]
    pub fn with_certificate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = Some(path.into());
        self
    }

    /// Set the page size requested from list endpoints.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Build the client instance.
    pub fn build(self) -> Result<DashboardClient> {
        let api_key = config::require_api_key(self.api_key.as_ref())?.to_owned();
        let api_key = SecretString::from(api_key);

        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .connect_timeout(self.http_config.connect_timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host);

        if let Some(path) = &self.certificate_path {
            let pem = std::fs::read(path).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read certificate `{}`: {err}",
                    path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|err| {
                Error::ConfigError(format!(
                    "Invalid PEM certificate `{}`: {err}",
                    path.display()
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Dashboard HTTP client: {err}"))
        })?;

        Ok(DashboardClient {
            http,
            base_url: self.base_url,
            retry_policy: self.retry_policy,
            api_key,
            per_page: self.per_page,
        })
    }
}

/// Asynchronous client for the Dashboard API.
#[derive(Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: Url,
    retry_policy: RetryPolicy,
    api_key: SecretString,
    per_page: u32,
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry_policy", &self.retry_policy)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

struct RawResponse {
    status: StatusCode,
    next: Option<Url>,
    body: Vec<u8>,
}

impl DashboardClient {
    /// Construct directly from a validated configuration.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        DashboardClientBuilder::from_config(config)?.build()
    }

    /// Access the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let normalized = path.strip_prefix('/').unwrap_or(path);
        self.base_url.join(normalized).map_err(|err| {
            Error::InvalidEndpoint(format!("Invalid Dashboard path `{path}`: {err}"))
        })
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, None).await
    }

    async fn send_json<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.build_url(path)?;
        let response = self.execute(method, url, body, &[]).await?;
        deserialize_body(path, response.status, &response.body)
    }

    /// Fetch every page of a list endpoint by following `Link: rel=next`.
    async fn get_all_pages<T>(&self, path: &str, params: QueryParams) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut url = self.build_url(path)?;
        let mut params = params.into_pairs();
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response = self.execute::<()>(Method::GET, url, None, &params).await?;
            let batch: Vec<T> = deserialize_body(path, response.status, &response.body)?;
            debug!(path, page, count = batch.len(), "Fetched Dashboard page");
            items.extend(batch);

            match response.next {
                Some(next) => {
                    // The next link already carries the full query string.
                    url = next;
                    params.clear();
                    page += 1;
                }
                None => break,
            }
        }

        Ok(items)
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        params: &[(&'static str, String)],
    ) -> Result<RawResponse>
    where
        B: Serialize + ?Sized + Sync,
    {
        let path = url.path().to_string();
        let mut attempt = 0;
        let mut rate_limited = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .query(params)
                .bearer_auth(self.api_key.expose_secret())
                .header(ACCEPT, "application/json");
            if let Some(payload) = body {
                request = request.json(payload);
            }

            debug!(%method, path = %path, attempt, "Dashboard request");

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let bytes = response.bytes().await.map_err(|err| {
                        Error::HttpError(format!("Failed to read Dashboard response body: {err}"))
                    })?;

                    if status.is_success() {
                        return Ok(RawResponse {
                            status,
                            next: next_page_url(&headers),
                            body: bytes.to_vec(),
                        });
                    }

                    let message = error_message(&bytes);
                    match status {
                        StatusCode::TOO_MANY_REQUESTS => {
                            if !self.retry_policy.wait_on_rate_limit
                                || rate_limited >= self.retry_policy.rate_limit_retries
                            {
                                return Err(Error::RateLimited(format!("{path}: {message}")));
                            }
                            rate_limited += 1;
                            let delay = self
                                .retry_policy
                                .rate_limit_delay(rate_limited, retry_after(&headers));
                            info!(path = %path, rate_limited, ?delay, "Rate limited, waiting before retry");
                            sleep(delay).await;
                            continue;
                        }
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            return Err(Error::Unauthorized(format!("{path}: {message}")));
                        }
                        StatusCode::NOT_FOUND => {
                            return Err(Error::NotFound(format!("{path}: {message}")));
                        }
                        status if status.is_server_error() => Error::ServiceUnavailable(format!(
                            "Dashboard server error {status} for {path}: {message}"
                        )),
                        status => {
                            return Err(Error::Api {
                                status: status.as_u16(),
                                message,
                            });
                        }
                    }
                }
                Err(err) => {
                    let error = Error::from(err);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    error
                }
            };

            attempt += 1;
            if attempt > self.retry_policy.max_retries {
                return Err(error);
            }
            let delay = self.retry_policy.delay_for_attempt(attempt);
            if delay > Duration::ZERO {
                debug!(path = %path, attempt, "Retrying Dashboard request after {:?}", delay);
                sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl DirectoryApi for DashboardClient {
    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.get_all_pages("organizations", QueryParams::new()).await
    }

    async fn list_organization_networks(&self, org: &OrganizationId) -> Result<Vec<Network>> {
        let path = format!("organizations/{org}/networks");
        self.get_all_pages(&path, QueryParams::paged(self.per_page))
            .await
    }

    async fn list_organization_devices(&self, org: &OrganizationId) -> Result<Vec<Device>> {
        let path = format!("organizations/{org}/devices");
        self.get_all_pages(&path, QueryParams::paged(self.per_page))
            .await
    }

    async fn get_network_appliance_settings(
        &self,
        network: &NetworkId,
    ) -> Result<ApplianceSettings> {
        let path = format!("networks/{network}/appliance/settings");
        self.get_json(&path).await
    }

    async fn get_organization_licenses_overview(
        &self,
        org: &OrganizationId,
    ) -> Result<LicenseOverview> {
        let path = format!("organizations/{org}/licenses/overview");
        self.get_json(&path).await
    }

    async fn update_network(
        &self,
        network: &NetworkId,
        request: &UpdateNetworkRequest,
    ) -> Result<Network> {
        let path = format!("networks/{network}");
        self.send_json(Method::PUT, &path, Some(request)).await
    }

    async fn combine_organization_networks(
        &self,
        org: &OrganizationId,
        request: &CombineNetworksRequest,
    ) -> Result<CombineNetworksResponse> {
        let path = format!("organizations/{org}/networks/combine");
        self.send_json(Method::POST, &path, Some(request)).await
    }
}

fn deserialize_body<R>(path: &str, status: StatusCode, bytes: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    if status == StatusCode::NO_CONTENT || bytes.is_empty() {
        serde_json::from_value(serde_json::Value::Null).map_err(|err| {
            Error::ParseError(format!(
                "Failed to parse empty Dashboard response for `{path}`: {err}"
            ))
        })
    } else {
        serde_json::from_slice(bytes).map_err(|err| {
            Error::ParseError(format!(
                "Failed to parse Dashboard response for `{path}`: {err}"
            ))
        })
    }
}

/// Extract the `errors` array of a Dashboard error body, or fall back to the raw text.
fn error_message(bytes: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        errors: Vec<String>,
    }

    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(body) if !body.errors.is_empty() => body.errors.join(", "),
        _ => String::from_utf8_lossy(bytes).trim().to_string(),
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Parse the RFC 5988 `Link` header and return the `rel=next` target.
fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|param| {
                let param = param.trim().replace('"', "");
                param.eq_ignore_ascii_case("rel=next")
            });
            if !is_next {
                return None;
            }
            let target = target.strip_prefix('<')?.strip_suffix('>')?;
            Url::parse(target).ok()
        })
}
