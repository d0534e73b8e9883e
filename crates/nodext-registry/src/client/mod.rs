//! HTTP client implementation with connection pooling and retry logic

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;
use url::Url;

use nodext_core::error::NodextError;
use nodext_core::types::is_scoped;
use crate::api::PackageMetadataResponse;
use crate::RegistryResult;

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Abbreviated package document: no dev dependencies, much smaller
const ABBREVIATED_DOCUMENT: &str = "application/vnd.npm.install-v1+json";
const FULL_DOCUMENT: &str = "application/json";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Fail on the first error
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// HTTP client for npm registry package documents
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL, always ending in `/`
    base_url: Url,
}

impl RegistryClient {
    /// Create a client for the public npm registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(DEFAULT_REGISTRY, None, RetryConfig::default())
    }

    /// Create a client for another registry
    pub fn with_registry(registry: &str) -> RegistryResult<Self> {
        Self::with_config(registry, None, RetryConfig::default())
    }

    /// Create registry client with custom configuration
    pub fn with_config(
        registry: &str,
        auth: Option<AuthConfig>,
        retry_config: RetryConfig,
    ) -> RegistryResult<Self> {
        let base_url = parse_base_url(registry)?;

        let mut builder = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(30))
            // Enable gzip compression
            .gzip(true)
            // User agent
            .user_agent(concat!("nodext/", env!("CARGO_PKG_VERSION")));

        if let Some(auth_value) = auth.and_then(authorization_value) {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                auth_value
                    .parse()
                    .map_err(|e| NodextError::network("Invalid registry credentials".to_string(), e))?,
            );
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|e| NodextError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry_config,
            base_url,
        })
    }

    /// Replace the retry configuration
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Registry this client talks to
    pub fn registry(&self) -> &str {
        self.base_url.as_str()
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                // Only transport failures and server errors are worth another attempt
                Err(error) if !error.is_recoverable() || attempt >= self.retry_config.max_retries => {
                    return Err(error);
                },
                Err(error) => {
                    attempt += 1;
                    debug!("Registry request failed ({}), retry {} in {:?}", error, attempt, delay);
                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }
    }

    /// Fetch the abbreviated package document with retry logic
    pub async fn fetch_metadata(&self, package_name: &str) -> RegistryResult<PackageMetadataResponse> {
        self.fetch_document(package_name, ABBREVIATED_DOCUMENT).await
    }

    /// Fetch the full package document, which also lists `devDependencies`
    pub async fn fetch_full_metadata(&self, package_name: &str) -> RegistryResult<PackageMetadataResponse> {
        self.fetch_document(package_name, FULL_DOCUMENT).await
    }

    async fn fetch_document(&self, package_name: &str, accept: &str) -> RegistryResult<PackageMetadataResponse> {
        let url = self.package_url(package_name)?;

        self.with_retry(|| async {
            let response = self
                .client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, accept)
                .send()
                .await
                .map_err(|e| NodextError::network(format!("Failed to fetch {}", url), e))?;

            match response.status() {
                reqwest::StatusCode::OK => response
                    .json::<PackageMetadataResponse>()
                    .await
                    .map_err(|e| NodextError::JsonParse {
                        path: url.to_string(),
                        message: e.to_string(),
                    }),
                reqwest::StatusCode::NOT_FOUND => Err(NodextError::PackageNotFound {
                    name: package_name.to_string(),
                }),
                status => Err(NodextError::Registry {
                    name: package_name.to_string(),
                    status: status.as_u16(),
                }),
            }
        })
        .await
    }

    /// Document URL for a package
    fn package_url(&self, package_name: &str) -> RegistryResult<Url> {
        self.base_url
            .join(&self.encode_package_name(package_name))
            .map_err(|e| NodextError::ConfigValidation {
                field: "registry".to_string(),
                reason: format!("Cannot build URL for {}: {}", package_name, e),
            })
    }

    /// Encode package name for URL (handle scoped packages)
    fn encode_package_name(&self, name: &str) -> String {
        if is_scoped(name) {
            // Scoped package: @org/pkg -> @org%2fpkg
            name.replace('/', "%2f")
        } else {
            name.to_string()
        }
    }
}

fn parse_base_url(registry: &str) -> RegistryResult<Url> {
    let normalized = if registry.ends_with('/') {
        registry.to_string()
    } else {
        format!("{}/", registry)
    };

    Url::parse(&normalized).map_err(|e| NodextError::ConfigValidation {
        field: "registry".to_string(),
        reason: format!("Invalid registry URL '{}': {}", registry, e),
    })
}

fn authorization_value(auth: AuthConfig) -> Option<String> {
    if let Some(token) = auth.token {
        return Some(format!("Bearer {}", token));
    }

    match (auth.username, auth.password) {
        (Some(username), Some(password)) => {
            use base64::{engine::general_purpose, Engine as _};
            Some(format!(
                "Basic {}",
                general_purpose::STANDARD.encode(format!("{}:{}", username, password))
            ))
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests;
