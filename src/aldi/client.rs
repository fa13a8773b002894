//! HTTP transport for search pages, with bounded retries and explicit TLS trust.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::{Certificate, Client, Method, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Transport failure after the retry budget is spent.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed with status: {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status)
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Fetches page HTML - enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GETs `url` and returns the response body decoded with its declared
    /// charset (UTF-8 when none is declared).
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Which failures are retried, and how long to wait between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff base in seconds; the n-th retry (n > 1) waits `factor * 2^(n-1)`
    pub backoff_factor: f64,
    /// Statuses considered transient
    pub statuses: Vec<StatusCode>,
    /// Methods safe to repeat
    pub methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 0.6,
            statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
            methods: vec![Method::HEAD, Method::GET, Method::OPTIONS],
        }
    }
}

impl RetryPolicy {
    /// Disables retries.
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Returns true if `err` from a `method` request may be retried.
    pub fn is_retryable(&self, method: &Method, err: &FetchError) -> bool {
        if !self.methods.contains(method) {
            return false;
        }

        match err {
            FetchError::Status(status) => self.statuses.contains(status),
            FetchError::Timeout(_) | FetchError::Connect(_) => true,
            FetchError::Request(_) => false,
        }
    }

    /// Sleep before the given retry (1-based). The first retry is immediate,
    /// later ones wait `factor * 2^(n-1)`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }

        let millis = (self.backoff_factor * 1000.0 * 2f64.powi(retry as i32 - 1)).round();
        Duration::from_millis(millis as u64).min(MAX_BACKOFF)
    }
}

/// Network settings handed to the client constructor.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Skip certificate verification entirely
    pub insecure: bool,
    /// PEM bundle of extra trusted roots (ignored when insecure)
    pub ca_file: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(12),
            retry: RetryPolicy::default(),
            insecure: false,
            ca_file: None,
        }
    }
}

impl TransportConfig {
    /// Derives transport settings from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy {
                max_retries: config.retries,
                backoff_factor: config.backoff_factor,
                ..RetryPolicy::default()
            },
            insecure: config.insecure,
            ca_file: config.ca_file.clone(),
        }
    }
}

/// Aldi HTTP client with browser-like headers and retries.
pub struct AldiClient {
    client: Client,
    retry: RetryPolicy,
}

impl AldiClient {
    /// Creates a client with the given transport settings.
    pub fn new(transport: &TransportConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("de-DE,de;q=0.9,en;q=0.8"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .timeout(transport.timeout);

        if transport.insecure {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        } else if let Some(path) = &transport.ca_file {
            debug!("Loading CA bundle: {}", path.display());
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read CA bundle: {}", path.display()))?;
            let certs = Certificate::from_pem_bundle(&pem)
                .with_context(|| format!("Failed to parse CA bundle: {}", path.display()))?;

            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, retry: transport.retry.clone() })
    }

    /// Sends one request and reads the body.
    async fn attempt(&self, method: Method, url: &str) -> Result<String, FetchError> {
        debug!("{} {}", method, url);

        let response = self.client.request(method, url).send().await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.text().await?)
    }

    /// Sends a request, retrying transient failures per the policy.
    async fn send(&self, method: Method, url: &str) -> Result<String, FetchError> {
        let mut retries = 0;

        loop {
            match self.attempt(method.clone(), url).await {
                Ok(body) => return Ok(body),
                Err(err)
                    if retries < self.retry.max_retries
                        && self.retry.is_retryable(&method, &err) =>
                {
                    retries += 1;
                    let delay = self.retry.backoff(retries);
                    warn!(
                        "{} (retry {}/{} in {:?})",
                        err, retries, self.retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for AldiClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching: {}", url);
        self.send(Method::GET, url).await
    }
}
