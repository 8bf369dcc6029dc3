//! HTTP client for page retrieval with redirect handling and pacing
//!
//! Redirects are not followed by reqwest; the attempt loop sees every 3xx,
//! re-targets the request at the `Location`, and spends one attempt per hop.
//! A chain longer than the attempt budget ends in
//! [`FetchError::RedirectExhausted`] rather than empty content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, info};
use url::Url;

use crate::infrastructure::config::{AppConfig, defaults};
use crate::infrastructure::crawler::PageSource;
use crate::infrastructure::fetch_error::FetchError;
use crate::infrastructure::pacing::PacingPolicy;

/// One page request: target, attempt budget, per-attempt timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: Url,
    max_attempts: u32,
    timeout: Duration,
}

impl FetchRequest {
    /// Request with the default budget of 2 attempts and a 7 second timeout
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|e| FetchError::invalid_request(format!("'{url}' is not an absolute URL: {e}")))?;
        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(FetchError::invalid_request(format!(
                "'{url}' has no host"
            )));
        }

        Ok(Self {
            url: parsed,
            max_attempts: defaults::MAX_ATTEMPTS,
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECONDS),
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self, FetchError> {
        if max_attempts == 0 {
            return Err(FetchError::invalid_request("max_attempts must be at least 1"));
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, FetchError> {
        if timeout.is_zero() {
            return Err(FetchError::invalid_request("timeout must be greater than 0"));
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// HTTP client configuration for page fetching
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Attempt budget used by [`HttpClient::fetch_url`]
    pub max_attempts: u32,
    /// Timeout used by [`HttpClient::fetch_url`]
    pub timeout_seconds: u64,
    pub pacing: PacingPolicy,
}

impl HttpClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.fetch.user_agent.clone(),
            max_attempts: config.fetch.max_attempts,
            timeout_seconds: config.fetch.timeout_seconds,
            pacing: config.pacing.policy(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            max_attempts: defaults::MAX_ATTEMPTS,
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            pacing: PacingPolicy::default(),
        }
    }
}

/// Outcome of one attempt
enum Attempt {
    Body(String),
    Redirect(Url),
}

/// Page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Client(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::from_app_config(config))
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch `url` with the configured attempt budget and timeout
    pub async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        let request = FetchRequest::new(url)?
            .with_max_attempts(self.config.max_attempts)?
            .with_timeout(Duration::from_secs(self.config.timeout_seconds))?;
        self.fetch(&request).await
    }

    /// Fetch the page body, following redirects within the attempt budget
    ///
    /// Any non-success, non-redirect status, timeout, or transport failure ends
    /// the fetch immediately; only redirects continue the loop.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        self.config.pacing.wait_before_fetch().await;

        let mut url = request.url().clone();
        for attempt in 1..=request.max_attempts() {
            debug!("GET {} (attempt {}/{})", url, attempt, request.max_attempts());
            match self.attempt(&url, request.timeout()).await? {
                Attempt::Body(text) => {
                    debug!("Fetched {} ({} chars)", url, text.len());
                    return Ok(text);
                }
                Attempt::Redirect(next) => {
                    info!("Redirecting to: {}", next);
                    url = next;
                }
            }
        }

        error!(
            "Redirect chain from {} still unresolved after {} attempts",
            request.url(),
            request.max_attempts()
        );
        Err(FetchError::RedirectExhausted {
            url: url.to_string(),
            attempts: request.max_attempts(),
        })
    }

    async fn attempt(&self, url: &Url, timeout: Duration) -> Result<Attempt, FetchError> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;

        let status = response.status();
        if is_followed_redirect(status) {
            return redirect_target(url, &response).map(Attempt::Redirect);
        }

        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), &e))?;
        Ok(Attempt::Body(text))
    }
}

/// Statuses that move the resource; 300 and 304 are answered like any other status
fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Absolute redirect destination from the `Location` header
fn redirect_target(current: &Url, response: &Response) -> Result<Url, FetchError> {
    let invalid = |status: StatusCode| FetchError::InvalidRedirect {
        url: current.to_string(),
        status: status.as_u16(),
    };

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| invalid(response.status()))?;

    current.join(location).map_err(|_| invalid(response.status()))
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_url(url).await
    }
}
