//! HTTP transport for search and lyrics pages.

use crate::config::LyricsConfig;
use crate::error::CoreError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

const LOG_TARGET: &str = "lyricscout::fetcher";

/// How a fetched body is turned into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Parse the body as HTML
    Html,
    /// Parse the body as JSON and coerce it into markup
    Json,
}

/// Errors that can occur while fetching or parsing a page.
///
/// These never reach callers of the lyrics client; the pipeline reports all
/// of them as "not found".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A fetched page body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL after redirects; relative links resolve against it
    pub url: String,
    pub body: String,
}

impl Page {
    #[must_use]
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Transport used by the scrape pipeline
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return its body.
    ///
    /// Network errors, timeouts and non-2xx responses are all errors.
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<Page, FetchError>;
}

/// [`Fetcher`] backed by `reqwest`, applying one user agent and timeout to every request
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given user agent and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Create a fetcher from the `[lyrics]` settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &LyricsConfig) -> Result<Self, CoreError> {
        Self::new(&config.user_agent, config.timeout())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<Page, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(target: LOG_TARGET, "GET {} ({:?})", parsed, mode);

        let mut request = self.client.get(parsed);
        if mode == FetchMode::Json {
            request = request.header(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(target: LOG_TARGET, "Response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(Page {
            url: final_url,
            body,
        })
    }
}
