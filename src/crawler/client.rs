//! Blocking HTTP page fetcher shared by every crawl worker.

use crate::crawler::error::CrawlError;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; booksoup/0.1; +https://github.com/booksoup)";
/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Retrieves the raw markup of a page.
///
/// Implementations must be `Sync`: the concurrent coordinator shares one
/// fetcher between all of its workers.
pub trait Fetch: Sync {
    fn fetch(&self, url: &str) -> Result<String, CrawlError>;
}

/// Blocking HTTP client. One GET per call; no retries.
#[derive(Debug, Clone)]
pub struct PageClient {
    inner: reqwest::blocking::Client,
}

impl PageClient {
    /// Builder for custom User-Agent and/or timeout.
    pub fn builder() -> PageClientBuilder {
        PageClientBuilder::default()
    }
}

impl Fetch for PageClient {
    fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        debug!("GET {}", url);
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| CrawlError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().map_err(|e| CrawlError::BodyRead {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Builder for PageClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct PageClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for PageClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PageClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the per-request deadline in seconds. Default 30; 0 disables it.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<PageClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        builder = if self.timeout_secs == 0 {
            builder.timeout(None)
        } else {
            builder.timeout(Duration::from_secs(self.timeout_secs))
        };
        Ok(PageClient {
            inner: builder.build()?,
        })
    }
}
