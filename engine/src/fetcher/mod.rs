//! Raw page content retrieval
//!
//! Used by the step executor when the model says it cannot see the target.
//! Fetch failures never propagate: the failure is described inline and the
//! caller treats that text as page content.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("seocore/", env!("CARGO_PKG_VERSION"));

/// Retrieves textual content for a target
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url`, returning the body or an inline failure marker
    async fn fetch(&self, url: &str) -> String;
}

/// Failure marker returned in place of page content
pub fn fetch_failure_marker(detail: impl std::fmt::Display) -> String {
    format!("[content fetch failed: {}]", detail)
}

/// HTTP fetcher with a bounded per-call timeout
///
/// A fresh `reqwest::Client` is built for every call and dropped when the
/// call returns, so no connection state outlives a fetch.
pub struct HttpContentFetcher {
    timeout: Duration,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(self.timeout)
            .build()?;

        client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl Default for HttpContentFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> String {
        debug!(%url, "fetching raw content");
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!(%url, bytes = body.len(), "fetched raw content");
                body
            }
            Err(e) => {
                warn!(%url, "content fetch failed: {}", e);
                fetch_failure_marker(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_marker_embeds_detail() {
        let marker = fetch_failure_marker("timed out");
        assert_eq!(marker, "[content fetch failed: timed out]");
    }

    #[tokio::test]
    async fn test_invalid_url_yields_marker() {
        let fetcher = HttpContentFetcher::default();
        let body = fetcher.fetch("not a url").await;
        assert!(body.starts_with("[content fetch failed:"));
    }
}
