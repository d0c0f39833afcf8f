// src/crawl/fetch.rs
// =============================================================================
// This module retrieves raw HTML for a URL over the network.
//
// Key points:
// - One reqwest::Client is shared across the whole crawl (connection pooling)
// - Every request carries a timeout so one dead host can't stall a worker
// - Only text/html responses are handed to the parser; other content types
//   (PDFs, images, JSON APIs) are treated as leaf pages with zero links
// - Failures are values, not panics: they end up on the CrawlResult and the
//   crawl moves on
//
// The Fetch trait is the seam between the network and the traversal logic.
// The orchestrator is generic over it, which is what lets the engine tests
// run against an in-memory stub instead of a live server.
//
// Rust concepts:
// - Traits: The orchestrator only knows about Fetch, not reqwest
// - Enums: FetchError models the distinct page-level failure modes
// =============================================================================

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

// A page-level fetch failure
//
// All of these are non-fatal: they are recorded on the result for the URL
// and the crawl continues with the rest of the frontier.
//
// #[derive(Serialize, Deserialize)] lets us include the error in --json output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// Connection failed, DNS failed, redirect loop, body read failed, ...
    Network { message: String },
    /// The request exceeded the configured timeout
    Timeout,
    /// The server answered with a non-2xx status code
    HttpStatus { status: u16 },
}

impl FetchError {
    // Maps a reqwest error onto our error kinds
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network {
                message: error.to_string(),
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network { message } => write!(f, "network error: {}", message),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::HttpStatus { status } => write!(f, "HTTP {}", status),
        }
    }
}

// Retrieves page content for the orchestrator
//
// Returns:
//   Ok(Some(html)) - a 2xx HTML response body
//   Ok(None)       - a 2xx response that isn't text/html (nothing to parse)
//   Err(..)        - network/timeout/status failure, recorded per-URL
// The engine never spawns fetch futures onto other threads, so the
// auto-trait caveat behind this lint doesn't apply here
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &Url) -> Result<Option<String>, FetchError>;
}

// The production fetcher: plain HTTP GET via reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds a fetcher with a shared client
    //
    // Parameters:
    //   timeout: per-request timeout (covers connect + response)
    //   user_agent: identifies the crawler to servers
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Option<String>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        // Only HTML gets parsed for links. A missing Content-Type header is
        // treated as non-HTML rather than guessing at the body
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            return Ok(None);
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FetchError::HttpStatus { status: 500 }.to_string(),
            "HTTP 500"
        );
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(FetchError::HttpStatus { status: 404 }).unwrap();
        assert_eq!(json["kind"], "http_status");
        assert_eq!(json["status"], 404);

        let json = serde_json::to_value(FetchError::Timeout).unwrap();
        assert_eq!(json["kind"], "timeout");
    }

    #[test]
    fn test_build_fetcher() {
        let fetcher = HttpFetcher::new(Duration::from_secs(10), "sitecrawl-test/0.1");
        assert!(fetcher.is_ok());
    }
}
