// src/crawl/config.rs
// =============================================================================
// This module holds the crawl configuration and validates it before any
// network traffic happens.
//
// Validation failures here are the only fatal errors in the whole program:
// a bad root URL or a zero-sized worker pool means the crawl never starts.
// Everything after startup is contained per-URL.
// =============================================================================

use anyhow::{anyhow, Result};
use std::time::Duration;
use url::Url;

use super::url::normalize_root;

// How the crawler identifies itself to servers
pub const USER_AGENT: &str = "sitecrawl/0.1 (+https://github.com/sitecrawl/sitecrawl)";

// Links whose path ends in one of these are recorded but never fetched -
// there is no HTML behind them to crawl
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".mp3", ".mp4",
    ".avi", ".zip", ".gz", ".tar", ".exe", ".css", ".js",
];

// Configuration for one crawl run
//
// Immutable once the crawl starts; shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts
    pub root_url: String,
    /// Maximum link-hops from the root (0 = just the root page)
    pub max_depth: usize,
    /// Restrict the crawl to the root's host (default true)
    pub same_domain_only: bool,
    /// Maximum number of in-flight fetches (1 = sequential)
    pub workers: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional cap on the total number of pages visited
    pub max_pages: Option<usize>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl CrawlConfig {
    // A config with sensible defaults for everything but the root and depth
    pub fn new(root_url: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root_url: root_url.into(),
            max_depth,
            same_domain_only: true,
            workers: 8,
            timeout: Duration::from_secs(10),
            max_pages: None,
            user_agent: USER_AGENT.to_string(),
        }
    }

    // Validates the config and returns the normalized root URL
    //
    // Called once before the crawl begins; any error here is fatal.
    pub fn validate(&self) -> Result<Url> {
        let root = normalize_root(&self.root_url)
            .map_err(|e| anyhow!("Invalid root URL '{}': {}", self.root_url, e))?;

        if self.workers == 0 {
            return Err(anyhow!("Worker count must be at least 1"));
        }

        if let Some(0) = self.max_pages {
            return Err(anyhow!("Page limit must be at least 1"));
        }

        Ok(root)
    }
}

// Checks whether a path points at a non-HTML asset we should never fetch
pub fn has_excluded_extension(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
