// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Submodules, leaf-first:
// - url: URL normalization and the domain filter
// - visited: at-most-once visitation via an atomic check-and-set
// - fetch: HTTP page retrieval behind the Fetch trait
// - extract: link and metadata extraction from parsed HTML
// - config: crawl configuration and startup validation
// - engine: the orchestrator tying it all together
//
// This file (mod.rs) is the module root - it exports the public API that
// the CLI shell uses.
// =============================================================================

mod config;
mod engine;
mod extract;
mod fetch;
mod url;
mod visited;

// Re-export public items from submodules so callers write crawl::Crawler
// instead of crawl::engine::Crawler
pub use config::{CrawlConfig, USER_AGENT};
pub use engine::{CrawlResult, Crawler};
pub use fetch::{Fetch, FetchError, HttpFetcher};
