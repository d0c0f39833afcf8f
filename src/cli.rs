// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// sitecrawl has a single job, so there are no subcommands: the root URL is
// a positional argument and everything else is an optional flag.
// =============================================================================

use clap::Parser;

use crate::crawl::USER_AGENT;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "sitecrawl",
    version = "0.1.0",
    about = "Crawl a website within its own domain and map its pages",
    long_about = "sitecrawl starts at a root URL and follows hyperlinks breadth-first, \
                  staying on the root's domain and visiting every page at most once. \
                  It reports each visited page with its depth, title and outgoing links."
)]
pub struct Cli {
    /// Website URL to start crawling from (e.g., https://example.com)
    pub root_url: String,

    /// Maximum crawl depth (0 = just the starting page)
    ///
    /// Depth counts link-hops from the root: depth 1 adds every page the
    /// root links to, depth 2 adds the pages those link to, and so on.
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,

    /// Maximum number of pages to fetch in parallel
    ///
    /// Use --workers 1 for strictly sequential crawling
    #[arg(long, default_value_t = 8)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Stop after visiting this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Follow links onto other domains too
    ///
    /// By default the crawl never leaves the root URL's host
    #[arg(long)]
    pub allow_external: bool,

    /// User-Agent header to send with every request
    #[arg(long, default_value = USER_AGENT)]
    pub user_agent: String,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}
