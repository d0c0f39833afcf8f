// src/crawl/engine.rs
// =============================================================================
// This module drives the depth-bounded traversal.
//
// How it works:
// 1. Seed the frontier with the normalized root URL at depth 0
// 2. Take the whole current wave of frontier entries and process them
//    concurrently (up to `workers` fetches in flight at once)
// 3. Each entry: fetch -> extract links -> normalize -> domain-filter ->
//    mark_if_new -> collect next-depth entries
// 4. Merge the discovered entries into the next wave and repeat
// 5. Stop when the frontier is empty, the page cap is hit, or the crawl
//    is cancelled
//
// Termination is guaranteed: every enqueued entry either increases depth
// (capped at max_depth) or is blocked by the visited set, so the frontier
// is finite and drains in bounded steps.
//
// Processing wave-by-wave keeps depth assignment correct without any
// cross-worker coordination: a URL is always first discovered at the
// lowest depth that can reach it (shortest-path depth).
//
// Rust concepts:
// - buffer_unordered(N): Run up to N futures at once, yield results as
//   they complete
// - Generics: The engine only knows the Fetch trait, so tests swap the
//   network for an in-memory stub
// =============================================================================

use anyhow::Result;
use futures::stream::{self, StreamExt};
use scraper::Html;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

use super::config::{has_excluded_extension, CrawlConfig};
use super::extract;
use super::fetch::{Fetch, FetchError};
use super::url::{in_scope, normalize};
use super::visited::VisitedSet;

// One unit of pending work: a URL and how many hops from the root it was
// discovered at. Created once, consumed once, never mutated.
#[derive(Debug, Clone)]
struct FrontierEntry {
    url: Url,
    depth: usize,
}

// Everything we learned about one visited URL
//
// Exactly one of these is produced per URL per run. fetch_error set means
// the page couldn't be retrieved; links_found is then empty.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// The normalized URL that was visited
    pub url: String,
    /// Link-hops from the root (root is 0)
    pub depth: usize,
    /// Page title, if one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Meta description, if one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Normalized, in-scope links found on the page, in document order
    pub links_found: Vec<String>,
    /// Why the fetch failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<FetchError>,
}

impl CrawlResult {
    /// True if the page was fetched successfully
    pub fn is_ok(&self) -> bool {
        self.fetch_error.is_none()
    }

    // A page that was fetched but yielded no links (non-HTML content)
    fn leaf(entry: FrontierEntry) -> Self {
        Self {
            url: entry.url.to_string(),
            depth: entry.depth,
            title: None,
            description: None,
            links_found: Vec::new(),
            fetch_error: None,
        }
    }

    // A page that couldn't be fetched
    fn failed(entry: FrontierEntry, error: FetchError) -> Self {
        Self {
            url: entry.url.to_string(),
            depth: entry.depth,
            title: None,
            description: None,
            links_found: Vec::new(),
            fetch_error: Some(error),
        }
    }
}

// The crawl orchestrator
//
// Owns the visited set and the frontier; generic over the fetcher so the
// traversal logic is testable without a network.
pub struct Crawler<F> {
    config: CrawlConfig,
    root: Url,
    root_host: String,
    fetcher: F,
    visited: VisitedSet,
    cancelled: Arc<AtomicBool>,
}

impl<F: Fetch> Crawler<F> {
    // Validates the config and prepares a crawler
    //
    // This is the only fallible step: once new() succeeds, run() always
    // completes and returns whatever it managed to crawl.
    pub fn new(config: CrawlConfig, fetcher: F) -> Result<Self> {
        let root = config.validate()?;
        // normalize_root guarantees an http(s) URL, which always has a host
        let root_host = root.host_str().unwrap_or_default().to_string();

        Ok(Self {
            config,
            root,
            root_host,
            fetcher,
            visited: VisitedSet::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    // A handle the caller can set (from a signal handler, a deadline task,
    // ...) to stop the crawl. In-flight fetches finish; nothing new starts.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    // Runs the crawl to completion and returns one result per visited URL
    pub async fn run(&self) -> Vec<CrawlResult> {
        let mut results = Vec::new();

        // Seed: the root is first, so it's marked visited unconditionally
        self.visited.mark_if_new(self.root.as_str());
        let mut frontier = vec![FrontierEntry {
            url: self.root.clone(),
            depth: 0,
        }];
        let mut pages_visited = 0usize;

        while !frontier.is_empty() {
            if self.cancelled.load(Ordering::Relaxed) {
                eprintln!(
                    "  Crawl cancelled, dropping {} pending page(s)",
                    frontier.len()
                );
                break;
            }

            // Honor the page cap by shrinking the wave; entries cut here
            // were already marked visited, which is fine - the set only
            // guards against double visits, not misses
            if let Some(max_pages) = self.config.max_pages {
                frontier.truncate(max_pages.saturating_sub(pages_visited));
                if frontier.is_empty() {
                    break;
                }
            }

            let wave = std::mem::take(&mut frontier);
            pages_visited += wave.len();

            // Process the whole wave with at most `workers` fetches in
            // flight; results come back in completion order
            let outcomes: Vec<(CrawlResult, Vec<FrontierEntry>)> =
                stream::iter(wave.into_iter().map(|entry| self.process_entry(entry)))
                    .buffer_unordered(self.config.workers)
                    .collect()
                    .await;

            for (result, discovered) in outcomes {
                results.push(result);
                if !self.cancelled.load(Ordering::Relaxed) {
                    frontier.extend(discovered);
                }
            }
        }

        results
    }

    // Fetches one frontier entry and turns it into a result plus the
    // next-depth entries it discovered
    async fn process_entry(&self, entry: FrontierEntry) -> (CrawlResult, Vec<FrontierEntry>) {
        println!("  Crawling [depth {}]: {}", entry.depth, entry.url);

        let html = match self.fetcher.fetch(&entry.url).await {
            Ok(Some(html)) => html,
            // Successfully fetched but not HTML: a leaf with no links
            Ok(None) => return (CrawlResult::leaf(entry), Vec::new()),
            Err(error) => {
                eprintln!("  Warning: Failed to fetch {}: {}", entry.url, error);
                return (CrawlResult::failed(entry, error), Vec::new());
            }
        };

        let doc = Html::parse_document(&html);
        let summary = extract::summary(&doc);

        let mut links_found = Vec::new();
        let mut discovered = Vec::new();

        for raw in extract::links(&doc) {
            // Malformed links are dropped silently
            let link = match normalize(&raw, &entry.url) {
                Ok(link) => link,
                Err(_) => continue,
            };

            if self.config.same_domain_only && !in_scope(&link, &self.root_host) {
                continue;
            }

            links_found.push(link.to_string());

            // Links on max-depth pages are recorded but never followed -
            // traversal stops one level before recording does
            if entry.depth >= self.config.max_depth {
                continue;
            }

            // Assets like PDFs and images have no HTML to crawl
            if has_excluded_extension(link.path()) {
                continue;
            }

            // The one synchronized step: whoever wins this check-and-set
            // owns the URL, at the depth it was first discovered
            if self.visited.mark_if_new(link.as_str()) {
                discovered.push(FrontierEntry {
                    url: link,
                    depth: entry.depth + 1,
                });
            }
        }

        let result = CrawlResult {
            url: entry.url.to_string(),
            depth: entry.depth,
            title: summary.title,
            description: summary.description,
            links_found,
            fetch_error: None,
        };

        (result, discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    // In-memory fetcher: maps normalized URL strings to canned outcomes.
    // URLs with no entry answer 404.
    struct StubFetcher {
        pages: HashMap<String, Result<Option<String>, FetchError>>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(Some(html.to_string())));
            self
        }

        fn not_html(mut self, url: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(None));
            self
        }

        fn error(mut self, url: &str, error: FetchError) -> Self {
            self.pages.insert(url.to_string(), Err(error));
            self
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &Url) -> Result<Option<String>, FetchError> {
            match self.pages.get(url.as_str()) {
                Some(outcome) => outcome.clone(),
                None => Err(FetchError::HttpStatus { status: 404 }),
            }
        }
    }

    fn html_with_links(hrefs: &[&str]) -> String {
        hrefs
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect()
    }

    fn crawler(config: CrawlConfig, fetcher: StubFetcher) -> Crawler<StubFetcher> {
        Crawler::new(config, fetcher).unwrap()
    }

    fn find<'a>(results: &'a [CrawlResult], url: &str) -> &'a CrawlResult {
        results
            .iter()
            .find(|r| r.url == url)
            .unwrap_or_else(|| panic!("no result for {}", url))
    }

    #[tokio::test]
    async fn test_depth_zero_crawls_only_the_root() {
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/about"]));
        let crawler = crawler(CrawlConfig::new("http://example.com", 0), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "http://example.com/");
        assert_eq!(results[0].depth, 0);
        // The link is still recorded even though it was never followed
        assert_eq!(results[0].links_found, vec!["http://example.com/about"]);
    }

    #[tokio::test]
    async fn test_same_domain_crawl_excludes_external_links() {
        let fetcher = StubFetcher::new()
            .page(
                "http://example.com/",
                &html_with_links(&["/about", "http://external.com/"]),
            )
            .page("http://example.com/about", "<h1>About us</h1>");
        let crawler = crawler(CrawlConfig::new("http://example.com/", 1), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 2);

        let root = find(&results, "http://example.com/");
        assert_eq!(root.depth, 0);
        assert_eq!(root.links_found, vec!["http://example.com/about"]);

        let about = find(&results, "http://example.com/about");
        assert_eq!(about.depth, 1);
        assert_eq!(about.title.as_deref(), Some("About us"));
    }

    #[tokio::test]
    async fn test_self_link_visited_once() {
        // The root links to itself; without dedup this would loop forever
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/"]));
        let crawler = crawler(CrawlConfig::new("http://example.com", 3), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].links_found, vec!["http://example.com/"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_recorded_and_crawl_continues() {
        let fetcher = StubFetcher::new()
            .page(
                "http://example.com/",
                &html_with_links(&["/broken", "/ok"]),
            )
            .error(
                "http://example.com/broken",
                FetchError::HttpStatus { status: 500 },
            )
            .page("http://example.com/ok", "<h1>Fine</h1>");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 3);

        let broken = find(&results, "http://example.com/broken");
        assert_eq!(
            broken.fetch_error,
            Some(FetchError::HttpStatus { status: 500 })
        );
        assert!(broken.links_found.is_empty());

        assert!(find(&results, "http://example.com/ok").is_ok());
    }

    #[tokio::test]
    async fn test_equivalent_urls_visited_once() {
        // "/a/", "/a" and "/a#top" normalize identically, so the page is
        // fetched once no matter how it's written
        let fetcher = StubFetcher::new()
            .page(
                "http://example.com/",
                &html_with_links(&["/a/", "/a", "/a#top"]),
            )
            .page("http://example.com/a", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 2);
        // links_found is not deduplicated: the page really has three anchors
        assert_eq!(
            find(&results, "http://example.com/").links_found.len(),
            3
        );
    }

    #[tokio::test]
    async fn test_no_url_appears_twice_in_results() {
        // Diamond: root -> a, b; both a and b -> c
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/a", "/b"]))
            .page("http://example.com/a", &html_with_links(&["/c"]))
            .page("http://example.com/b", &html_with_links(&["/c"]))
            .page("http://example.com/c", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 2), fetcher);

        let results = crawler.run().await;

        let unique: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(unique.len(), results.len());
        assert_eq!(results.len(), 4);
        // c was reachable via two paths of equal length; depth is 2 either way
        assert_eq!(find(&results, "http://example.com/c").depth, 2);
    }

    #[tokio::test]
    async fn test_depth_never_exceeds_max_depth() {
        // Chain: root -> a -> b -> c, cut off at depth 2
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/a"]))
            .page("http://example.com/a", &html_with_links(&["/b"]))
            .page("http://example.com/b", &html_with_links(&["/c"]))
            .page("http://example.com/c", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 2), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.depth <= 2));
        assert!(results.iter().all(|r| r.url != "http://example.com/c"));
        // The depth-2 page still reports the link it couldn't follow
        assert_eq!(
            find(&results, "http://example.com/b").links_found,
            vec!["http://example.com/c"]
        );
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_crawl() {
        let fetcher = StubFetcher::new()
            .page(
                "http://example.com/",
                &html_with_links(&["/a", "/b", "/c", "/d"]),
            )
            .page("http://example.com/a", "")
            .page("http://example.com/b", "")
            .page("http://example.com/c", "")
            .page("http://example.com/d", "");
        let mut config = CrawlConfig::new("http://example.com", 1);
        config.max_pages = Some(3);
        let crawler = crawler(config, fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_excluded_extensions_recorded_but_not_fetched() {
        let fetcher = StubFetcher::new().page(
            "http://example.com/",
            &html_with_links(&["/report.pdf", "/about"]),
        )
        .page("http://example.com/about", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 2);
        assert_eq!(
            find(&results, "http://example.com/").links_found,
            vec!["http://example.com/report.pdf", "http://example.com/about"]
        );
    }

    #[tokio::test]
    async fn test_non_html_response_is_a_leaf() {
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/feed"]))
            .not_html("http://example.com/feed");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        let results = crawler.run().await;

        let feed = find(&results, "http://example.com/feed");
        assert!(feed.is_ok());
        assert!(feed.links_found.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_links_dropped_silently() {
        let fetcher = StubFetcher::new().page(
            "http://example.com/",
            &html_with_links(&["mailto:a@b.com", "javascript:void(0)", "/real"]),
        )
        .page("http://example.com/real", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 2);
        assert_eq!(
            find(&results, "http://example.com/").links_found,
            vec!["http://example.com/real"]
        );
    }

    #[tokio::test]
    async fn test_external_links_followed_when_scope_disabled() {
        let fetcher = StubFetcher::new()
            .page(
                "http://example.com/",
                &html_with_links(&["http://external.com/"]),
            )
            .page("http://external.com/", "");
        let mut config = CrawlConfig::new("http://example.com", 1);
        config.same_domain_only = false;
        let crawler = crawler(config, fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 2);
        assert_eq!(find(&results, "http://external.com/").depth, 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_new_work() {
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/a"]))
            .page("http://example.com/a", "");
        let crawler = crawler(CrawlConfig::new("http://example.com", 1), fetcher);

        crawler.cancel_flag().store(true, Ordering::Relaxed);
        let results = crawler.run().await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_mode_with_one_worker() {
        let fetcher = StubFetcher::new()
            .page("http://example.com/", &html_with_links(&["/a", "/b"]))
            .page("http://example.com/a", "")
            .page("http://example.com/b", "");
        let mut config = CrawlConfig::new("http://example.com", 1);
        config.workers = 1;
        let crawler = crawler(config, fetcher);

        let results = crawler.run().await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].url, "http://example.com/");
    }
}
