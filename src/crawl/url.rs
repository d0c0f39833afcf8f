// src/crawl/url.rs
// =============================================================================
// This module canonicalizes raw hyperlinks into comparable absolute URLs and
// decides whether a URL belongs to the crawl's target domain.
//
// Normalization rules (applied in order):
// 1. Resolve the raw link against the base URL (handles relative links)
// 2. Strip the fragment (#...) - fragments never affect page identity
// 3. Lowercase scheme and host (the url crate does this during parsing)
// 4. Collapse an empty path to "/"
// 5. Remove trailing slashes from non-root paths ("/a/" == "/a")
// 6. Drop tracking query parameters (utm_*, ref, source) and sort the rest
//
// Two raw strings that normalize identically are the same URL for
// deduplication purposes. The host is kept exactly as written (no "www."
// stripping), so "www.example.com" and "example.com" stay distinct.
//
// Rust concepts:
// - Url: Structured URL parser/builder (replaces regex-based cleanup)
// - Result<T, E>: Malformed links fail with MalformedUrl and are dropped
// =============================================================================

use std::fmt;
use url::Url;

// Query parameters that only exist for analytics and never change the page
// content. Stripping them prevents the same page being visited once per
// campaign link.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "source",
];

// Error returned when a link cannot be turned into a crawlable URL.
//
// This covers unparsable input as well as non-web schemes like mailto:,
// tel:, javascript: and data:. Links that fail normalization are dropped
// silently - they are never fatal to the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedUrl;

impl fmt::Display for MalformedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed or non-http link")
    }
}

impl std::error::Error for MalformedUrl {}

// Normalizes a raw link (possibly relative) against the page it was found on
//
// Parameters:
//   raw: the href value as it appeared in the HTML
//   base: the URL of the page containing the link
//
// Returns: the canonical absolute Url, or MalformedUrl if the link cannot
// be resolved to an http(s) URL
//
// Examples:
//   normalize("/about", "https://example.com/page") -> "https://example.com/about"
//   normalize("docs/#intro", base) -> fragment stripped
//   normalize("mailto:a@b.com", base) -> Err(MalformedUrl)
pub fn normalize(raw: &str, base: &Url) -> Result<Url, MalformedUrl> {
    // join() resolves relative links and passes absolute ones through
    let url = base.join(raw).map_err(|_| MalformedUrl)?;
    canonicalize(url)
}

// Normalizes the crawl's root URL, which has no base to resolve against
pub fn normalize_root(raw: &str) -> Result<Url, MalformedUrl> {
    let url = Url::parse(raw).map_err(|_| MalformedUrl)?;
    canonicalize(url)
}

// Applies the canonicalization rules to an already-absolute URL
fn canonicalize(mut url: Url) -> Result<Url, MalformedUrl> {
    // Only web pages are crawlable; this rejects mailto:, javascript:,
    // tel:, data:, file: and friends
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(MalformedUrl);
    }

    // A URL without a host can't be fetched
    if url.host_str().is_none() {
        return Err(MalformedUrl);
    }

    // Rule 2: fragments never affect identity
    url.set_fragment(None);

    // Rule 6: clean and sort the query so parameter order doesn't create
    // false-distinct URLs
    if url.query().is_some() {
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        pairs.retain(|(key, _)| {
            let key = key.to_ascii_lowercase();
            !TRACKING_PARAMS.contains(&key.as_str())
        });
        pairs.sort();

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }

    // Rules 4 + 5: "/a/" and "/a" are the same page; the root path stays "/"
    // We trim all trailing slashes (not just one) so that normalizing an
    // already-normalized URL is a no-op
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            url.set_path("/");
        } else {
            url.set_path(&trimmed);
        }
    }

    Ok(url)
}

// Decides whether a URL belongs to the crawl's target domain
//
// The comparison is exact (case-insensitive) host equality. Subdomains are
// deliberately out of scope: crawling "example.com" will not wander onto
// "blog.example.com" unless that subdomain is the configured root itself.
pub fn in_scope(url: &Url, root_host: &str) -> bool {
    match url.host_str() {
        Some(host) => host.eq_ignore_ascii_case(root_host),
        None => false,
    }
}
