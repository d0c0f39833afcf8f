// src/crawl/extract.rs
// =============================================================================
// This module pulls candidate hyperlinks and light metadata out of parsed HTML.
//
// Important contract: links() returns raw href values in document order and
// does NOT deduplicate or resolve them. Deduplication belongs to the visited
// set and resolution to the normalizer - keeping those concerns out of here
// means the extractor can never accidentally hide a link from the reporter.
//
// Malformed or empty documents simply yield nothing; html5ever (underneath
// scraper) parses anything a browser would, so there is no failure path.
//
// Rust concepts:
// - CSS selectors: "a[href]" finds every anchor that can be followed
// - Iterators: Element matches stream out in document order
// =============================================================================

use scraper::{Html, Selector};

// Light structured content lifted from a page, carried on the crawl result
// for the reporting layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub description: Option<String>,
}

// Extracts all raw href values from anchor elements, in document order
//
// Parameters:
//   doc: a parsed HTML document (parse once, extract many times)
//
// Returns: the href strings exactly as written - relative, absolute,
// mailto:, whatever. Filtering happens downstream.
pub fn links(doc: &Html) -> Vec<String> {
    // This selector is a constant and known to be valid, so unwrap is safe
    let selector = Selector::parse("a[href]").unwrap();

    doc.select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

// Extracts the page title and meta description
//
// Title: first <h1> with text, falling back to the <title> element.
// Description: <meta name="description">, falling back to Open Graph's
// og:description.
pub fn summary(doc: &Html) -> PageSummary {
    PageSummary {
        title: first_text(doc, "h1").or_else(|| first_text(doc, "title")),
        description: meta_content(doc, r#"meta[name="description"]"#)
            .or_else(|| meta_content(doc, r#"meta[property="og:description"]"#)),
    }
}

// Text of the first matching element, if it has any
fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();

    doc.select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

// content attribute of the first matching <meta> element
fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();

    doc.select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}
