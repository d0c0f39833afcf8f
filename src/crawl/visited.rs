// src/crawl/visited.rs
// =============================================================================
// This module tracks which normalized URLs have already been scheduled.
//
// The whole deduplication story of the crawler goes through one operation:
// mark_if_new(). It atomically checks membership and inserts in a single
// step, so two workers discovering the same URL at the same time can never
// both enqueue it. The set only ever grows during a crawl run.
//
// Rust concepts:
// - HashSet: O(1) membership checks keyed by the normalized URL string
// - Mutex: One lock guards the check-and-set so it stays atomic under
//   concurrent workers
// =============================================================================

use std::collections::HashSet;
use std::sync::Mutex;

// Set of URLs that have been scheduled for crawling (or already crawled)
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Records the URL if it has not been seen before
    //
    // Returns true iff the URL was new. Callers must treat a false return
    // as "someone else owns this URL" and do nothing further with it.
    //
    // The lock is held only for the duration of one HashSet::insert, never
    // across an await point.
    pub fn mark_if_new(&self, url: &str) -> bool {
        let mut set = self.inner.lock().expect("visited set lock poisoned");
        set.insert(url.to_string())
    }

    // Number of URLs scheduled so far
    pub fn len(&self) -> usize {
        let set = self.inner.lock().expect("visited set lock poisoned");
        set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
