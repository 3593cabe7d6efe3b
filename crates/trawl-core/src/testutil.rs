//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::crawl::{CrawlEvent, CrawlReporter};
use crate::error::AppError;
use crate::models::{Algorithm, CacheMetadata, CacheStats, FetchedPage, PageRecord, StoreContents};
use crate::traits::{PageFetcher, PageStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving a fixed site graph from memory.
///
/// URLs without a configured page fail with an HTTP error, mirroring a
/// fetch failure in production.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, FetchedPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: register a page with its content and outbound links.
    pub fn with_page(self, url: &str, content: &str, links: &[&str]) -> Self {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            FetchedPage {
                content: content.to_string(),
                title: String::new(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStoreInner {
    contents: StoreContents,
    puts: Vec<(String, bool)>,
    save_calls: usize,
}

/// In-memory [`PageStore`] that records every call for assertions.
///
/// Does not emulate the disk-backed autosave batching — `puts()` exposes
/// the `auto_persist` flags so engine tests can assert them directly.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record without recording the write.
    pub fn seed(&self, url: &str, content: &str, title: &str, links: &[&str]) {
        self.inner.lock().unwrap().contents.urls.insert(
            url.to_string(),
            PageRecord::new(
                content.to_string(),
                title.to_string(),
                links.iter().map(|l| l.to_string()).collect(),
            ),
        );
    }

    /// Recorded `(url, auto_persist)` pairs, in write order.
    pub fn puts(&self) -> Vec<(String, bool)> {
        self.inner.lock().unwrap().puts.clone()
    }

    pub fn save_calls(&self) -> usize {
        self.inner.lock().unwrap().save_calls
    }

    pub fn metadata(&self) -> CacheMetadata {
        self.inner.lock().unwrap().contents.metadata.clone()
    }
}

impl PageStore for MemoryStore {
    fn get(&self, url: &str) -> Option<PageRecord> {
        self.inner.lock().unwrap().contents.urls.get(url).cloned()
    }

    fn put(&self, url: &str, content: String, title: String, links: Vec<String>, auto_persist: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.puts.push((url.to_string(), auto_persist));
        inner
            .contents
            .urls
            .insert(url.to_string(), PageRecord::new(content, title, links));
    }

    fn save(&self) {
        self.inner.lock().unwrap().save_calls += 1;
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        CacheStats {
            total_urls: inner.contents.urls.len(),
            cache_size_mb: 0.0,
            last_updated: inner.contents.metadata.last_updated,
        }
    }

    fn update_metadata(&self, start_url: &str, algorithm: Algorithm, max_depth: i32) {
        let mut inner = self.inner.lock().unwrap();
        let total_urls = inner.contents.urls.len();
        inner.contents.metadata = CacheMetadata {
            last_updated: Some(Utc::now()),
            start_url: Some(start_url.to_string()),
            algorithm: Some(algorithm),
            max_depth: Some(max_depth),
            total_urls: Some(total_urls),
        };
    }

    fn clear(&self) {
        self.inner.lock().unwrap().contents = StoreContents::default();
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Owned snapshot of a [`CrawlEvent`], recorded by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Processing {
        url: String,
        depth: i32,
        visited_count: usize,
        cache_mode: bool,
    },
    CacheHit {
        url: String,
    },
    Found {
        url: String,
        path: Vec<String>,
        score: f64,
    },
    Complete {
        visited_count: usize,
        all_links_count: usize,
        found_count: usize,
        cache_hits: usize,
        cache_misses: usize,
    },
}

/// Reporter that records every event for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CrawlReporter for RecordingReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        let owned = match event {
            CrawlEvent::Processing {
                url,
                depth,
                visited_count,
                cache_mode,
            } => RecordedEvent::Processing {
                url: url.to_string(),
                depth,
                visited_count,
                cache_mode,
            },
            CrawlEvent::CacheHit { url } => RecordedEvent::CacheHit {
                url: url.to_string(),
            },
            CrawlEvent::Found { url, path, score } => RecordedEvent::Found {
                url: url.to_string(),
                path: path.to_vec(),
                score,
            },
            CrawlEvent::Complete {
                visited_count,
                all_links_count,
                found_count,
                cache_hits,
                cache_misses,
            } => RecordedEvent::Complete {
                visited_count,
                all_links_count,
                found_count,
                cache_hits,
                cache_misses,
            },
        };
        self.events.lock().unwrap().push(owned);
    }
}
