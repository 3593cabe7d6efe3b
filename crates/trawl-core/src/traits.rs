use std::future::Future;

use crate::error::AppError;
use crate::models::{Algorithm, CacheStats, FetchedPage, PageRecord};

/// Fetches one URL and produces its cleaned content, title, and in-domain
/// links. The only component that performs network I/O.
pub trait PageFetcher: Send + Sync + Clone {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<FetchedPage, AppError>> + Send;
}

/// Durable key-value store of [`PageRecord`]s plus run metadata.
///
/// Clones share the same underlying state, so one store instance can be
/// handed to several runs. Load and save failures are absorbed inside the
/// implementation (logged, never raised): the store always remains usable,
/// possibly empty.
pub trait PageStore: Send + Sync + Clone {
    /// O(1) lookup by canonical URL.
    fn get(&self, url: &str) -> Option<PageRecord>;

    /// Insert or overwrite a record with a fresh timestamp and derived
    /// content length. When `auto_persist` is true, every 5th such write
    /// triggers a full [`save`](Self::save).
    fn put(&self, url: &str, content: String, title: String, links: Vec<String>, auto_persist: bool);

    /// Serialise the entire store to durable storage, overwriting any prior
    /// snapshot.
    fn save(&self);

    fn stats(&self) -> CacheStats;

    /// Replace metadata wholesale, stamping the current instant and URL count.
    fn update_metadata(&self, start_url: &str, algorithm: Algorithm, max_depth: i32);

    /// Reset in-memory contents and delete the backing file if present.
    fn clear(&self);
}
