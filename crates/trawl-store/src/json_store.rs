//! Durable, crash-tolerant JSON-file implementation of [`PageStore`].

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use trawl_core::models::{Algorithm, CacheMetadata, CacheStats, PageRecord, StoreContents};
use trawl_core::traits::PageStore;

/// Every Nth autosave-enabled write triggers a full save. Batching keeps
/// I/O volume down while bounding crash loss to at most N-1 records.
const AUTOSAVE_EVERY: u32 = 5;

struct Inner {
    contents: StoreContents,
    writes_since_load: u32,
}

/// JSON-file-backed page store.
///
/// Clones share the same in-memory state and write counter, so one store
/// can be handed to several runs. Load and save failures are logged and
/// absorbed: the store always stays usable, possibly empty, and the next
/// successful save catches up.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl JsonFileStore {
    /// Open a store backed by `path`, loading any persisted snapshot.
    /// A missing file yields an empty store; a malformed one is logged
    /// and likewise yields an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let contents = Self::load(&path);
        Self {
            path,
            inner: Arc::new(Mutex::new(Inner {
                contents,
                writes_since_load: 0,
            })),
        }
    }

    fn load(path: &PathBuf) -> StoreContents {
        if !path.exists() {
            return StoreContents::default();
        }
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Corrupt cache file, starting empty");
                    StoreContents::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cache file, starting empty");
                StoreContents::default()
            }
        }
    }

    fn save_locked(&self, contents: &StoreContents) {
        match serde_json::to_string_pretty(contents) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to save cache file");
                } else {
                    tracing::debug!(path = %self.path.display(), urls = contents.urls.len(), "Cache saved");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialise cache contents");
            }
        }
    }
}

impl PageStore for JsonFileStore {
    fn get(&self, url: &str) -> Option<PageRecord> {
        self.inner.lock().unwrap().contents.urls.get(url).cloned()
    }

    fn put(&self, url: &str, content: String, title: String, links: Vec<String>, auto_persist: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .contents
            .urls
            .insert(url.to_string(), PageRecord::new(content, title, links));
        if auto_persist {
            inner.writes_since_load += 1;
            if inner.writes_since_load % AUTOSAVE_EVERY == 0 {
                self.save_locked(&inner.contents);
            }
        }
    }

    fn save(&self) {
        let inner = self.inner.lock().unwrap();
        self.save_locked(&inner.contents);
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        let size_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        CacheStats {
            total_urls: inner.contents.urls.len(),
            cache_size_mb: size_bytes as f64 / 1024.0 / 1024.0,
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
        let mut inner = self.inner.lock().unwrap();
        inner.contents = StoreContents::default();
        inner.writes_since_load = 0;
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to delete cache file");
            }
        }
        tracing::info!("Cache cleared");
    }
}
