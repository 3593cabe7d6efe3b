use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Traversal order for a crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Bfs => write!(f, "bfs"),
            Algorithm::Dfs => write!(f, "dfs"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            other => Err(AppError::Generic(format!(
                "unknown algorithm '{other}' (expected 'bfs' or 'dfs')"
            ))),
        }
    }
}

/// One cached page, keyed by its canonical URL in [`StoreContents::urls`].
///
/// `content` and `links` may be overwritten by a later fetch of the same
/// URL — last write wins, no merge.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageRecord {
    /// Cleaned text extracted from the page body.
    pub content: String,
    /// Page title, possibly empty.
    pub title: String,
    /// In-domain URLs discovered on the page, in document order.
    /// Duplicates permitted.
    pub links: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Derived: length of `content` in bytes.
    pub content_length: usize,
}

impl PageRecord {
    pub fn new(content: String, title: String, links: Vec<String>) -> Self {
        let content_length = content.len();
        Self {
            content,
            title,
            links,
            timestamp: Utc::now(),
            content_length,
        }
    }
}

/// Store-wide metadata, replaced wholesale at the end of a fresh-mode run.
///
/// All fields are optional on the wire so an untouched store serialises
/// as `"metadata": {}`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CacheMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_urls: Option<usize>,
}

/// The persisted shape of a page store: `{"urls": {...}, "metadata": {...}}`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct StoreContents {
    #[serde(default)]
    pub urls: HashMap<String, PageRecord>,
    #[serde(default)]
    pub metadata: CacheMetadata,
}

/// Snapshot of store size and freshness, returned by [`crate::traits::PageStore::stats`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub total_urls: usize,
    /// Size of the backing file in megabytes; 0 if no file exists yet.
    pub cache_size_mb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// What the fetcher hands back for one URL: cleaned text, title, and the
/// in-domain links found on the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub content: String,
    pub title: String,
    pub links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_round_trips_through_str() {
        assert_eq!("bfs".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert_eq!("DFS".parse::<Algorithm>().unwrap(), Algorithm::Dfs);
        assert!("best-first".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Bfs.to_string(), "bfs");
    }

    #[test]
    fn page_record_derives_content_length() {
        let rec = PageRecord::new("hello world".into(), "t".into(), vec![]);
        assert_eq!(rec.content_length, 11);
    }

    #[test]
    fn empty_metadata_serialises_as_empty_object() {
        let contents = StoreContents::default();
        let json = serde_json::to_value(&contents).unwrap();
        assert_eq!(json["metadata"], serde_json::json!({}));
        assert_eq!(json["urls"], serde_json::json!({}));
    }

    #[test]
    fn wire_format_field_names() {
        let mut contents = StoreContents::default();
        contents.urls.insert(
            "https://www.ui.ac.id".into(),
            PageRecord::new("body text".into(), "Home".into(), vec!["x".into()]),
        );
        contents.metadata = CacheMetadata {
            last_updated: Some(Utc::now()),
            start_url: Some("https://www.ui.ac.id".into()),
            algorithm: Some(Algorithm::Dfs),
            max_depth: Some(2),
            total_urls: Some(1),
        };

        let json = serde_json::to_value(&contents).unwrap();
        let rec = &json["urls"]["https://www.ui.ac.id"];
        assert!(rec.get("content").is_some());
        assert!(rec.get("title").is_some());
        assert!(rec.get("links").is_some());
        assert!(rec.get("timestamp").is_some());
        assert_eq!(rec["content_length"], 9);

        let meta = &json["metadata"];
        assert!(meta.get("last_updated").is_some());
        assert_eq!(meta["algorithm"], "dfs");
        assert_eq!(meta["max_depth"], 2);
        assert_eq!(meta["total_urls"], 1);
    }
}
