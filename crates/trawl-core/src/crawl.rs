//! The traversal engine: BFS/DFS exploration of a site's link graph with
//! cache-first page resolution, keyword relevance scoring, and progress
//! events.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::models::{Algorithm, CacheStats, FetchedPage};
use crate::scorer::RelevanceScorer;
use crate::traits::{PageFetcher, PageStore};

/// Engine-level knobs. The defaults target the site the crawler was built
/// for; tests override them freely.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Base URL prefix subject to the English-locale rewrite.
    pub site_base: String,
    /// English-locale equivalent of `site_base`.
    pub english_base: String,
    /// Pause after each genuine network fetch. Cache hits incur no pause.
    pub fetch_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            site_base: "https://www.ui.ac.id".to_string(),
            english_base: "https://www.ui.ac.id/en".to_string(),
            fetch_delay: Duration::from_millis(200),
        }
    }
}

impl CrawlConfig {
    /// Canonical form of a URL: with the English flag set, the site base
    /// prefix is rewritten to its English-locale equivalent. Idempotent —
    /// an already-English URL is left alone. The canonical form is the key
    /// used everywhere: cache, visited set, and result sets.
    pub fn canonical_url(&self, url: &str, english: bool) -> String {
        if !english {
            return url.to_string();
        }
        let Some(rest) = url.strip_prefix(&self.site_base) else {
            return url.to_string();
        };
        let en_path = &self.english_base[self.site_base.len()..];
        if rest == en_path || rest.starts_with(&format!("{en_path}/")) {
            return url.to_string();
        }
        format!("{}{}", self.english_base, rest)
    }
}

/// Parameters for one traversal run.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub start_url: String,
    /// Maximum traversal depth; `-1` means unbounded.
    pub max_depth: i32,
    /// Keyword to score pages against. Empty or whitespace-only disables
    /// scoring entirely.
    pub keyword: String,
    pub english_locale: bool,
    pub algorithm: Algorithm,
    /// Cache mode: consult the store before the network. Fresh mode always
    /// fetches and persists everything at the end of the run.
    pub use_cache: bool,
}

/// Aggregate result of one traversal run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CrawlOutcome {
    /// Every in-domain link discovered during expansion, sorted and
    /// deduplicated.
    pub all_links: Vec<String>,
    /// Matched URLs sorted by similarity score descending; ties keep
    /// discovery order.
    pub found_urls: Vec<String>,
    pub search_log: Vec<String>,
    /// Matched URL -> discovery path from the seed to it, inclusive.
    pub path_info: HashMap<String, Vec<String>>,
    pub similarity_scores: HashMap<String, f64>,
    pub visited_count: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_stats: CacheStats,
}

/// Events emitted by the engine during a run, in processing order.
#[derive(Debug, Clone)]
pub enum CrawlEvent<'a> {
    Processing {
        url: &'a str,
        depth: i32,
        visited_count: usize,
        cache_mode: bool,
    },
    CacheHit {
        url: &'a str,
    },
    Found {
        url: &'a str,
        path: &'a [String],
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

/// Trait for receiving crawl events (decoupled progress reporting).
///
/// The engine invokes `report` inline and waits for it to return before
/// continuing, so implementations must not block indefinitely.
pub trait CrawlReporter: Send + Sync {
    fn report(&self, event: CrawlEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl CrawlReporter for NullReporter {}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl CrawlReporter for TracingReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::Processing {
                url,
                depth,
                visited_count,
                cache_mode,
            } => {
                tracing::info!(%url, depth, visited_count, cache_mode, "Visiting");
            }
            CrawlEvent::CacheHit { url } => {
                tracing::info!(%url, "Cache hit");
            }
            CrawlEvent::Found { url, path, score } => {
                tracing::info!(%url, score, path = %path.join(" -> "), "Keyword found");
            }
            CrawlEvent::Complete {
                visited_count,
                all_links_count,
                found_count,
                cache_hits,
                cache_misses,
            } => {
                tracing::info!(
                    visited_count,
                    all_links_count,
                    found_count,
                    cache_hits,
                    cache_misses,
                    "Crawl complete"
                );
            }
        }
    }
}

/// One discovered-but-not-yet-processed node.
#[derive(Debug, Clone)]
struct Entry {
    url: String,
    depth: i32,
    /// URLs from the seed up to (excluding) this node.
    path: Vec<String>,
}

/// The frontier: FIFO queue for BFS, LIFO stack for DFS.
///
/// Entries are not deduplicated against each other — the same URL may sit
/// in the frontier more than once. The dequeue-time visited check still
/// guarantees each URL is processed exactly once.
enum Frontier {
    Fifo(VecDeque<Entry>),
    Lifo(Vec<Entry>),
}

impl Frontier {
    fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bfs => Frontier::Fifo(VecDeque::new()),
            Algorithm::Dfs => Frontier::Lifo(Vec::new()),
        }
    }

    fn pop(&mut self) -> Option<Entry> {
        match self {
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
        }
    }

    /// Add a node's children, given in document order. The stack pushes
    /// them reversed so LIFO popping explores them left to right.
    fn push_children(&mut self, children: Vec<Entry>) {
        match self {
            Frontier::Fifo(queue) => queue.extend(children),
            Frontier::Lifo(stack) => stack.extend(children.into_iter().rev()),
        }
    }
}

/// Drives a BFS or DFS exploration rooted at the seed URL, consulting the
/// store before the fetcher, scoring pages against the keyword, and
/// tracking visitation, paths, and statistics.
///
/// Generic over the fetcher and store via traits, enabling dependency
/// injection and testability without real HTTP or disk I/O.
pub struct CrawlService<F, S>
where
    F: PageFetcher,
    S: PageStore,
{
    fetcher: F,
    store: S,
    scorer: RelevanceScorer,
    config: CrawlConfig,
}

impl<F, S> CrawlService<F, S>
where
    F: PageFetcher,
    S: PageStore,
{
    pub fn new(fetcher: F, store: S) -> Self {
        Self::with_config(fetcher, store, CrawlConfig::default())
    }

    pub fn with_config(fetcher: F, store: S, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            store,
            scorer: RelevanceScorer::new(),
            config,
        }
    }

    /// Run one traversal to completion. Never fails: fetch errors degrade
    /// the affected node to an empty page and the run continues.
    pub async fn run<R: CrawlReporter>(&self, request: &CrawlRequest, reporter: &R) -> CrawlOutcome {
        let mut visited: HashSet<String> = HashSet::new();
        let mut all_links: BTreeSet<String> = BTreeSet::new();
        let mut found: Vec<(String, f64)> = Vec::new();
        let mut path_info: HashMap<String, Vec<String>> = HashMap::new();
        let mut similarity_scores: HashMap<String, f64> = HashMap::new();
        let mut search_log: Vec<String> = Vec::new();
        let mut visited_count = 0usize;
        let mut cache_hits = 0usize;
        let mut cache_misses = 0usize;

        let seed = self
            .config
            .canonical_url(&request.start_url, request.english_locale);

        let mode = if request.use_cache {
            "CACHE MODE"
        } else {
            "FRESH MODE"
        };
        search_log.push(format!(
            "[{mode}] Starting {} crawling from {seed}",
            request.algorithm.to_string().to_uppercase()
        ));

        let mut frontier = Frontier::new(request.algorithm);
        frontier.push_children(vec![Entry {
            url: seed.clone(),
            depth: 0,
            path: Vec::new(),
        }]);

        while let Some(Entry { url, depth, path }) = frontier.pop() {
            // Bound enforced at dequeue time: out-of-depth entries may sit
            // in the frontier, they are just never processed.
            if request.max_depth != -1 && depth > request.max_depth {
                continue;
            }
            if !visited.insert(url.clone()) {
                continue;
            }
            visited_count += 1;

            search_log.push(format!("Visiting (Depth {depth}): {url}"));
            reporter.report(CrawlEvent::Processing {
                url: &url,
                depth,
                visited_count,
                cache_mode: request.use_cache,
            });

            let (page, fetched) = self
                .resolve(
                    &url,
                    request.use_cache,
                    &mut cache_hits,
                    &mut cache_misses,
                    reporter,
                )
                .await;

            if !request.keyword.trim().is_empty() {
                let relevance = self.scorer.evaluate(&page.content, &request.keyword);
                if relevance.relevant {
                    let mut full_path = path.clone();
                    full_path.push(url.clone());
                    search_log.push(format!("Keyword '{}' found at: {url}", request.keyword));
                    search_log.push(format!("Path to keyword: {}", full_path.join(" -> ")));
                    reporter.report(CrawlEvent::Found {
                        url: &url,
                        path: &full_path,
                        score: relevance.score,
                    });
                    found.push((url.clone(), relevance.score));
                    similarity_scores.insert(url.clone(), relevance.score);
                    path_info.insert(url.clone(), full_path);
                }
            }

            // Expand only when the children would still be within the
            // bound; at max_depth = 0 the seed's links are not even
            // collected.
            if request.max_depth == -1 || depth < request.max_depth {
                let mut child_path = path;
                child_path.push(url.clone());
                let mut children = Vec::new();
                for link in &page.links {
                    let link = self
                        .config
                        .canonical_url(link, request.english_locale);
                    all_links.insert(link.clone());
                    if !visited.contains(&link) {
                        children.push(Entry {
                            url: link,
                            depth: depth + 1,
                            path: child_path.clone(),
                        });
                    }
                }
                frontier.push_children(children);
            }

            if fetched && !self.config.fetch_delay.is_zero() {
                tokio::time::sleep(self.config.fetch_delay).await;
            }
        }

        // Fresh mode stamps the metadata and forces a final full save so
        // the last sub-batch of autosaved writes is not lost.
        if !request.use_cache {
            self.store
                .update_metadata(&seed, request.algorithm, request.max_depth);
            self.store.save();
        }

        found.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let found_urls: Vec<String> = found.into_iter().map(|(url, _)| url).collect();

        reporter.report(CrawlEvent::Complete {
            visited_count,
            all_links_count: all_links.len(),
            found_count: found_urls.len(),
            cache_hits,
            cache_misses,
        });

        CrawlOutcome {
            all_links: all_links.into_iter().collect(),
            found_urls,
            search_log,
            path_info,
            similarity_scores,
            visited_count,
            cache_hits,
            cache_misses,
            cache_stats: self.store.stats(),
        }
    }

    /// Resolve one page: store first in cache mode, network otherwise.
    /// Returns the page and whether a network fetch was attempted.
    async fn resolve<R: CrawlReporter>(
        &self,
        url: &str,
        use_cache: bool,
        cache_hits: &mut usize,
        cache_misses: &mut usize,
        reporter: &R,
    ) -> (FetchedPage, bool) {
        if use_cache {
            if let Some(record) = self.store.get(url) {
                *cache_hits += 1;
                reporter.report(CrawlEvent::CacheHit { url });
                return (
                    FetchedPage {
                        content: record.content,
                        title: record.title,
                        links: record.links,
                    },
                    false,
                );
            }
        }

        *cache_misses += 1;
        match self.fetcher.fetch_page(url).await {
            Ok(page) => {
                // A miss populates the store even inside a cache-mode run,
                // but only fresh mode autosaves to disk.
                self.store.put(
                    url,
                    page.content.clone(),
                    page.title.clone(),
                    page.links.clone(),
                    !use_cache,
                );
                (page, true)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Fetch failed, degrading to empty page");
                (FetchedPage::default(), true)
            }
        }
    }
}
