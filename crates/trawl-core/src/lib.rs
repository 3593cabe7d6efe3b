pub mod crawl;
pub mod error;
pub mod models;
pub mod scorer;
pub mod testutil;
pub mod traits;

pub use crawl::{CrawlConfig, CrawlOutcome, CrawlRequest, CrawlService};
pub use error::AppError;
pub use models::{Algorithm, CacheStats, FetchedPage, PageRecord};
pub use traits::{PageFetcher, PageStore};
