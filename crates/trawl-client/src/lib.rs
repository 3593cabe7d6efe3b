pub mod fetcher;
pub mod parser;

pub use fetcher::HttpFetcher;
pub use parser::parse_page;
