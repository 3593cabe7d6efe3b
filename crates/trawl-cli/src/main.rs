use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trawl_client::HttpFetcher;
use trawl_core::crawl::{CrawlConfig, CrawlRequest, CrawlService, TracingReporter};
use trawl_core::models::Algorithm;
use trawl_core::traits::PageStore;
use trawl_store::JsonFileStore;

#[derive(Parser)]
#[command(name = "trawl", version, about = "Keyword-guided site crawler with a durable page cache")]
struct Cli {
    /// Path of the JSON cache file
    #[arg(
        long,
        global = true,
        env = "TRAWL_CACHE_FILE",
        default_value = "crawl_cache.json"
    )]
    cache_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl a site from a seed URL, scoring pages against a keyword
    Crawl {
        /// Seed URL to start from
        #[arg(short, long, default_value = "https://www.ui.ac.id")]
        start_url: String,

        /// Maximum traversal depth; -1 means unbounded
        #[arg(short = 'd', long, default_value_t = -1, allow_hyphen_values = true)]
        max_depth: i32,

        /// Keyword to score pages against; empty disables scoring
        #[arg(short, long, default_value = "")]
        keyword: String,

        /// Rewrite seed and discovered links to the English locale
        #[arg(long, default_value_t = false)]
        english: bool,

        /// Traversal order: bfs or dfs
        #[arg(short, long, default_value = "bfs")]
        algorithm: Algorithm,

        /// Cache mode: consult the cache before the network. Without this
        /// flag the run fetches fresh and persists everything at the end.
        #[arg(long, default_value_t = false)]
        cached: bool,

        /// Substring an anchor target must contain to count as in-domain
        #[arg(long, env = "TRAWL_DOMAIN_MARKER", default_value = "ui.ac.id")]
        domain_marker: String,

        /// Pause after each network fetch, in milliseconds
        #[arg(long, default_value_t = 200)]
        fetch_delay_ms: u64,
    },

    /// Show cache statistics
    Stats,

    /// Delete all cached pages and metadata
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trawl=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = JsonFileStore::new(&cli.cache_file);

    match cli.command {
        Commands::Crawl {
            start_url,
            max_depth,
            keyword,
            english,
            algorithm,
            cached,
            domain_marker,
            fetch_delay_ms,
        } => {
            let fetcher = HttpFetcher::new(&domain_marker)?;
            let config = CrawlConfig {
                fetch_delay: Duration::from_millis(fetch_delay_ms),
                ..CrawlConfig::default()
            };
            let service = CrawlService::with_config(fetcher, store, config);

            let request = CrawlRequest {
                start_url,
                max_depth,
                keyword,
                english_locale: english,
                algorithm,
                use_cache: cached,
            };

            tracing::info!(
                start_url = %request.start_url,
                %algorithm,
                max_depth,
                cache_mode = cached,
                "Starting crawl"
            );

            let outcome = service.run(&request, &TracingReporter).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        Commands::ClearCache => {
            store.clear();
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
    }

    Ok(())
}
