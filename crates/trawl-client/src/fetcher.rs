use std::time::Duration;

use reqwest::Client;
use trawl_core::error::AppError;
use trawl_core::models::FetchedPage;
use trawl_core::traits::PageFetcher;
use url::Url;

use crate::parser::parse_page;

/// HTTP fetcher using reqwest.
///
/// Downloads a page, cleans its text, and extracts in-domain links.
/// Certificate validation is disabled deliberately: the target host serves
/// an incomplete chain and every failure here only degrades a single node.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
    domain_marker: String,
}

impl HttpFetcher {
    /// Fetcher with the default **10 s** per-request timeout.
    ///
    /// `domain_marker` is the substring an anchor target must contain to
    /// count as an in-domain link (e.g. `"ui.ac.id"`).
    pub fn new(domain_marker: &str) -> Result<Self, AppError> {
        Self::with_timeout(domain_marker, Duration::from_secs(10))
    }

    pub fn with_timeout(domain_marker: &str, timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent("trawl/0.1 (site crawler)")
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
            domain_marker: domain_marker.to_string(),
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, AppError> {
        validate_url(url)?;
        tracing::debug!(%url, "Fetching");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(parse_page(&body, &self.domain_marker))
    }
}

/// Reject anything that is not a well-formed http/https URL before it
/// reaches the network stack.
fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::HttpError(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(AppError::HttpError("URL has no host".to_string()));
    }

    Ok(())
}
