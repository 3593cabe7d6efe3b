use thiserror::Error;

/// Application-wide error types for trawl.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Page store read/write failed.
    #[error("Store error: {0}")]
    StoreError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error came from the network layer, meaning the
    /// affected node degrades to an empty page rather than failing the run.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::Timeout(_) | AppError::NetworkError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_degradable() {
        assert!(AppError::NetworkError("reset".into()).is_network());
        assert!(AppError::Timeout(10).is_network());
        assert!(AppError::HttpError("HTTP 404".into()).is_network());
        assert!(!AppError::StoreError("disk full".into()).is_network());
    }
}
