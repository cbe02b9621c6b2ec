//! ROM fetching interface.

use std::collections::HashMap;

/// Error downloading a ROM payload. Fatal to the session; never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported ROM locator '{0}'")]
    InvalidLocator(String),

    #[error("ROM not found: {0}")]
    NotFound(String),

    #[error("server returned HTTP {status} for {locator}")]
    Status { locator: String, status: u16 },

    #[error("failed to download {locator}: {message}")]
    Transport { locator: String, message: String },

    #[error("ROM download {locator} exceeds {limit} bytes")]
    TooLarge { locator: String, limit: u64 },

    #[error("failed to read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
}

/// Retrieves raw ROM payloads by locator.
#[allow(async_fn_in_trait)]
pub trait RomFetcher {
    /// Fetch the complete payload behind `locator`.
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError>;
}

/// In-memory payloads keyed by locator, for embedding and tests.
impl RomFetcher for HashMap<String, Vec<u8>> {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        self.get(locator)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(locator.to_string()))
    }
}
