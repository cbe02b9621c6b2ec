//! ROM downloads over HTTP and from the local filesystem.

use std::path::PathBuf;
use std::time::Duration;

use romdeck_core::archive::MAX_ROM_SIZE;
use romdeck_core::{FetchError, RomFetcher};
use url::Url;

/// Timeout for a complete ROM download.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `http(s)://` locators with reqwest and everything else from disk.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_size: u64,
}

/// Where a locator points.
#[derive(Debug, PartialEq)]
enum Target {
    Remote(Url),
    Local(PathBuf),
}

impl HttpFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            max_size: MAX_ROM_SIZE as u64,
        })
    }

    /// Largest download accepted, in bytes.
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    async fn download(&self, locator: &str, url: Url) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            locator: locator.to_string(),
            message: e.to_string(),
        };
        let too_large = || FetchError::TooLarge {
            locator: locator.to_string(),
            limit: self.max_size,
        };

        let mut response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(locator.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        // Content-Length is advisory; the streamed total is checked as well.
        if response.content_length().is_some_and(|len| len > self.max_size) {
            return Err(too_large());
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if (bytes.len() + chunk.len()) as u64 > self.max_size {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

impl RomFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        let path = match target(locator)? {
            Target::Remote(url) => {
                tracing::debug!("Downloading {}", url);
                return match tokio::time::timeout(FETCH_TIMEOUT, self.download(locator, url)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Transport {
                        locator: locator.to_string(),
                        message: "request timed out".to_string(),
                    }),
                };
            }
            Target::Local(path) => path,
        };

        tracing::debug!("Reading {}", path.display());
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(locator.to_string())
            } else {
                FetchError::Io {
                    locator: locator.to_string(),
                    source,
                }
            }
        })
    }
}

/// Classify a locator. `file://` URLs are decoded to paths, text that does
/// not parse as a URL is a bare path, other schemes are rejected.
fn target(locator: &str) -> Result<Target, FetchError> {
    let locator = locator.trim();
    let invalid = || FetchError::InvalidLocator(locator.to_string());
    if locator.is_empty() {
        return Err(invalid());
    }

    match Url::parse(locator) {
        // One-letter schemes are Windows drive letters.
        Ok(url) if !url.cannot_be_a_base() && url.scheme().len() > 1 => match url.scheme() {
            "http" | "https" => Ok(Target::Remote(url)),
            "file" => url.to_file_path().map(Target::Local).map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        _ => Ok(Target::Local(PathBuf::from(locator))),
    }
}
