//! HTTP content fetching.

use async_trait::async_trait;
use toebox_core::{Fetcher, SourceError};

/// Fetcher backed by a shared HTTP client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| SourceError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        response.text().await.map_err(|e| SourceError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
