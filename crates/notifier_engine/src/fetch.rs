use std::time::Duration;

use futures_util::StreamExt;
use notifier_core::{parse_listing, Article};
use notifier_logging::{notifier_debug, notifier_warn};
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::{FailureKind, FetchError};

const CLIENT_USER_AGENT: &str = concat!("article-notifier/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Source of the current article collection.
#[async_trait::async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Performs a single request. No retries; the next poll cycle is the retry.
    async fn fetch(&self) -> Result<Vec<Article>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestArticleFetcher {
    url: reqwest::Url,
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestArticleFetcher {
    pub fn new(url: &str, settings: FetchSettings) -> Result<Self, FetchError> {
        let url = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            url,
            settings,
            client,
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn download(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl ArticleFetcher for ReqwestArticleFetcher {
    async fn fetch(&self) -> Result<Vec<Article>, FetchError> {
        let bytes = self.download().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::InvalidPayload, err.to_string()))?;

        let listing = parse_listing(body);
        if listing.skipped > 0 {
            notifier_warn!(
                "Skipped {} undecodable article entries from {}",
                listing.skipped,
                self.url
            );
        }
        notifier_debug!(
            "Fetched {} articles ({} bytes) from {}",
            listing.articles.len(),
            bytes.len(),
            self.url
        );
        Ok(listing.articles)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
