//! HTTP client for the ConflictForecast download service
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: rate-limited GET with retry/backoff
//! - `download`: atomic file downloads
//!
//! The download service is unauthenticated; the only credentialed HTTP in
//! this application is the catalog client, which carries an API-key header
//! and lives in [`crate::app::hdx`].

use std::path::Path;

use url::Url;

use crate::errors::DownloadResult;

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpGateway;

/// HTTP client for fetching listings and files from the download service
#[derive(Debug)]
pub struct EconaiClient {
    gateway: HttpGateway,
}

impl EconaiClient {
    /// Creates a new client with default configuration
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails or the
    /// rate limit is zero.
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        let gateway = HttpGateway::new(client, config.rate_limit_rps)?;
        Ok(Self { gateway })
    }

    /// Fetches a response body as text with rate limiting and retries
    pub async fn get_text(&self, url: &Url) -> DownloadResult<String> {
        self.gateway.get_text(url).await
    }

    /// Downloads a file to the specified path with atomic replacement
    pub async fn download_file(&self, url: &Url, destination: &Path) -> DownloadResult<()> {
        DownloadHandler::new(&self.gateway)
            .download_file(url, destination)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(EconaiClient::new().is_ok());
    }

    #[test]
    fn test_client_with_custom_rate_limit() {
        let config = ClientConfig {
            rate_limit_rps: 1,
            ..Default::default()
        };
        assert!(EconaiClient::with_config(config).is_ok());
    }
}
