//! HTTP client configuration and building logic

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{http, limits};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the shared HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,
    /// Maximum number of connections per host
    pub pool_max_per_host: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_per_host)
            .user_agent(http::USER_AGENT)
            .build()
            .map_err(DownloadError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.request_timeout, http::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_http_client_with_custom_config() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ..Default::default()
        };
        assert!(config.build_http_client().is_ok());
    }
}
