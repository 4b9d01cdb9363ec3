//! Core HTTP operations with rate limiting and retry logic
//!
//! Requests pass through a process-wide rate limiter and are retried with
//! exponential backoff on transport errors and on 429/503 responses. Any
//! other non-success status is surfaced to the caller unchanged, so that
//! a 404 on the listing endpoint stays a hard failure rather than a retry.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::{Client, Response};
use url::Url;

use crate::constants::limits;
use crate::errors::{DownloadError, DownloadResult};

/// HTTP request gateway shared by the listing fetcher and the downloader
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpGateway {
    /// Creates a gateway over an already-built client
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::ZeroRateLimit` if `rate_limit_rps` is zero.
    pub fn new(client: Client, rate_limit_rps: u32) -> DownloadResult<Self> {
        let quota = Quota::per_second(
            NonZeroU32::new(rate_limit_rps).ok_or(DownloadError::ZeroRateLimit)?,
        );
        Ok(Self {
            client,
            limiter: RateLimiter::direct(quota),
        })
    }

    /// Performs a rate-limited GET with backoff retries
    ///
    /// Retries transport failures and 429/503 responses up to
    /// `limits::MAX_RETRIES` times. Other statuses are returned as-is;
    /// use [`ensure_success`] to map them to errors.
    pub async fn get(&self, url: &Url) -> DownloadResult<Response> {
        self.limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let mut attempt: u32 = 0;
        loop {
            let retry_reason = match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !matches!(status.as_u16(), 429 | 503) {
                        tracing::debug!("GET {} -> {}", url, status);
                        return Ok(response);
                    }
                    format!("server responded {status}")
                }
                Err(e) => format!("transport error: {e}"),
            };

            attempt += 1;
            if attempt > limits::MAX_RETRIES {
                tracing::error!("GET {} failed after {} retries", url, limits::MAX_RETRIES);
                return Err(DownloadError::MaxRetriesExceeded {
                    max_retries: limits::MAX_RETRIES,
                    url: url.to_string(),
                });
            }

            let delay = backoff_delay(attempt);
            tracing::warn!(
                "GET {} attempt {}/{} failed ({}). Retrying in {}ms",
                url,
                attempt,
                limits::MAX_RETRIES,
                retry_reason,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Fetches a response body as text
    pub async fn get_text(&self, url: &Url) -> DownloadResult<String> {
        let response = ensure_success(self.get(url).await?, url)?;
        Ok(response.text().await?)
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Maps a non-success response to the appropriate download error
pub fn ensure_success(response: Response, url: &Url) -> DownloadResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 404 {
        return Err(DownloadError::NotFound {
            url: url.to_string(),
        });
    }
    Err(DownloadError::ServerError {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

/// Exponential backoff delay for the given attempt number (1-based)
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(attempt))
}
