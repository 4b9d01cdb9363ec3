//! Application constants for the EconAI fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable holding the HDX API key
    pub const HDX_API_KEY: &str = "HDX_API_KEY";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "EconAI-Fetcher/0.1.0 (HDX Scraper)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 4;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for upstream requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;
}

/// ConflictForecast download service endpoints
pub mod econai {
    /// Download API base URL
    pub const BASE_URL: &str = "https://api.conflictforecast.org";

    /// Path of the latest-publication listing, relative to the base URL
    pub const LATEST_PATH: &str = "/downloads/latest.json";

    /// Filename substring that marks the codebook document
    pub const CODEBOOK_MARKER: &str = "codebook";
}

/// HDX catalog constants
pub mod hdx {
    /// Production HDX site URL
    pub const SITE_URL: &str = "https://data.humdata.org";

    /// Dataset title; the dataset name is its slug
    pub const DATASET_TITLE: &str = "EconAI Conflict Forecast";

    /// Tag shared by the dataset and the showcase
    pub const TAG: &str = "conflict-violence";

    /// Location code for the global grouping
    pub const LOCATION_WORLD: &str = "world";

    /// Showcase description
    pub const SHOWCASE_NOTES: &str = "Conflict Prevention Gains";

    /// Showcase target page
    pub const SHOWCASE_URL: &str = "https://conflictforecast.org/prevention-gains";

    /// Showcase preview image
    pub const SHOWCASE_IMAGE_URL: &str =
        "https://raw.githubusercontent.com/mcarans/hdx-scraper-econai/main/gridcells.png";

    /// Value recorded as the updating script on published datasets
    pub const UPDATED_BY_SCRIPT: &str = "HDX Scraper: EconAI";
}

/// Column names read from the tabular data files
pub mod columns {
    /// Per-row forecast period code (YYYYMM, possibly embedded in a longer field)
    pub const PERIOD: &str = "period";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".part";

    /// Default directory for saved copies of downloads (kept in the repo
    /// so that debugging runs survive /tmp cleanup)
    pub const SAVED_DATA_DIR: &str = "saved_data";

    /// Static dataset metadata merged into every publication
    pub const STATIC_METADATA_FILE: &str = "config/hdx_dataset_static.yaml";
}

/// Change-detection state constants
pub mod state {
    /// Directory (under the user config dir) holding fetcher state
    pub const STATE_DIR: &str = "econai-fetcher";

    /// File holding the last-published watermark
    pub const STATE_FILE: &str = "last-modified.txt";
}

// Re-export commonly used constants for convenience
pub use econai::{BASE_URL as ECONAI_BASE_URL, LATEST_PATH as ECONAI_LATEST_PATH};
pub use hdx::{DATASET_TITLE, SITE_URL as HDX_SITE_URL};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::{DEFAULT_RATE_LIMIT_RPS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
