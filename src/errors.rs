//! Error types for the EconAI fetcher
//!
//! This module defines the error types for all components of the application.
//! Every error in the pipeline is fatal for the run: a failed listing fetch,
//! download, classification, or period parse aborts publication and leaves
//! the catalog untouched.

use std::path::PathBuf;

use thiserror::Error;

/// Download and HTTP transport errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Resource missing upstream
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// Server returned error status
    #[error("Server error: HTTP {status} for {url}")]
    ServerError { status: u16, url: String },

    /// Maximum retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded for {url}")]
    MaxRetriesExceeded { max_retries: u32, url: String },

    /// Rate limiter misconfiguration
    #[error("Rate limit must be non-zero")]
    ZeroRateLimit,

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },

    /// Saved-data mode requested a file that was never saved
    #[error("Saved copy not found: {path}. Run with --save first")]
    SavedCopyMissing { path: PathBuf },
}

/// Listing retrieval and decoding errors
#[derive(Error, Debug)]
pub enum ListingError {
    /// Listing endpoint could not be fetched
    #[error("Listing fetch failed")]
    Fetch(#[from] DownloadError),

    /// Listing body is not the expected JSON array
    #[error("Listing JSON could not be decoded")]
    JsonDecode(#[from] serde_json::Error),

    /// Epoch timestamp outside the representable range
    #[error("Invalid epoch timestamp in listing: {value}")]
    InvalidTimestamp { value: f64 },
}

/// File classification errors
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Type code not present in the fixed forecast table
    #[error("Unknown forecast type code '{code}' in file {file_name}")]
    UnknownTypeCode { code: String, file_name: String },

    /// Filename does not match the expected publication layout
    #[error("Unparseable data filename {file_name}: {reason}")]
    MalformedFilename { file_name: String, reason: String },
}

/// Period code parsing errors
#[derive(Error, Debug)]
pub enum PeriodError {
    /// Field too short to carry a YYYYMM code
    #[error("Period field too short: {value:?}")]
    TooShort { value: String },

    /// Year digits did not parse
    #[error("Invalid year in period field: {value:?}")]
    InvalidYear { value: String },

    /// Month digits did not parse or are out of range
    #[error("Invalid month in period field: {value:?}")]
    InvalidMonth { value: String },
}

/// Tabular file reading errors
#[derive(Error, Debug)]
pub enum TabularError {
    /// I/O error opening the file
    #[error("I/O error reading tabular file")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV decoding error")]
    Csv(#[from] csv::Error),

    /// Required column missing from the header row
    #[error("Column '{column}' missing from {path}")]
    MissingColumn { column: String, path: PathBuf },
}

/// Catalog submission errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request error
    #[error("Catalog HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// API key environment variable missing
    #[error("Missing HDX API key. Set the HDX_API_KEY environment variable")]
    MissingApiKey,

    /// Catalog action reported failure
    #[error("Catalog action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    /// Response body did not have the expected action envelope
    #[error("Unexpected response from catalog action '{action}'")]
    UnexpectedResponse { action: String },

    /// I/O error reading a resource file for upload
    #[error("Could not read resource file for upload")]
    Io(#[from] std::io::Error),

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {url}")]
    InvalidUrl { url: String },
}

/// Watermark state persistence errors
#[derive(Error, Debug)]
pub enum StateError {
    /// I/O error reading or writing the state file
    #[error("State file I/O error")]
    Io(#[from] std::io::Error),

    /// Persisted value is not an ISO-8601 date-time
    #[error("Invalid timestamp in state file: {value:?}")]
    InvalidTimestamp { value: String },

    /// No usable location for the state file
    #[error("Could not determine a state directory")]
    NoStateDirectory,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),
}

/// Static metadata merge errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// I/O error reading the metadata file
    #[error("I/O error reading static metadata")]
    Io(#[from] std::io::Error),

    /// YAML decoding error
    #[error("Static metadata YAML could not be decoded")]
    YamlDecode(#[from] serde_yaml::Error),

    /// Top-level YAML value is not a mapping
    #[error("Static metadata must be a YAML mapping: {path}")]
    NotAMapping { path: PathBuf },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Listing error
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// Classification error
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Period parsing error
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Tabular reading error
    #[error(transparent)]
    Tabular(#[from] TabularError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// State error
    #[error(transparent)]
    State(#[from] StateError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Static metadata error
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Listing(_) => "listing",
            AppError::Classify(_) => "classify",
            AppError::Period(_) => "period",
            AppError::Tabular(_) => "tabular",
            AppError::Catalog(_) => "catalog",
            AppError::State(_) => "state",
            AppError::Config(_) => "config",
            AppError::Metadata(_) => "metadata",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Listing result type alias
pub type ListingResult<T> = std::result::Result<T, ListingError>;

/// Classification result type alias
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;

/// Period parsing result type alias
pub type PeriodResult<T> = std::result::Result<T, PeriodError>;

/// Tabular reading result type alias
pub type TabularResult<T> = std::result::Result<T, TabularError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// State result type alias
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Metadata result type alias
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AppError::Classify(ClassifyError::UnknownTypeCode {
            code: "foobar".to_string(),
            file_name: "conflictforecast_ons_foobar_03.csv".to_string(),
        });
        assert_eq!(err.category(), "classify");

        let err = AppError::generic("boom");
        assert_eq!(err.category(), "generic");
    }

    #[test]
    fn test_unknown_type_code_message_names_the_file() {
        let err = ClassifyError::UnknownTypeCode {
            code: "foobar".to_string(),
            file_name: "f.csv".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("foobar"));
        assert!(message.contains("f.csv"));
    }
}
