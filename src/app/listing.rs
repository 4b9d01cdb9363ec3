//! Listing manifest types and decoding
//!
//! The download service publishes a JSON array describing the files of the
//! latest publication. Each entry carries the upstream filename, a relative
//! download URL, and fractional epoch timestamps for creation and last
//! update. Entries are consumed once per run, in manifest order.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::{ListingError, ListingResult};

/// One file entry from the upstream listing
#[derive(Debug, Clone, Deserialize)]
pub struct FileDescriptor {
    /// Upstream filename; encodes type, variant and timeframe
    pub name: String,
    /// Download path relative to the service base URL
    pub url: String,
    /// Creation time as fractional epoch seconds
    #[serde(rename = "createdOn")]
    pub created_on: f64,
    /// Last-update time as fractional epoch seconds
    #[serde(rename = "updatedOn")]
    pub updated_on: f64,
}

impl FileDescriptor {
    /// Creation time normalized to UTC
    pub fn created_at(&self) -> ListingResult<DateTime<Utc>> {
        epoch_to_utc(self.created_on)
    }

    /// Last-update time normalized to UTC
    pub fn updated_at(&self) -> ListingResult<DateTime<Utc>> {
        epoch_to_utc(self.updated_on)
    }
}

/// Decodes a listing body into descriptors, preserving manifest order
pub fn decode_listing(body: &str) -> ListingResult<Vec<FileDescriptor>> {
    Ok(serde_json::from_str(body)?)
}

/// Converts fractional epoch seconds to a UTC timestamp
///
/// Upstream timestamps carry millisecond precision; conversion goes
/// through microseconds so the fraction survives into resource records.
pub fn epoch_to_utc(seconds: f64) -> ListingResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(ListingError::InvalidTimestamp { value: seconds });
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return Err(ListingError::InvalidTimestamp { value: seconds });
    }
    DateTime::from_timestamp_micros(micros as i64)
        .ok_or(ListingError::InvalidTimestamp { value: seconds })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"name": "conflictforecast_ons_armedconf_03.csv",
         "url": "/downloads/conflictforecast_ons_armedconf_03.csv",
         "createdOn": 1754122684.229, "updatedOn": 1754122684.229},
        {"name": "codebook.pdf",
         "url": "/downloads/codebook.pdf",
         "createdOn": 1754122683.253, "updatedOn": 1754122683.253}
    ]"#;

    #[test]
    fn test_decode_listing_preserves_order() {
        let listing = decode_listing(SAMPLE).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "conflictforecast_ons_armedconf_03.csv");
        assert_eq!(listing[1].name, "codebook.pdf");
        assert_eq!(listing[0].url, "/downloads/conflictforecast_ons_armedconf_03.csv");
    }

    #[test]
    fn test_decode_listing_rejects_non_array() {
        assert!(decode_listing(r#"{"name": "x"}"#).is_err());
        assert!(decode_listing("not json").is_err());
    }

    #[test]
    fn test_epoch_to_utc_whole_seconds() {
        let ts = epoch_to_utc(86_400.0).unwrap();
        assert_eq!(ts.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_epoch_to_utc_keeps_milliseconds() {
        let ts = epoch_to_utc(0.5).unwrap();
        assert_eq!(ts.timestamp_micros(), 500_000);

        let ts = epoch_to_utc(1_754_122_685.037).unwrap();
        assert_eq!(
            ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            "2025-08-02T08:18:05.037000"
        );
    }

    #[test]
    fn test_epoch_to_utc_rejects_nonsense() {
        assert!(epoch_to_utc(f64::NAN).is_err());
        assert!(epoch_to_utc(f64::INFINITY).is_err());
        assert!(epoch_to_utc(1e30).is_err());
    }

    #[test]
    fn test_descriptor_timestamps() {
        let listing = decode_listing(SAMPLE).unwrap();
        let updated = listing[0].updated_at().unwrap();
        assert_eq!(
            updated.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2025-08-02T08:18:04.229"
        );
        assert!(listing[1].updated_at().unwrap() < updated);
    }
}
