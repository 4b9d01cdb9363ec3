//! Resource classification models
//!
//! Upstream data filenames follow the layout
//! `{prefix}_{source}_{typecode}_{timeframe}.{ext}` (for example
//! `conflictforecast_ons_armedconf_03.csv`): an underscore-separated stem
//! whose last segment is a two-digit forecast horizon in months and whose
//! second-to-last segment is one of three known type codes. The codebook is
//! recognized by substring instead and never goes through the layout parse.
//!
//! An unknown type code is a fatal classification error. Every data file in
//! a publication must decode to a known forecast variant.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::constants::econai;
use crate::errors::{ClassifyError, ClassifyResult};

/// Forecast variant identified by the filename type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastKind {
    /// Probability of armed conflict (`armedconf`)
    ArmedConflict,
    /// Probability of any violence (`anyviolence`)
    AnyViolence,
    /// Expected intensity of violence (`lnbest`)
    ViolenceIntensity,
}

impl ForecastKind {
    /// Look up a filename type code in the fixed table
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "armedconf" => Some(Self::ArmedConflict),
            "anyviolence" => Some(Self::AnyViolence),
            "lnbest" => Some(Self::ViolenceIntensity),
            _ => None,
        }
    }

    /// The filename type code for this variant
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArmedConflict => "armedconf",
            Self::AnyViolence => "anyviolence",
            Self::ViolenceIntensity => "lnbest",
        }
    }

    /// Human-readable label used in resource descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Self::ArmedConflict => "Armed Conflict",
            Self::AnyViolence => "Any Violence",
            Self::ViolenceIntensity => "Violence Intensity",
        }
    }
}

impl std::fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification of one listed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Reference documentation; always ordered last among resources
    Codebook,
    /// A forecast data file for one variant and horizon
    Forecast {
        kind: ForecastKind,
        /// Forecast horizon in months
        months: u32,
    },
}

impl ResourceKind {
    /// Resource description shown on the catalog
    pub fn description(&self) -> String {
        match self {
            Self::Codebook => "Codebook".to_string(),
            Self::Forecast { kind, months } => format!("{} over {} months", kind.label(), months),
        }
    }

    pub fn is_codebook(&self) -> bool {
        matches!(self, Self::Codebook)
    }
}

/// Classify a listed filename
///
/// Filenames containing the codebook marker anywhere are codebooks; all
/// other files must match the publication layout and carry a known type
/// code.
///
/// # Errors
///
/// Returns `ClassifyError::UnknownTypeCode` for a well-formed filename
/// with a type code outside the fixed table, and
/// `ClassifyError::MalformedFilename` when the layout itself cannot be
/// parsed.
pub fn classify(file_name: &str) -> ClassifyResult<ResourceKind> {
    if file_name.contains(econai::CODEBOOK_MARKER) {
        return Ok(ResourceKind::Codebook);
    }
    let parts = DataFileName::parse(file_name)?;
    Ok(ResourceKind::Forecast {
        kind: parts.kind,
        months: parts.months,
    })
}

/// Parsed fields of a data filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileName {
    /// Forecast variant from the type code segment
    pub kind: ForecastKind,
    /// Forecast horizon in months from the timeframe segment
    pub months: u32,
    /// Lowercased filename extension
    pub extension: String,
}

impl DataFileName {
    /// Parse a filename of the form `{prefix}_{source}_{typecode}_{timeframe}.{ext}`
    pub fn parse(file_name: &str) -> ClassifyResult<Self> {
        let malformed = |reason: &str| ClassifyError::MalformedFilename {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        };

        let (stem, extension) = file_name
            .rsplit_once('.')
            .ok_or_else(|| malformed("missing extension"))?;

        let segments: Vec<&str> = stem.split('_').collect();
        if segments.len() < 4 {
            return Err(malformed("expected prefix_source_typecode_timeframe stem"));
        }

        let timeframe = segments[segments.len() - 1];
        if timeframe.len() != 2 || !timeframe.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("timeframe segment is not two digits"));
        }
        let months: u32 = timeframe
            .parse()
            .map_err(|_| malformed("timeframe segment is not numeric"))?;

        let code = segments[segments.len() - 2];
        let kind = ForecastKind::from_code(code).ok_or_else(|| ClassifyError::UnknownTypeCode {
            code: code.to_string(),
            file_name: file_name.to_string(),
        })?;

        Ok(Self {
            kind,
            months,
            extension: extension.to_ascii_lowercase(),
        })
    }
}

/// Filename extension used as the catalog resource format
pub fn file_format(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// A classified, downloaded file ready to attach to the dataset
#[derive(Debug, Clone)]
pub struct Resource {
    /// Upstream filename, kept as the catalog resource name
    pub name: String,
    /// Classification outcome
    pub kind: ResourceKind,
    /// Catalog description derived from the classification
    pub description: String,
    /// Catalog format derived from the filename extension
    pub format: String,
    /// Upstream creation time (UTC)
    pub created: DateTime<Utc>,
    /// Upstream last-update time (UTC)
    pub last_modified: DateTime<Utc>,
    /// Local copy to upload
    pub upload_path: PathBuf,
}

impl Resource {
    /// Assemble a resource record from a classified download
    pub fn new(
        name: String,
        kind: ResourceKind,
        created: DateTime<Utc>,
        last_modified: DateTime<Utc>,
        upload_path: PathBuf,
    ) -> Self {
        let description = kind.description();
        let format = file_format(&name);
        Self {
            name,
            kind,
            description,
            format,
            created,
            last_modified,
            upload_path,
        }
    }

    pub fn is_codebook(&self) -> bool {
        self.kind.is_codebook()
    }

    /// Creation time rendered the way the catalog stores it
    pub fn created_stamp(&self) -> String {
        hdx_timestamp(&self.created)
    }

    /// Last-update time rendered the way the catalog stores it
    pub fn last_modified_stamp(&self) -> String {
        hdx_timestamp(&self.last_modified)
    }
}

/// Catalog timestamp rendering: ISO-8601 with microseconds, no offset
fn hdx_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_kind_table() {
        assert_eq!(
            ForecastKind::from_code("armedconf"),
            Some(ForecastKind::ArmedConflict)
        );
        assert_eq!(
            ForecastKind::from_code("anyviolence"),
            Some(ForecastKind::AnyViolence)
        );
        assert_eq!(
            ForecastKind::from_code("lnbest"),
            Some(ForecastKind::ViolenceIntensity)
        );
        assert_eq!(ForecastKind::from_code("foobar"), None);
        assert_eq!(ForecastKind::from_code(""), None);
    }

    #[test]
    fn test_descriptions_for_all_known_codes() {
        let cases = [
            ("conflictforecast_ons_armedconf_03.csv", "Armed Conflict over 3 months"),
            ("conflictforecast_ons_armedconf_12.csv", "Armed Conflict over 12 months"),
            ("conflictforecast_ons_anyviolence_03.csv", "Any Violence over 3 months"),
            ("conflictforecast_ons_anyviolence_12.csv", "Any Violence over 12 months"),
            ("conflictforecast_int_lnbest_03.csv", "Violence Intensity over 3 months"),
            ("conflictforecast_int_lnbest_12.csv", "Violence Intensity over 12 months"),
        ];
        for (file_name, expected) in cases {
            let kind = classify(file_name).unwrap();
            assert_eq!(kind.description(), expected, "for {file_name}");
        }
    }

    #[test]
    fn test_codebook_detected_anywhere_in_name() {
        assert_eq!(classify("codebook.pdf").unwrap(), ResourceKind::Codebook);
        assert_eq!(
            classify("conflictforecast_codebook_v2.pdf").unwrap(),
            ResourceKind::Codebook
        );
        assert_eq!(classify("codebook.pdf").unwrap().description(), "Codebook");
    }

    #[test]
    fn test_unknown_type_code_is_fatal() {
        let err = classify("conflictforecast_ons_foobar_03.csv").unwrap_err();
        match err {
            ClassifyError::UnknownTypeCode { code, file_name } => {
                assert_eq!(code, "foobar");
                assert_eq!(file_name, "conflictforecast_ons_foobar_03.csv");
            }
            other => panic!("expected UnknownTypeCode, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_filenames_are_fatal() {
        // No extension
        assert!(matches!(
            classify("conflictforecast_ons_armedconf_03"),
            Err(ClassifyError::MalformedFilename { .. })
        ));
        // Too few segments
        assert!(matches!(
            classify("armedconf_03.csv"),
            Err(ClassifyError::MalformedFilename { .. })
        ));
        // Non-numeric timeframe
        assert!(matches!(
            classify("conflictforecast_ons_armedconf_ab.csv"),
            Err(ClassifyError::MalformedFilename { .. })
        ));
        // Timeframe not two digits
        assert!(matches!(
            classify("conflictforecast_ons_armedconf_003.csv"),
            Err(ClassifyError::MalformedFilename { .. })
        ));
    }

    #[test]
    fn test_timeframe_drops_leading_zero() {
        let parts = DataFileName::parse("conflictforecast_ons_armedconf_03.csv").unwrap();
        assert_eq!(parts.months, 3);
        let parts = DataFileName::parse("conflictforecast_int_lnbest_12.csv").unwrap();
        assert_eq!(parts.months, 12);
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(file_format("conflictforecast_ons_armedconf_03.csv"), "csv");
        assert_eq!(file_format("codebook.PDF"), "pdf");
        assert_eq!(file_format("no_extension"), "");
    }

    #[test]
    fn test_resource_stamps() {
        let created = epoch(1_754_122_685, 37_000);
        let resource = Resource::new(
            "conflictforecast_int_lnbest_03.csv".to_string(),
            classify("conflictforecast_int_lnbest_03.csv").unwrap(),
            created,
            created,
            PathBuf::from("/tmp/conflictforecast_int_lnbest_03.csv"),
        );
        assert_eq!(resource.description, "Violence Intensity over 3 months");
        assert_eq!(resource.format, "csv");
        assert!(!resource.is_codebook());
        assert_eq!(resource.created_stamp(), "2025-08-02T08:18:05.037000");
    }

    fn epoch(secs: i64, micros: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, micros * 1000).unwrap()
    }
}
