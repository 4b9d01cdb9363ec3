//! The publication pipeline
//!
//! One pass over the upstream listing in manifest order. Each file is
//! downloaded, classified, and turned into a resource record; data files
//! additionally have every row's period code folded into the dataset time
//! window. Aggregation is a pure fold over an [`Aggregates`] accumulator
//! so it can be tested without any I/O. The codebook resource is held
//! aside during the pass and concatenated after the data resources, so it
//! is always last regardless of its position in the manifest.
//!
//! Any failure — listing fetch, download, unknown type code, malformed
//! period — aborts the run. No partial dataset is ever produced.

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::app::dataset::{DatasetRecord, ShowcaseRecord};
use crate::app::models::{classify, Resource, ResourceKind};
use crate::app::period::{MonthPeriod, TimeWindow};
use crate::app::retrieve::Retriever;
use crate::app::tabular::RowReader;
use crate::constants::{columns, hdx};
use crate::errors::{Result, TabularError};

/// Accumulators threaded through the manifest pass
///
/// `latest_modified` tracks the newest update timestamp over all files,
/// codebook included; it is the change-detection watermark. `window`
/// tracks the dataset time period over data-file rows only.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Dataset-wide time period accumulator
    pub window: TimeWindow,
    /// Maximum update timestamp seen so far
    pub latest_modified: Option<DateTime<Utc>>,
}

impl Aggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's update timestamp into the watermark
    pub fn observe_modified(&mut self, updated: DateTime<Utc>) {
        self.latest_modified = Some(match self.latest_modified {
            None => updated,
            Some(current) => current.max(updated),
        });
    }

    /// Fold one row's period into the time window
    pub fn observe_period(&mut self, period: &MonthPeriod) {
        self.window.observe_period(period);
    }
}

/// Everything a run produces for the catalog
#[derive(Debug)]
pub struct PipelineOutput {
    pub dataset: DatasetRecord,
    pub showcase: ShowcaseRecord,
    /// Change-detection watermark; `None` when the listing was empty
    pub latest_modified: Option<DateTime<Utc>>,
}

/// Drives one publication run over a retriever
pub struct Pipeline<'a> {
    retriever: &'a Retriever,
}

impl<'a> Pipeline<'a> {
    pub fn new(retriever: &'a Retriever) -> Self {
        Self { retriever }
    }

    /// Fetches the listing and produces the ordered resource list plus
    /// the aggregated accumulators
    ///
    /// Resources keep manifest order among data files; the codebook, if
    /// present, is appended last.
    pub async fn collect_resources(&self) -> Result<(Vec<Resource>, Aggregates)> {
        let descriptors = self.retriever.fetch_listing().await?;
        tracing::info!("Listing contains {} files", descriptors.len());

        let mut aggregates = Aggregates::new();
        let mut resources = Vec::with_capacity(descriptors.len());
        let mut codebook: Option<Resource> = None;

        for descriptor in &descriptors {
            let created = descriptor.created_at()?;
            let updated = descriptor.updated_at()?;
            aggregates.observe_modified(updated);

            // The codebook is downloaded too; it is uploaded like any
            // other resource.
            let path = self.retriever.fetch_file(&descriptor.url).await?;

            let kind = classify(&descriptor.name)?;
            let resource = Resource::new(descriptor.name.clone(), kind, created, updated, path);
            tracing::debug!("Classified {} as {:?}", resource.name, resource.kind);

            match kind {
                ResourceKind::Codebook => {
                    codebook = Some(resource);
                }
                ResourceKind::Forecast { .. } => {
                    scan_periods(&resource.upload_path, &mut aggregates)?;
                    resources.push(resource);
                }
            }
        }

        if let Some(codebook) = codebook {
            resources.push(codebook);
        }

        Ok((resources, aggregates))
    }

    /// Runs the full pipeline and assembles the catalog records
    pub async fn generate_dataset_and_showcase(&self) -> Result<PipelineOutput> {
        let (resources, aggregates) = self.collect_resources().await?;

        let mut dataset = DatasetRecord::new(hdx::DATASET_TITLE);
        dataset.add_tag(hdx::TAG);
        dataset.set_subnational(false);
        dataset.add_other_location(hdx::LOCATION_WORLD);

        match aggregates.window.bounds() {
            Some((start, end)) => dataset.set_time_period(start, end),
            None => tracing::warn!(
                "No forecast periods observed; dataset has no time period"
            ),
        }

        for resource in resources {
            dataset.add_resource(resource);
        }

        let mut showcase = ShowcaseRecord::new(dataset.name(), hdx::DATASET_TITLE);
        showcase.add_tag(hdx::TAG);

        Ok(PipelineOutput {
            dataset,
            showcase,
            latest_modified: aggregates.latest_modified,
        })
    }
}

/// Scans every row of a data file and folds its period into the window
fn scan_periods(path: &Path, aggregates: &mut Aggregates) -> Result<()> {
    let reader = RowReader::open(path)?;
    let mut rows = 0usize;
    for row in reader {
        let row = row?;
        let raw = row
            .get(columns::PERIOD)
            .ok_or_else(|| TabularError::MissingColumn {
                column: columns::PERIOD.to_string(),
                path: path.to_path_buf(),
            })?;
        let period = MonthPeriod::parse(raw)?;
        aggregates.observe_period(&period);
        rows += 1;
    }
    tracing::debug!("Scanned {} rows from {}", rows, path.display());
    Ok(())
}
