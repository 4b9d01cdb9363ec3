//! Core application logic for the EconAI fetcher
//!
//! This module contains the pipeline and its collaborators: the HTTP
//! client, listing retrieval, resource classification, period/time-window
//! aggregation, dataset assembly, catalog submission, and watermark state.

pub mod client;
pub mod dataset;
pub mod hdx;
pub mod listing;
pub mod models;
pub mod period;
pub mod pipeline;
pub mod retrieve;
pub mod state;
pub mod tabular;

// Re-export main public API
pub use client::{ClientConfig, EconaiClient};
pub use dataset::{slugify, DatasetRecord, ShowcaseRecord};
pub use hdx::HdxClient;
pub use listing::FileDescriptor;
pub use models::{classify, ForecastKind, Resource, ResourceKind};
pub use period::{MonthPeriod, TimeWindow};
pub use pipeline::{Aggregates, Pipeline, PipelineOutput};
pub use retrieve::{RetrieveOptions, Retriever};
pub use state::PipelineState;
pub use tabular::{Row, RowReader};
