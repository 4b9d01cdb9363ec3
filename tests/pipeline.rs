//! End-to-end pipeline test over the saved fixture publication
//!
//! Drives the full pipeline offline: the retriever runs in use-saved mode
//! against a fixture copy of a seven-file publication (six forecast data
//! files plus the codebook), so no network is involved.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use tempfile::tempdir;

use econai_fetcher::app::{
    EconaiClient, Pipeline, PipelineOutput, RetrieveOptions, Retriever,
};
use econai_fetcher::errors::AppError;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn saved_retriever(saved_dir: PathBuf, temp_dir: &Path) -> Retriever {
    Retriever::new(
        EconaiClient::new().unwrap(),
        "https://api.conflictforecast.org",
        "/downloads/latest.json",
        temp_dir,
        RetrieveOptions {
            save: false,
            use_saved: true,
            saved_dir,
        },
    )
    .unwrap()
}

async fn run_pipeline(saved_dir: PathBuf) -> Result<PipelineOutput, AppError> {
    let temp = tempdir().unwrap();
    let retriever = saved_retriever(saved_dir, temp.path());
    let pipeline = Pipeline::new(&retriever);
    pipeline.generate_dataset_and_showcase().await
}

#[tokio::test]
async fn test_full_publication_run() {
    let output = run_pipeline(fixtures_dir()).await.unwrap();

    let dataset = &output.dataset;
    assert_eq!(dataset.name(), "econai-conflict-forecast");
    assert_eq!(
        dataset.get("title").unwrap(),
        &serde_json::json!("EconAI Conflict Forecast")
    );
    assert_eq!(dataset.get("subnational").unwrap(), &serde_json::json!("0"));
    assert_eq!(
        dataset.get("groups").unwrap(),
        &serde_json::json!([{ "name": "world" }])
    );
    assert_eq!(
        dataset.get("tags").unwrap(),
        &serde_json::json!([{ "name": "conflict-violence" }])
    );

    // Aggregated across every row of every data file
    assert_eq!(
        dataset.get("dataset_date").unwrap(),
        &serde_json::json!("[2010-01-01T00:00:00 TO 2025-07-31T23:59:59]")
    );

    // Seven resources, manifest order among data files, codebook last
    // even though it sits in the middle of the listing
    let resources = dataset.resources();
    assert_eq!(resources.len(), 7);
    let descriptions: Vec<&str> = resources.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(
        descriptions,
        [
            "Violence Intensity over 3 months",
            "Violence Intensity over 12 months",
            "Any Violence over 3 months",
            "Any Violence over 12 months",
            "Armed Conflict over 3 months",
            "Armed Conflict over 12 months",
            "Codebook",
        ]
    );
    assert!(resources.last().unwrap().is_codebook());
    assert!(resources[..6].iter().all(|r| !r.is_codebook()));
    assert!(resources[..6].iter().all(|r| r.format == "csv"));
    assert_eq!(resources[6].format, "pdf");

    // Timestamps survive with millisecond precision
    assert_eq!(resources[0].created_stamp(), "2025-08-02T08:18:05.037000");
    assert_eq!(
        resources[6].last_modified_stamp(),
        "2025-08-02T08:18:03.253000"
    );

    // Watermark is the maximum update time over all files
    let expected = DateTime::from_timestamp_micros(1_754_122_685_449_000).unwrap();
    assert_eq!(output.latest_modified, Some(expected));

    // Showcase is linked by name and tag
    let showcase = &output.showcase;
    assert_eq!(showcase.name(), "econai-conflict-forecast-showcase");
    assert_eq!(
        showcase.get("tags").unwrap(),
        &serde_json::json!([{ "name": "conflict-violence" }])
    );
    assert_eq!(
        showcase.get("notes").unwrap(),
        &serde_json::json!("Conflict Prevention Gains")
    );
}

#[tokio::test]
async fn test_static_metadata_merge() {
    let output = run_pipeline(fixtures_dir()).await.unwrap();
    let mut dataset = output.dataset;

    let static_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join("hdx_dataset_static.yaml");
    dataset.update_from_yaml(&static_path).unwrap();

    assert_eq!(dataset.get("license_id").unwrap(), &serde_json::json!("cc-by"));
    assert_eq!(
        dataset.get("maintainer").unwrap(),
        &serde_json::json!("196196be-6037-4488-8b71-d786adf4c081")
    );
    assert_eq!(
        dataset.get("data_update_frequency").unwrap(),
        &serde_json::json!(30)
    );
    assert_eq!(
        dataset.get("dataset_source").unwrap(),
        &serde_json::json!("EconAI")
    );
    // Pipeline-derived fields are untouched by the merge
    assert_eq!(dataset.name(), "econai-conflict-forecast");
    assert_eq!(
        dataset.get("dataset_date").unwrap(),
        &serde_json::json!("[2010-01-01T00:00:00 TO 2025-07-31T23:59:59]")
    );
}

#[tokio::test]
async fn test_unknown_type_code_aborts_the_run() {
    let saved = tempdir().unwrap();
    std::fs::write(
        saved.path().join("latest.json"),
        r#"[{
            "name": "conflictforecast_ons_foobar_03.csv",
            "url": "/downloads/conflictforecast_ons_foobar_03.csv",
            "createdOn": 1754122684.229,
            "updatedOn": 1754122684.229
        }]"#,
    )
    .unwrap();
    std::fs::write(
        saved.path().join("conflictforecast_ons_foobar_03.csv"),
        "isocode,period,forecast\nAFG,201001,0.12\n",
    )
    .unwrap();

    let err = run_pipeline(saved.path().to_path_buf()).await.unwrap_err();
    assert_eq!(err.category(), "classify");
    assert!(err.to_string().contains("foobar"));
}

#[tokio::test]
async fn test_listing_without_data_files_has_no_time_period() {
    let saved = tempdir().unwrap();
    std::fs::write(
        saved.path().join("latest.json"),
        r#"[{
            "name": "codebook.pdf",
            "url": "/downloads/codebook.pdf",
            "createdOn": 1754122683.253,
            "updatedOn": 1754122683.253
        }]"#,
    )
    .unwrap();
    std::fs::copy(
        fixtures_dir().join("codebook.pdf"),
        saved.path().join("codebook.pdf"),
    )
    .unwrap();

    let output = run_pipeline(saved.path().to_path_buf()).await.unwrap();

    // The codebook still counts for the watermark, but there is no
    // window and no dataset_date
    assert!(output.latest_modified.is_some());
    assert!(output.dataset.get("dataset_date").is_none());
    assert_eq!(output.dataset.resources().len(), 1);
    assert!(output.dataset.resources()[0].is_codebook());
}

#[tokio::test]
async fn test_malformed_period_aborts_the_run() {
    let saved = tempdir().unwrap();
    std::fs::write(
        saved.path().join("latest.json"),
        r#"[{
            "name": "conflictforecast_ons_armedconf_03.csv",
            "url": "/downloads/conflictforecast_ons_armedconf_03.csv",
            "createdOn": 1754122684.229,
            "updatedOn": 1754122684.229
        }]"#,
    )
    .unwrap();
    std::fs::write(
        saved.path().join("conflictforecast_ons_armedconf_03.csv"),
        "isocode,period,forecast\nAFG,2010,0.12\n",
    )
    .unwrap();

    let err = run_pipeline(saved.path().to_path_buf()).await.unwrap_err();
    assert_eq!(err.category(), "period");
}
