//! Command handlers
//!
//! Coordinates between CLI arguments and the core pipeline: one handler
//! per subcommand, each returning the top-level `Result` so any pipeline
//! failure aborts the process with a non-zero exit.

use std::path::Path;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::app::{
    ClientConfig, EconaiClient, HdxClient, Pipeline, PipelineState, RetrieveOptions, Retriever,
};
use crate::cli::{RunArgs, StateAction, StateArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle the run command
///
/// Fetches and classifies the latest publication, compares the aggregated
/// watermark against persisted state, and publishes dataset, resources
/// and showcase when upstream content has changed.
pub async fn handle_run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    args.validate().map_err(AppError::generic)?;
    let config = AppConfig::load(config_path)?;

    let temp_dir = tempfile::tempdir()?;
    let client = EconaiClient::with_config(ClientConfig::default())?;
    let retriever = Retriever::new(
        client,
        &config.econai.base_url,
        &config.econai.latest_path,
        temp_dir.path(),
        RetrieveOptions {
            save: args.save,
            use_saved: args.use_saved,
            saved_dir: args
                .saved_dir
                .unwrap_or_else(|| config.paths.saved_dir.clone()),
        },
    )?;

    let spinner = pipeline_spinner();
    let pipeline = Pipeline::new(&retriever);
    let output = pipeline.generate_dataset_and_showcase().await;
    spinner.finish_and_clear();
    let output = output?;

    info!(
        "Assembled dataset '{}' with {} resources",
        output.dataset.name(),
        output.dataset.resources().len()
    );

    let Some(latest_modified) = output.latest_modified else {
        warn!("Listing contained no files; nothing to publish");
        return Ok(());
    };

    let state_path = match &config.paths.state_file {
        Some(path) => path.clone(),
        None => PipelineState::default_path()?,
    };
    let mut state = PipelineState::load(state_path)?;
    if latest_modified <= state.get() {
        info!(
            "Upstream unchanged since {} - dataset left as-is",
            state.get()
        );
        return Ok(());
    }

    let mut dataset = output.dataset;
    dataset.update_from_yaml(&config.hdx.static_metadata)?;

    if args.dry_run {
        println!("Dry run: would publish the following resources");
        for resource in dataset.resources() {
            println!("  {:<45} {}", resource.name, resource.description);
        }
        if let Some(date) = dataset.get("dataset_date") {
            println!("  time period: {date}");
        }
        println!("  watermark: {latest_modified}");
        return Ok(());
    }

    let http = ClientConfig::default().build_http_client()?;
    let hdx = HdxClient::from_env(http, &config.hdx.site_url)?;
    hdx.upsert_dataset(&dataset).await?;
    hdx.upsert_showcase(&output.showcase, dataset.name()).await?;

    state.set(latest_modified)?;
    info!("Published; watermark advanced to {}", latest_modified);
    Ok(())
}

/// Handle the state command
pub async fn handle_state(args: StateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let state_path = match &config.paths.state_file {
        Some(path) => path.clone(),
        None => PipelineState::default_path()?,
    };
    let mut state = PipelineState::load(state_path)?;

    match args.action {
        StateAction::Show => {
            if state.get() == DateTime::<Utc>::UNIX_EPOCH {
                println!("No watermark recorded ({})", state.path().display());
            } else {
                println!("{}", state.get());
            }
        }
        StateAction::Clear => {
            state.clear()?;
            println!("Watermark cleared");
        }
        StateAction::Set { timestamp } => {
            let value = DateTime::parse_from_rfc3339(timestamp.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AppError::generic(format!("Invalid timestamp: {e}")))?;
            state.set(value)?;
            println!("Watermark set to {value}");
        }
    }
    Ok(())
}

/// Spinner shown while the pipeline fetches and scans files
fn pipeline_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message("Fetching latest publication...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}
