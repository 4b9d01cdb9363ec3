//! Command-line argument parsing
//!
//! Defines the CLI structure using clap derive macros: a `run` command
//! that executes the publication pipeline and a `state` command for
//! inspecting and manipulating the change-detection watermark.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// EconAI fetcher - publish ConflictForecast data on HDX
#[derive(Parser, Debug)]
#[command(
    name = "econai_fetcher",
    version,
    about = "Publish the latest ConflictForecast (EconAI) publication as an HDX dataset",
    long_about = "A batch tool that fetches the latest ConflictForecast publication, classifies \
its files into dataset resources, aggregates the covered time period, and upserts the dataset \
and its showcase on the Humanitarian Data Exchange when upstream content has changed."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the publication pipeline
    Run(RunArgs),

    /// Inspect or modify the change-detection watermark
    State(StateArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Keep a copy of every download in the saved-data directory
    #[arg(long)]
    pub save: bool,

    /// Read from the saved-data directory instead of the network
    #[arg(long)]
    pub use_saved: bool,

    /// Saved-data directory (defaults to the configured path)
    #[arg(long, value_name = "DIR")]
    pub saved_dir: Option<PathBuf>,

    /// Build everything but skip catalog submission and state update
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for watermark state management
#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub action: StateAction,
}

/// Watermark state actions
#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Show the persisted watermark
    Show,

    /// Remove the persisted watermark (forces the next run to publish)
    Clear,

    /// Overwrite the watermark with an ISO-8601 date-time
    Set {
        /// New watermark value, e.g. 2025-08-02T08:18:05.449000Z
        #[arg(value_name = "TIMESTAMP")]
        timestamp: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl RunArgs {
    /// Reject contradictory saved-data flags
    pub fn validate(&self) -> Result<(), String> {
        if self.save && self.use_saved {
            return Err("Cannot specify both --save and --use-saved".to_string());
        }
        Ok(())
    }
}
