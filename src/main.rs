//! EconAI fetcher CLI application
//!
//! Batch entry point: fetch the latest ConflictForecast publication,
//! classify its files, aggregate the time period, and publish the dataset
//! and showcase on HDX when upstream content has changed.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use econai_fetcher::cli::{handle_run, handle_state, Cli, Commands};
use econai_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("EconAI fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = cli.global.config.as_deref();
    match cli.command {
        Commands::Run(args) => {
            info!("Executing run command");
            handle_run(args, config_path).await
        }
        Commands::State(args) => {
            info!("Executing state command");
            handle_state(args, config_path).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("econai_fetcher={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();
}
