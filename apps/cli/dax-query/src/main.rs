use dax_query::cli::Args;
use dax_query::error::CliError;
use dax_query::logger::initialize as LoggerInitialize;
use dax_query::{EXIT_QUERY_FAILED, EXIT_SETUP_FAILED, EXIT_SUCCESS};

use common::ErrorLocation;
use query_core::config::{load_dotenv, load_dotenv_from};
use query_core::{PowerBiConfig, PowerBiQueryClient, run_dax_query};

use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::from(EXIT_SETUP_FAILED)
        }
    }
}

async fn run(args: Args) -> Result<u8, CliError> {
    let log_dir = args.resolved_log_dir();

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("dax-query starting");
    info!("Log directory: {}", log_dir.display());

    let env = match &args.env_file {
        Some(path) => load_dotenv_from(path),
        None => load_dotenv(),
    };
    debug!("Environment file loaded: {}", env.loaded);

    let text = args.query_text()?;

    let config = PowerBiConfig::from_env().map_err(|e| CliError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let client = PowerBiQueryClient::from_config(&config).map_err(|e| CliError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let response = run_dax_query(&client, &text).await;

    let rendered = if args.compact {
        serde_json::to_string(&response)
    } else {
        serde_json::to_string_pretty(&response)
    }
    .map_err(|e| CliError::Output {
        message: format!("Failed to render response: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    println!("{rendered}");

    if response.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_QUERY_FAILED)
    }
}
