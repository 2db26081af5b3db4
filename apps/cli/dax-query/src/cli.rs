//! Command-line arguments and query input.

use crate::error::CliError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

const APP_DIR_NAME: &str = "dax-query";
const LOG_DIR_NAME: &str = "logs";

/// Run one DAX query against a Power BI dataset and print the result envelope.
///
/// Credentials come from TENANT_ID, CLIENT_ID, CLIENT_SECRET and DATASET_ID,
/// optionally loaded from a .env file.
#[derive(Debug, Parser)]
#[command(name = "dax-query", version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["query", "file"])))]
pub struct Args {
    /// DAX query text, e.g. "EVALUATE Sales"
    pub query: Option<String>,

    /// Read the DAX query from a file
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Explicit .env file (default: ./.env, then next to the executable)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Directory for dax-query.log
    #[arg(long, value_name = "PATH", env = "DAX_QUERY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print the envelope on a single line
    #[arg(long)]
    pub compact: bool,
}

impl Args {
    /// Query text from the positional argument or `--file`.
    #[track_caller]
    pub fn query_text(&self) -> Result<String, CliError> {
        match (&self.query, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| CliError::Input {
                message: format!("Failed to read query file {}: {e}", path.display()),
                location: ErrorLocation::from(Location::caller()),
            }),
            (None, None) => Err(CliError::Input {
                message: String::from("No query given"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// `--log-dir`, else the platform local data directory, else the temp dir.
    pub fn resolved_log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }

        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME)
            .join(LOG_DIR_NAME)
    }
}
