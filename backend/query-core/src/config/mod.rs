//! Connection settings for the identity endpoint and the Power BI dataset.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by [`load_dotenv`]. Empty values are treated as missing.

pub mod env;

pub use env::{EnvLoadResult, load_dotenv, load_dotenv_from};

use crate::error::ConfigError;
use crate::{DEFAULT_API_BASE, DEFAULT_AUTHORITY_HOST, DEFAULT_SCOPE};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::time::Duration;

use log::debug;
use url::Url;

pub const TENANT_ID_ENV: &str = "TENANT_ID";
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";
pub const DATASET_ID_ENV: &str = "DATASET_ID";
pub const AUTHORITY_HOST_ENV: &str = "POWERBI_AUTHORITY_HOST";
pub const API_BASE_ENV: &str = "POWERBI_API_BASE";
pub const SCOPE_ENV: &str = "POWERBI_SCOPE";
pub const TIMEOUT_SECS_ENV: &str = "POWERBI_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PowerBiConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: RedactedSecret,
    pub dataset_id: String,
    pub authority_host: Url,
    pub api_base: Url,
    pub scope: String,
    pub timeout: Duration,
}

impl PowerBiConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - A required variable is missing or empty
    /// - A URL override does not parse
    /// - The timeout is not a positive integer
    #[track_caller]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let tenant_id = required(&lookup, TENANT_ID_ENV)?;
        let client_id = required(&lookup, CLIENT_ID_ENV)?;
        let client_secret = RedactedSecret::new(required(&lookup, CLIENT_SECRET_ENV)?);
        let dataset_id = required(&lookup, DATASET_ID_ENV)?;

        let authority_host = parse_url(
            AUTHORITY_HOST_ENV,
            &lookup(AUTHORITY_HOST_ENV).unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
        )?;
        let api_base = parse_url(
            API_BASE_ENV,
            &lookup(API_BASE_ENV).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        )?;
        let scope = lookup(SCOPE_ENV).unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        let timeout = match lookup(TIMEOUT_SECS_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT_DURATION,
        };

        let config = Self {
            tenant_id,
            client_id,
            client_secret,
            dataset_id,
            authority_host,
            api_base,
            scope,
            timeout,
        };

        // Surface bad identifiers now rather than on the first query
        config.token_url()?;
        config.execute_queries_url()?;

        debug!(
            "Power BI config loaded (tenant {}, dataset {}, secret {} chars)",
            config.tenant_id,
            config.dataset_id,
            config.client_secret.len()
        );

        Ok(config)
    }

    /// `{authority_host}/{tenant_id}/oauth2/v2.0/token`
    #[track_caller]
    pub fn token_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.as_str().trim_end_matches('/'),
            self.tenant_id
        );
        parse_url(TENANT_ID_ENV, &raw)
    }

    /// `{api_base}/datasets/{dataset_id}/executeQueries`
    #[track_caller]
    pub fn execute_queries_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}/datasets/{}/executeQueries",
            self.api_base.as_str().trim_end_matches('/'),
            self.dataset_id
        );
        parse_url(DATASET_ID_ENV, &raw)
    }
}

#[track_caller]
fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| ConfigError::MissingVar {
        location: ErrorLocation::from(Location::caller()),
        name,
    })
}

#[track_caller]
fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        location: ErrorLocation::from(Location::caller()),
        name,
        reason: format!("'{raw}' is not a valid URL: {e}"),
    })
}

#[track_caller]
fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            location: ErrorLocation::from(Location::caller()),
            name: TIMEOUT_SECS_ENV,
            reason: format!("'{raw}' is not a positive number of seconds"),
        }),
    }
}
