//! Dataset query transport.
//!
//! [`QueryTransport`] sends one query with one credential and classifies the
//! outcome. It never retries and never touches the credential cache.

pub mod wire;

use crate::config::PowerBiConfig;
use crate::error::{ConfigError, TransportError};

use models::{AccessToken, DaxQuery, QueryResult};
use wire::{ExecuteQueriesRequest, ExecuteQueriesResponse};

use std::future::Future;
use std::time::Instant;

use log::{debug, info};
use reqwest::Client;
use url::Url;

pub trait QueryTransport: Send + Sync {
    /// Send `query` authorized by `token`.
    ///
    /// # Errors
    /// Returns [`TransportError::Unauthorized`] for 401/403 responses and
    /// another [`TransportError`] variant for every other failure.
    fn send(
        &self,
        query: &DaxQuery,
        token: &AccessToken,
    ) -> impl Future<Output = Result<QueryResult, TransportError>> + Send;
}

/// Power BI REST `executeQueries` client.
#[derive(Debug, Clone)]
pub struct PowerBiTransport {
    client: Client,
    url: Url,
    include_nulls: bool,
}

impl PowerBiTransport {
    pub fn new(config: &PowerBiConfig, client: Client) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            url: config.execute_queries_url()?,
            include_nulls: true,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl QueryTransport for PowerBiTransport {
    async fn send(
        &self,
        query: &DaxQuery,
        token: &AccessToken,
    ) -> Result<QueryResult, TransportError> {
        let body = ExecuteQueriesRequest::single(query.as_str(), self.include_nulls);
        let started = Instant::now();

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(token.secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!("executeQueries returned HTTP {}: {}", status.as_u16(), text);
            return Err(TransportError::from_http_response(status.as_u16(), text));
        }

        let payload: ExecuteQueriesResponse = response
            .json()
            .await
            .map_err(|e| TransportError::decode(e.to_string()))?;
        let rows = payload.into_first_table_rows()?;

        info!(
            "DAX query completed in {:.3}s ({} rows)",
            started.elapsed().as_secs_f64(),
            rows.len()
        );

        Ok(QueryResult::new(rows))
    }
}
