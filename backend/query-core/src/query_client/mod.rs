//! Query execution with single-shot credential refresh.
//!
//! # Protocol
//!
//! ```text
//! NoCredential -> Acquiring -> Querying -> Success
//!                                       -> AuthRetry -> ReAcquiring -> RequeryOnce -> Success | Failed
//!                                       -> Failed
//! ```
//!
//! At most two transport calls and at most one refresh per `execute`.
//!
//! # Concurrency
//!
//! The credential slot sits behind an `RwLock`, so each read and write is
//! atomic. The refresh sequence itself is not serialized: two callers that
//! both hit a 401 will both refresh, and the last write wins. Wrap the client
//! in a single owning task or an external mutex if that matters.

use crate::config::PowerBiConfig;
use crate::error::{AuthError, ConfigError, QueryError, TransportError};
use crate::identity::{ClientCredentialsProvider, CredentialSource};
use crate::powerbi::{PowerBiTransport, QueryTransport};

use common::ErrorLocation;
use models::{AccessToken, DaxQuery, QueryResult};

use std::panic::Location;
use std::time::Duration;

use log::{debug, error, info, warn};
use reqwest::Client;
use tokio::sync::RwLock;

/// Client wired to the real identity endpoint and Power BI REST API.
pub type PowerBiQueryClient = AuthenticatedQueryClient<ClientCredentialsProvider, PowerBiTransport>;

/// A successful query and whether it needed a credential refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: QueryResult,
    pub refreshed: bool,
}

pub struct AuthenticatedQueryClient<S, T> {
    source: S,
    transport: T,
    credential: RwLock<Option<AccessToken>>,
}

impl PowerBiQueryClient {
    /// Build a client whose identity and query calls share one HTTP client.
    pub fn from_config(config: &PowerBiConfig) -> Result<Self, ConfigError> {
        let client = build_http_client(config.timeout)?;
        let source = ClientCredentialsProvider::new(config, client.clone())?;
        let transport = PowerBiTransport::new(config, client)?;

        Ok(Self::new(source, transport))
    }
}

impl<S, T> AuthenticatedQueryClient<S, T>
where
    S: CredentialSource,
    T: QueryTransport,
{
    pub fn new(source: S, transport: T) -> Self {
        Self {
            source,
            transport,
            credential: RwLock::new(None),
        }
    }

    /// Start with a credential already cached.
    pub fn with_credential(self, token: AccessToken) -> Self {
        Self {
            credential: RwLock::new(Some(token)),
            ..self
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn has_credential(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Drop the cached credential; the next `execute` acquires a new one.
    pub async fn invalidate(&self) {
        if self.credential.write().await.take().is_some() {
            debug!("Cached access token discarded");
        }
    }

    /// One raw acquisition: no caching, no retry.
    pub async fn acquire_credential(&self) -> Result<AccessToken, AuthError> {
        self.source.acquire().await
    }

    /// Run `query`, refreshing the credential once on an authorization failure.
    ///
    /// # Errors
    /// - [`QueryError::AuthFailure`] if no credential could be obtained, either
    ///   up front or on the refresh
    /// - [`QueryError::RemoteFailure`] if the query failed for any other
    ///   reason, or failed again after the refresh
    pub async fn execute(&self, query: &DaxQuery) -> Result<QueryResult, QueryError> {
        self.execute_with_outcome(query)
            .await
            .map(|outcome| outcome.result)
    }

    /// Same as [`execute`](Self::execute), also reporting whether the
    /// credential was refreshed on the way to the rows.
    ///
    /// # Errors
    /// Identical to [`execute`](Self::execute).
    pub async fn execute_with_outcome(&self, query: &DaxQuery) -> Result<QueryOutcome, QueryError> {
        let token = match self.cached_credential().await {
            Some(token) => token,
            None => {
                info!("No access token cached, acquiring a new one");
                let token = self.source.acquire().await.map_err(|e| {
                    error!("Access token acquisition failed: {e}");
                    QueryError::auth_failure(false, e)
                })?;
                self.store(token.clone()).await;
                token
            }
        };

        match self.transport.send(query, &token).await {
            Ok(result) => {
                debug!("Query succeeded: {query}");
                Ok(QueryOutcome {
                    result,
                    refreshed: false,
                })
            }
            Err(e) if e.is_authorization_failure() => self.refresh_and_requery(query, e).await,
            Err(e) => {
                error!("Query failed: {e}");
                Err(QueryError::remote_failure(false, e))
            }
        }
    }

    async fn refresh_and_requery(
        &self,
        query: &DaxQuery,
        cause: TransportError,
    ) -> Result<QueryOutcome, QueryError> {
        warn!(
            "Access token rejected (HTTP {}), refreshing and retrying once",
            cause.status_code().unwrap_or_default()
        );
        self.invalidate().await;

        let fresh = self.source.acquire().await.map_err(|e| {
            error!("Access token refresh failed: {e}");
            QueryError::auth_failure(true, e)
        })?;
        self.store(fresh.clone()).await;

        match self.transport.send(query, &fresh).await {
            Ok(result) => {
                info!("Query succeeded after token refresh");
                Ok(QueryOutcome {
                    result,
                    refreshed: true,
                })
            }
            Err(e) => {
                if e.is_authorization_failure() {
                    // A rejected credential is never reused
                    self.invalidate().await;
                }
                error!("Query failed after token refresh: {e}");
                Err(QueryError::remote_failure(true, e))
            }
        }
    }

    async fn cached_credential(&self) -> Option<AccessToken> {
        self.credential.read().await.clone()
    }

    async fn store(&self, token: AccessToken) {
        *self.credential.write().await = Some(token);
    }
}

#[track_caller]
fn build_http_client(timeout: Duration) -> Result<Client, ConfigError> {
    let location = ErrorLocation::from(Location::caller());

    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient {
            location,
            reason: e.to_string(),
        })
}
