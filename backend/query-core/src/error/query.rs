//! Outcome errors of `AuthenticatedQueryClient::execute`.
//!
//! Two kinds only. `AuthFailure` means no usable credential could be
//! obtained, so retrying with fresh configuration may help. `RemoteFailure`
//! means the dataset (or the network in between) failed the query itself.

use crate::error::{AuthError, TransportError};

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

const ACQUIRE_FAILED_MESSAGE: &str = "Failed to get access token";
const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh access token";
const QUERY_FAILED_MESSAGE: &str = "Error querying Power BI dataset";
const REQUERY_FAILED_MESSAGE: &str = "Failed querying after token refresh";

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("Auth Failure: {message} {location}")]
    AuthFailure {
        message: String,
        after_refresh: bool,
        #[source]
        source: AuthError,
        location: ErrorLocation,
    },

    #[error("Remote Failure: {message} {location}")]
    RemoteFailure {
        message: String,
        after_refresh: bool,
        #[source]
        source: TransportError,
        location: ErrorLocation,
    },
}

impl QueryError {
    #[track_caller]
    pub fn auth_failure(after_refresh: bool, source: AuthError) -> Self {
        let message = if after_refresh {
            REFRESH_FAILED_MESSAGE
        } else {
            ACQUIRE_FAILED_MESSAGE
        };

        QueryError::AuthFailure {
            message: String::from(message),
            after_refresh,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn remote_failure(after_refresh: bool, source: TransportError) -> Self {
        let message = if after_refresh {
            REQUERY_FAILED_MESSAGE
        } else {
            QUERY_FAILED_MESSAGE
        };

        QueryError::RemoteFailure {
            message: String::from(message),
            after_refresh,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, QueryError::AuthFailure { .. })
    }

    pub fn is_remote_failure(&self) -> bool {
        matches!(self, QueryError::RemoteFailure { .. })
    }

    /// Whether the failure happened on the refresh path.
    pub fn after_refresh(&self) -> bool {
        match self {
            QueryError::AuthFailure { after_refresh, .. }
            | QueryError::RemoteFailure { after_refresh, .. } => *after_refresh,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            QueryError::AuthFailure { source, .. } => source.status_code(),
            QueryError::RemoteFailure { source, .. } => source.status_code(),
        }
    }

    pub fn error_category(&self) -> &'static str {
        match self {
            QueryError::AuthFailure { .. } => "auth_failure",
            QueryError::RemoteFailure { .. } => "remote_failure",
        }
    }

    /// Human-readable message including the underlying cause.
    pub fn detailed_message(&self) -> String {
        match self {
            QueryError::AuthFailure {
                message, source, ..
            } => format!("{message}: {source}"),
            QueryError::RemoteFailure {
                message, source, ..
            } => format!("{message}: {source}"),
        }
    }
}
