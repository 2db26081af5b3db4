//! Errors raised while obtaining a credential from the identity endpoint.
//!
//! - HTTP status codes stored directly (not parsed from strings)
//! - All errors include ErrorLocation for debugging
//! - `#[track_caller]` for automatic location capture

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Identity Rejected Error: HTTP {status_code} - {message} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Identity Network Error: {message} {location}")]
    Network {
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Identity Response Error: {message} {location}")]
    InvalidResponse {
        message: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    /// Create from reqwest error with proper categorization.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        // Check for specific error types BEFORE converting to string
        let is_timeout = error.is_timeout();
        let is_connection = error.is_connect();

        if !is_timeout
            && !is_connection
            && let Some(status) = error.status()
        {
            return AuthError::Rejected {
                status_code: HttpStatusCode(status.as_u16()),
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        AuthError::Network {
            message: error.to_string(),
            is_timeout,
            is_connection,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn from_http_response(status_code: u16, body: impl Into<String>) -> Self {
        AuthError::Rejected {
            status_code: HttpStatusCode(status_code),
            message: body.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        AuthError::InvalidResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }

    pub fn error_category(&self) -> &'static str {
        match self {
            AuthError::Rejected { .. } => "rejected",
            AuthError::Network {
                is_timeout: true, ..
            } => "timeout",
            AuthError::Network {
                is_connection: true,
                ..
            } => "connection",
            AuthError::Network { .. } => "network",
            AuthError::InvalidResponse { .. } => "invalid_response",
        }
    }
}
