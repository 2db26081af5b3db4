//! Errors raised by a single `executeQueries` round-trip.

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    /// The dataset refused the bearer credential (401/403).
    #[error("Unauthorized Error: HTTP {status_code} - {message} {location}")]
    Unauthorized {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP Error: HTTP {status_code} - {message} {location}")]
    Http {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Network Error: {message} {location}")]
    Network {
        message: String,
        is_timeout: bool,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },
}

impl TransportError {
    /// Classify a non-success response by its status code.
    #[track_caller]
    pub fn from_http_response(status_code: u16, body: impl Into<String>) -> Self {
        let status_code = HttpStatusCode(status_code);
        let location = ErrorLocation::from(Location::caller());

        if status_code.is_authorization_failure() {
            TransportError::Unauthorized {
                status_code,
                message: body.into(),
                location,
            }
        } else {
            TransportError::Http {
                status_code,
                message: body.into(),
                location,
            }
        }
    }

    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let is_timeout = error.is_timeout();
        let is_connection = error.is_connect();

        if !is_timeout
            && !is_connection
            && let Some(status) = error.status()
        {
            return TransportError::from_http_response(status.as_u16(), error.to_string());
        }

        if error.is_decode() {
            return TransportError::decode(error.to_string());
        }

        TransportError::Network {
            message: error.to_string(),
            is_timeout,
            is_connection,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        TransportError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this failure warrants replacing the credential.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, TransportError::Unauthorized { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Unauthorized { status_code, .. }
            | TransportError::Http { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }

    pub fn error_category(&self) -> &'static str {
        match self {
            TransportError::Unauthorized { .. } => "unauthorized",
            TransportError::Http { status_code, .. } if status_code.is_client_error() => {
                "client_error"
            }
            TransportError::Http { status_code, .. } if status_code.is_server_error() => {
                "server_error"
            }
            TransportError::Http { .. } => "http",
            TransportError::Network {
                is_timeout: true, ..
            } => "timeout",
            TransportError::Network {
                is_connection: true,
                ..
            } => "connection",
            TransportError::Network { .. } => "network",
            TransportError::Decode { .. } => "decode",
        }
    }
}
