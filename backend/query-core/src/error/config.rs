use common::ErrorLocation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Missing Variable Error: {name} is not set {location}")]
    MissingVar {
        location: ErrorLocation,
        name: &'static str,
    },

    #[error("Config Invalid Value Error: {name}: {reason} {location}")]
    InvalidValue {
        location: ErrorLocation,
        name: &'static str,
        reason: String,
    },

    #[error("Config HTTP Client Error: {reason} {location}")]
    HttpClient {
        location: ErrorLocation,
        reason: String,
    },
}
