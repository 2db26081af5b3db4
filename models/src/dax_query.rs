use crate::{ErrorLocation, ModelError};

use std::fmt;
use std::panic::Location;

/// Query text sent verbatim to the `executeQueries` endpoint.
///
/// The text is opaque; the only check is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaxQuery {
    text: String,
}

impl DaxQuery {
    #[track_caller]
    pub fn new(text: impl Into<String>) -> Result<Self, ModelError> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Query text cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { text })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DaxQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<&str> for DaxQuery {
    type Error = ModelError;

    #[track_caller]
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        DaxQuery::new(text)
    }
}
