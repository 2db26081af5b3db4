//! Domain models for the Power BI query client.
//!
//! This crate contains pure data structures: the bearer credential, the DAX
//! query, the rows that come back, and the tool response envelope handed to
//! agent callers. Models carry validation but no I/O.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **query-core**: Credential acquisition, transport and refresh-and-retry
//! - **dax-query**: CLI wiring everything together

pub mod access_token;
pub mod dax_query;
pub mod error;
pub mod query_result;
pub mod tool_response;

#[cfg(test)]
mod tests;

pub use access_token::AccessToken;
pub use dax_query::DaxQuery;
pub use error::model_error::ModelError;
pub use query_result::{QueryResult, Row};
pub use tool_response::{ToolResponse, ToolStatus};

pub use common::ErrorLocation;
