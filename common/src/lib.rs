//! Shared building blocks for the Power BI query workspace.
//!
//! Everything here is domain-agnostic plumbing that both the data models and
//! the query client lean on:
//!
//! - [`ErrorLocation`]: file/line/column captured at error construction
//! - [`HttpStatusCode`]: status categorization for retry decisions
//! - [`RedactedSecret`]: secrets that never leak through `Debug` or logs

pub mod error;
pub mod http_status;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
