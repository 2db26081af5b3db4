//! Power BI DAX query client with single-shot credential refresh.
//!
//! The flow is: acquire a bearer token from the identity endpoint, send the
//! query to the dataset, and if the dataset rejects the token (401/403)
//! replace it once and resend the same query. Anything else is surfaced to
//! the caller unchanged.

pub mod config;
pub mod error;
pub mod identity;
pub mod powerbi;
pub mod query_client;
pub mod tool;

#[cfg(test)]
mod tests;

pub use config::PowerBiConfig;
pub use identity::{ClientCredentialsProvider, CredentialSource};
pub use powerbi::{PowerBiTransport, QueryTransport};
pub use query_client::{AuthenticatedQueryClient, PowerBiQueryClient, QueryOutcome};
pub use tool::run_dax_query;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const POWERBI_API_HOST: &str = "https://api.powerbi.com";
pub const DEFAULT_API_BASE: &str = const_format::concatcp!(POWERBI_API_HOST, "/v1.0/myorg");
pub const DEFAULT_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";
