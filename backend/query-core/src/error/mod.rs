pub mod auth;
pub mod config;
pub mod query;
pub mod transport;

pub use auth::AuthError;
pub use config::ConfigError;
pub use query::QueryError;
pub use transport::TransportError;

