pub mod cli;
pub mod error;
pub mod logger;


/// Exit code when the query ran and returned rows.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when the query failed (error envelope printed).
pub const EXIT_QUERY_FAILED: u8 = 1;
/// Exit code when the tool could not start (config, logger, input).
pub const EXIT_SETUP_FAILED: u8 = 2;
