mod helpers;
mod identity;
mod powerbi;
mod query_client;
