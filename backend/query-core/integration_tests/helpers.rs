//! Test helpers for HTTP integration tests.
//!
//! Every test gets its own wiremock server that plays both the identity
//! endpoint and the Power BI dataset.

use query_core::config::{
    API_BASE_ENV, AUTHORITY_HOST_ENV, CLIENT_ID_ENV, CLIENT_SECRET_ENV, DATASET_ID_ENV,
    TENANT_ID_ENV,
};
use query_core::PowerBiConfig;

use std::collections::HashMap;

use serde_json::{Value, json};
use wiremock::MockServer;

pub const TEST_TENANT: &str = "tenant-1";
pub const TEST_CLIENT_ID: &str = "app-id";
pub const TEST_CLIENT_SECRET: &str = "s3cr3t";
pub const TEST_DATASET: &str = "dataset-9";

pub const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";
pub const QUERY_PATH: &str = "/v1.0/myorg/datasets/dataset-9/executeQueries";

/// Config pointing both endpoints at `server`.
pub fn config_for(server: &MockServer) -> PowerBiConfig {
    config_with_hosts(&server.uri(), &format!("{}/v1.0/myorg", server.uri()))
}

pub fn config_with_hosts(authority_host: &str, api_base: &str) -> PowerBiConfig {
    let vars = HashMap::from([
        (TENANT_ID_ENV, TEST_TENANT.to_string()),
        (CLIENT_ID_ENV, TEST_CLIENT_ID.to_string()),
        (CLIENT_SECRET_ENV, TEST_CLIENT_SECRET.to_string()),
        (DATASET_ID_ENV, TEST_DATASET.to_string()),
        (AUTHORITY_HOST_ENV, authority_host.to_string()),
        (API_BASE_ENV, api_base.to_string()),
    ]);

    PowerBiConfig::from_lookup(|name| vars.get(name).cloned()).expect("valid test config")
}

pub fn token_body(token: &str) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "ext_expires_in": 3599,
        "access_token": token
    })
}

pub fn sales_body() -> Value {
    json!({
        "results": [{
            "tables": [{
                "rows": [
                    {"Year": 2022, "Total": 500},
                    {"Year": 2023, "Total": 650}
                ]
            }]
        }]
    })
}

pub fn sales_rows() -> Value {
    json!([{"Year": 2022, "Total": 500}, {"Year": 2023, "Total": 650}])
}

/// Base URL of a local port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
