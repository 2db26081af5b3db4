use crate::helpers::{QUERY_PATH, TOKEN_PATH, config_for, sales_body, sales_rows, token_body};

use models::{DaxQuery, ToolStatus};
use query_core::error::QueryError;
use query_core::{PowerBiQueryClient, run_dax_query};

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sales_query() -> DaxQuery {
    DaxQuery::new("EVALUATE Sales").expect("valid query")
}

/// Identity endpoint issuing `token-a` on the first call and `token-b` afterwards.
async fn mount_rotating_tokens(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-a")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-b")))
        .expect(expected_calls.saturating_sub(1))
        .mount(server)
        .await;
}

/// **VALUE**: Verifies the full refresh flow over real HTTP.
///
/// **WHY THIS MATTERS**: This is the production scenario: a cached token expires, the dataset
/// answers 401, the client fetches a new token and replays the same query once.
///
/// **BUG THIS CATCHES**: Would catch if the requery reuses the rejected token, if the refresh
/// happens more than once, or if more than two queries hit the dataset.
#[tokio::test]
async fn given_expired_token_when_executing_then_refreshes_once_and_requeries() {
    // GIVEN: token-a is rejected, token-b is accepted
    let server = MockServer::start().await;
    mount_rotating_tokens(&server, 2).await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("authorization", "Bearer token-a"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("authorization", "Bearer token-b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sales_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = PowerBiQueryClient::from_config(&config_for(&server)).expect("client");

    // WHEN
    let result = client.execute(&sales_query()).await.expect("rows after refresh");

    // THEN: Rows returned; mock expectations verified on drop
    assert_eq!(result.into_value(), sales_rows());
    assert!(client.has_credential().await);
}

/// **VALUE**: Verifies that a working token is cached across calls.
///
/// **WHY THIS MATTERS**: One token per hour, not one token per query.
///
/// **BUG THIS CATCHES**: Would catch if the client forgets the token between calls.
#[tokio::test]
async fn given_successful_first_call_when_executing_again_then_reuses_token() {
    // GIVEN
    let server = MockServer::start().await;
    mount_rotating_tokens(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("authorization", "Bearer token-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sales_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = PowerBiQueryClient::from_config(&config_for(&server)).expect("client");

    // WHEN
    client.execute(&sales_query()).await.expect("first");
    client.execute(&sales_query()).await.expect("second");

    // THEN: expectations verified on drop (one token request, two queries)
}

/// **VALUE**: Verifies that a dataset rejecting every token stops after two queries.
///
/// **WHY THIS MATTERS**: A service principal missing dataset permissions must fail fast.
///
/// **BUG THIS CATCHES**: Would catch unbounded refresh loops.
#[tokio::test]
async fn given_dataset_rejects_all_tokens_when_executing_then_returns_remote_failure() {
    // GIVEN
    let server = MockServer::start().await;
    mount_rotating_tokens(&server, 2).await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let client = PowerBiQueryClient::from_config(&config_for(&server)).expect("client");

    // WHEN
    let err = client.execute(&sales_query()).await.expect_err("must fail");

    // THEN
    assert!(matches!(err, QueryError::RemoteFailure { after_refresh: true, .. }));
    assert_eq!(err.status_code(), Some(403));
}

/// **VALUE**: Verifies that a malformed query never reaches the identity endpoint twice.
///
/// **WHY THIS MATTERS**: Bad DAX is common; it must not cost a refresh.
///
/// **BUG THIS CATCHES**: Would catch if 400 triggers the refresh path.
#[tokio::test]
async fn given_bad_dax_when_executing_then_returns_remote_failure_without_refresh() {
    // GIVEN
    let server = MockServer::start().await;
    mount_rotating_tokens(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("syntax error"))
        .expect(1)
        .mount(&server)
        .await;

    let client = PowerBiQueryClient::from_config(&config_for(&server)).expect("client");

    // WHEN
    let err = client.execute(&sales_query()).await.expect_err("must fail");

    // THEN
    assert!(matches!(err, QueryError::RemoteFailure { after_refresh: false, .. }));
}

#[tokio::test]
async fn given_identity_down_when_run_as_tool_then_returns_error_envelope_without_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(sales_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = PowerBiQueryClient::from_config(&config_for(&server)).expect("client");

    let response = run_dax_query(&client, "EVALUATE Sales").await;

    assert_eq!(response.status, ToolStatus::Error);
    assert!(response.message.starts_with("Failed to get access token"));
}
