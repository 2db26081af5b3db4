use crate::helpers::{QUERY_PATH, config_for, sales_body, sales_rows};

use models::{AccessToken, DaxQuery};
use query_core::error::TransportError;
use query_core::{PowerBiTransport, QueryTransport};

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> PowerBiTransport {
    PowerBiTransport::new(&config_for(server), Client::new()).expect("transport")
}

fn sales_query() -> DaxQuery {
    DaxQuery::new("EVALUATE Sales").expect("valid query")
}

/// **VALUE**: Verifies the bearer header and JSON body sent to executeQueries.
///
/// **WHY THIS MATTERS**: This is the whole remote contract. A missing `Bearer ` prefix yields a
/// 401 that the client would then misread as an expired token.
///
/// **BUG THIS CATCHES**: Would catch header or body shape regressions.
#[tokio::test]
async fn given_valid_token_when_sending_then_posts_bearer_and_query_body() {
    // GIVEN: A dataset that only answers the exact request
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("authorization", "Bearer good-token"))
        .and(body_json(json!({
            "queries": [{"query": "EVALUATE Sales"}],
            "serializerSettings": {"includeNulls": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sales_body()))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN
    let result = transport(&server)
        .send(&sales_query(), &AccessToken::new("good-token"))
        .await
        .expect("rows");

    // THEN: Rows unchanged, in order
    assert_eq!(result.into_value(), sales_rows());
}

/// **VALUE**: Verifies that 401 and 403 come back as Unauthorized.
///
/// **WHY THIS MATTERS**: Only Unauthorized triggers the refresh.
///
/// **BUG THIS CATCHES**: Would catch if the transport collapses all HTTP errors into one variant.
#[tokio::test]
async fn given_auth_rejection_when_sending_then_returns_unauthorized() {
    for code in [401u16, 403] {
        // GIVEN
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;

        // WHEN
        let err = transport(&server)
            .send(&sales_query(), &AccessToken::new("expired"))
            .await
            .expect_err("must fail");

        // THEN
        assert!(err.is_authorization_failure(), "{code}: {err:?}");
        assert_eq!(err.status_code(), Some(code));
    }
}

/// **VALUE**: Verifies that a 400 is an Http error carrying the Power BI error body.
///
/// **WHY THIS MATTERS**: The body holds the DAX parser message the user needs to fix the query.
///
/// **BUG THIS CATCHES**: Would catch if the body is discarded or 400 is treated as auth failure.
#[tokio::test]
async fn given_bad_query_when_sending_then_returns_http_error_with_body() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "DatasetExecuteQueriesError", "message": "Query (1, 10) syntax error"}
        })))
        .mount(&server)
        .await;

    // WHEN
    let err = transport(&server)
        .send(&sales_query(), &AccessToken::new("good"))
        .await
        .expect_err("must fail");

    // THEN
    match err {
        TransportError::Http {
            status_code,
            message,
            ..
        } => {
            assert_eq!(status_code.0, 400);
            assert!(message.contains("syntax error"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn given_non_json_success_when_sending_then_returns_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&sales_query(), &AccessToken::new("good"))
        .await
        .expect_err("must fail");

    assert_eq!(err.error_category(), "decode");
}

#[tokio::test]
async fn given_server_error_when_sending_then_returns_server_error_category() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(&sales_query(), &AccessToken::new("good"))
        .await
        .expect_err("must fail");

    assert_eq!(err.error_category(), "server_error");
    assert!(!err.is_authorization_failure());
}

/// **VALUE**: Verifies that rows come off the wire with their columns in the order sent.
///
/// **WHY THIS MATTERS**: The envelope printed by the CLI is read as a table. Reordered columns
/// turn `Year, Total` into `Total, Year` for every result.
///
/// **BUG THIS CATCHES**: Would catch a sorted JSON map anywhere between the HTTP body and the
/// serialized result.
#[tokio::test]
async fn given_unsorted_columns_on_wire_when_sending_then_serialized_rows_keep_column_order() {
    // GIVEN: A raw body whose column order is not alphabetical
    let server = MockServer::start().await;
    let raw = r#"{"results":[{"tables":[{"rows":[{"Year":2022,"Total":500},{"Year":2023,"Total":650}]}]}]}"#;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
        .mount(&server)
        .await;

    // WHEN
    let result = transport(&server)
        .send(&sales_query(), &AccessToken::new("good"))
        .await
        .expect("rows");

    // THEN
    assert_eq!(
        serde_json::to_string(&result).expect("serializes"),
        r#"[{"Year":2022,"Total":500},{"Year":2023,"Total":650}]"#
    );
}
