use super::fakes::{
    Call, bad_request, forbidden, identity_down, query, sales_rows, scripted_client, token,
    unauthorized,
};
use crate::error::{QueryError, TransportError};

use models::AccessToken;

use serde_json::json;

/// **VALUE**: Verifies that the first call acquires a credential before any query is sent.
///
/// **WHY THIS MATTERS**: Sending a query without a credential guarantees a 401 and wastes the
/// single refresh on what should have been the initial acquisition.
///
/// **BUG THIS CATCHES**: Would catch if the empty-slot check is skipped or runs after the send.
#[tokio::test]
async fn given_no_cached_credential_when_executing_then_acquires_before_querying() {
    // GIVEN: An empty client whose identity and dataset both succeed
    let (client, log) = scripted_client(vec![token("token-a")], vec![Ok(sales_rows())]);

    // WHEN: Executing a query
    let result = client.execute(&query("EVALUATE Sales")).await;

    // THEN: Acquire happens first, then exactly one query with that token
    assert!(result.is_ok());
    assert_eq!(
        log.calls(),
        vec![
            Call::Acquire,
            Call::Query {
                token: "token-a".into(),
                query: "EVALUATE Sales".into()
            }
        ]
    );
    assert!(client.has_credential().await, "Credential should be cached");
}

/// **VALUE**: Verifies that a failed first acquisition returns AuthFailure with zero queries.
///
/// **WHY THIS MATTERS**: Without a credential there is nothing to send. Retrying acquisition here
/// would hammer the identity endpoint with known-bad application credentials.
///
/// **BUG THIS CATCHES**: Would catch if the client retries acquisition or sends an unauthorized
/// query anyway.
#[tokio::test]
async fn given_identity_rejects_when_executing_then_returns_auth_failure_without_querying() {
    // GIVEN: Identity endpoint rejects the application
    let (client, log) = scripted_client(vec![identity_down()], vec![]);

    // WHEN: Executing
    let result = client.execute(&query("EVALUATE Sales")).await;

    // THEN: AuthFailure, one acquire, no query
    let err = result.expect_err("must fail");
    assert!(err.is_auth_failure());
    assert!(!err.after_refresh());
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(log.acquires(), 1);
    assert_eq!(log.queries(), 0);
    assert!(!client.has_credential().await);
}

/// **VALUE**: Verifies that a first-attempt success with a cached credential makes no identity call.
///
/// **WHY THIS MATTERS**: Acquiring on every call would multiply latency and hit identity endpoint
/// rate limits.
///
/// **BUG THIS CATCHES**: Would catch if the cache is ignored or cleared after success.
#[tokio::test]
async fn given_cached_credential_when_query_succeeds_then_no_acquisition_happens() {
    // GIVEN: A client with a cached credential
    let (client, log) = scripted_client(vec![], vec![Ok(sales_rows()), Ok(sales_rows())]);
    let client = client.with_credential(AccessToken::new("cached"));

    // WHEN: Executing twice
    client.execute(&query("EVALUATE Sales")).await.expect("first");
    client.execute(&query("EVALUATE Sales")).await.expect("second");

    // THEN: Zero acquisitions, both queries used the cached token
    assert_eq!(log.acquires(), 0);
    assert_eq!(log.query_tokens(), vec!["cached", "cached"]);
}

/// **VALUE**: Verifies the happy refresh path: 401, refresh, requery succeeds.
///
/// **WHY THIS MATTERS**: Tokens expire hourly. This path is what keeps long-running agents working
/// without surfacing a spurious failure to the user.
///
/// **BUG THIS CATCHES**: Would catch if the requery reuses the stale token, or if the client makes
/// more than two query calls or more than one refresh.
#[tokio::test]
async fn given_expired_credential_when_refresh_succeeds_then_requery_returns_rows() {
    // GIVEN: A stale cached token, a dataset that rejects it once, and a working identity endpoint
    let (client, log) = scripted_client(
        vec![token("fresh")],
        vec![unauthorized(), Ok(sales_rows())],
    );
    let client = client.with_credential(AccessToken::new("stale"));

    // WHEN: Executing
    let result = client.execute(&query("EVALUATE Sales")).await;

    // THEN: Rows returned; exactly two queries and one refresh; second query used the new token
    assert_eq!(result.expect("requery succeeds"), sales_rows());
    assert_eq!(log.queries(), 2);
    assert_eq!(log.acquires(), 1);
    assert_eq!(log.query_tokens(), vec!["stale", "fresh"]);
}

/// **VALUE**: Verifies that a 403 triggers the same refresh as a 401.
///
/// **WHY THIS MATTERS**: Power BI answers revoked or expired tokens with either code.
///
/// **BUG THIS CATCHES**: Would catch if only 401 is treated as an authorization failure.
#[tokio::test]
async fn given_forbidden_response_when_executing_then_refreshes_once() {
    // GIVEN: A dataset answering 403 then success
    let (client, log) = scripted_client(vec![token("fresh")], vec![forbidden(), Ok(sales_rows())]);
    let client = client.with_credential(AccessToken::new("stale"));

    // WHEN / THEN
    assert!(client.execute(&query("EVALUATE Sales")).await.is_ok());
    assert_eq!(log.acquires(), 1);
    assert_eq!(log.queries(), 2);
}

/// **VALUE**: Verifies that a failed refresh returns AuthFailure after exactly one query.
///
/// **WHY THIS MATTERS**: Callers use AuthFailure to decide that configuration (not the query) is
/// broken. Reporting RemoteFailure here would send them debugging the DAX text.
///
/// **BUG THIS CATCHES**: Would catch if refresh failure is mapped to RemoteFailure, or if the
/// client sends the query again with the rejected token.
#[tokio::test]
async fn given_expired_credential_when_refresh_fails_then_returns_auth_failure() {
    // GIVEN: A stale token and an identity endpoint that now rejects the app
    let (client, log) = scripted_client(vec![identity_down()], vec![unauthorized()]);
    let client = client.with_credential(AccessToken::new("stale"));

    // WHEN: Executing
    let err = client
        .execute(&query("EVALUATE Sales"))
        .await
        .expect_err("must fail");

    // THEN: AuthFailure on the refresh path; one query; stale token discarded
    assert!(matches!(err, QueryError::AuthFailure { after_refresh: true, .. }));
    assert_eq!(log.queries(), 1);
    assert_eq!(log.acquires(), 1);
    assert!(
        !client.has_credential().await,
        "Rejected credential must not stay cached"
    );
}

/// **VALUE**: Verifies that a second authorization failure after refresh stops with RemoteFailure.
///
/// **WHY THIS MATTERS**: A service principal without dataset permissions gets 403 for every fresh
/// token. Recursing would loop forever against the identity endpoint.
///
/// **BUG THIS CATCHES**: Would catch recursion into another refresh or a third query call.
#[tokio::test]
async fn given_refresh_succeeds_when_requery_is_unauthorized_again_then_returns_remote_failure() {
    // GIVEN: A dataset that rejects every token
    let (client, log) = scripted_client(vec![token("fresh")], vec![unauthorized(), forbidden()]);
    let client = client.with_credential(AccessToken::new("stale"));

    // WHEN: Executing
    let err = client
        .execute(&query("EVALUATE Sales"))
        .await
        .expect_err("must fail");

    // THEN: RemoteFailure carrying the second 403; no third query
    match &err {
        QueryError::RemoteFailure {
            after_refresh,
            source,
            ..
        } => {
            assert!(*after_refresh);
            assert!(matches!(source, TransportError::Unauthorized { .. }));
        }
        other => panic!("expected RemoteFailure, got {other:?}"),
    }
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(log.queries(), 2);
    assert_eq!(log.acquires(), 1);
    assert!(
        !client.has_credential().await,
        "A refreshed credential that was also rejected must not be reused"
    );
}

/// **VALUE**: Verifies that a non-authorization failure on the requery is RemoteFailure.
///
/// **WHY THIS MATTERS**: After a refresh, a 400 means the query itself is wrong; the new token is
/// still good and should stay cached for the next call.
///
/// **BUG THIS CATCHES**: Would catch if the fresh token is discarded on non-auth failures.
#[tokio::test]
async fn given_refresh_succeeds_when_requery_is_bad_request_then_keeps_fresh_credential() {
    // GIVEN: 401 then 400
    let (client, log) = scripted_client(vec![token("fresh")], vec![unauthorized(), bad_request()]);
    let client = client.with_credential(AccessToken::new("stale"));

    // WHEN
    let err = client
        .execute(&query("EVALUATE Nope"))
        .await
        .expect_err("must fail");

    // THEN
    assert!(err.is_remote_failure());
    assert!(err.after_refresh());
    assert_eq!(log.queries(), 2);
    assert!(client.has_credential().await);
}

/// **VALUE**: Verifies that a non-authorization failure on the first attempt never refreshes.
///
/// **WHY THIS MATTERS**: A malformed DAX query is the most common failure from LLM-generated
/// queries. Refreshing on it would double the latency of every bad query for nothing.
///
/// **BUG THIS CATCHES**: Would catch if every 4xx is treated as an authorization failure.
#[tokio::test]
async fn given_malformed_query_when_executing_then_returns_remote_failure_without_refresh() {
    // GIVEN: A cached token and a dataset that rejects the DAX
    let (client, log) = scripted_client(vec![], vec![bad_request()]);
    let client = client.with_credential(AccessToken::new("cached"));

    // WHEN
    let err = client
        .execute(&query("EVALUATE Nope"))
        .await
        .expect_err("must fail");

    // THEN: RemoteFailure, one query, zero refresh calls, token still cached
    assert!(matches!(err, QueryError::RemoteFailure { after_refresh: false, .. }));
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(log.acquires(), 0);
    assert_eq!(log.queries(), 1);
    assert!(client.has_credential().await);
}

/// **VALUE**: Verifies the canonical example: rows come back unchanged and in order.
///
/// **WHY THIS MATTERS**: The client is a pass-through. Any reshaping of rows breaks chart
/// rendering downstream.
///
/// **BUG THIS CATCHES**: Would catch if rows are sorted, deduplicated or re-keyed.
#[tokio::test]
async fn given_sales_query_when_executed_then_rows_are_returned_in_order() {
    // GIVEN
    let (client, _log) = scripted_client(vec![], vec![Ok(sales_rows())]);
    let client = client.with_credential(AccessToken::new("cached"));

    // WHEN
    let result = client
        .execute(&query("EVALUATE Sales"))
        .await
        .expect("succeeds");

    // THEN
    assert_eq!(
        result.into_value(),
        json!([{"Year": 2022, "Total": 500}, {"Year": 2023, "Total": 650}])
    );
}

/// **VALUE**: Verifies that a failed call does not poison later calls.
///
/// **WHY THIS MATTERS**: Each execute is independent; a transient identity outage must not
/// disable the client for the rest of the process lifetime.
///
/// **BUG THIS CATCHES**: Would catch if a failure leaves the client in a sticky error state.
#[tokio::test]
async fn given_previous_auth_failure_when_executing_again_then_acquires_and_succeeds() {
    // GIVEN: First acquisition fails, second succeeds
    let (client, log) = scripted_client(vec![identity_down(), token("later")], vec![Ok(sales_rows())]);

    // WHEN
    let first = client.execute(&query("EVALUATE Sales")).await;
    let second = client.execute(&query("EVALUATE Sales")).await;

    // THEN
    assert!(first.is_err());
    assert!(second.is_ok());
    assert_eq!(log.acquires(), 2);
    assert_eq!(log.query_tokens(), vec!["later"]);
}

#[tokio::test]
async fn given_cached_credential_when_invalidated_then_next_execute_acquires() {
    let (client, log) = scripted_client(vec![token("new")], vec![Ok(sales_rows())]);
    let client = client.with_credential(AccessToken::new("old"));

    client.invalidate().await;
    assert!(!client.has_credential().await);

    client.execute(&query("EVALUATE Sales")).await.expect("succeeds");
    assert_eq!(log.query_tokens(), vec!["new"]);
}

#[tokio::test]
async fn given_client_when_acquire_credential_called_then_does_not_touch_cache() {
    let (client, log) = scripted_client(vec![token("raw")], vec![]);

    let token = client.acquire_credential().await.expect("acquires");

    assert_eq!(token.secret(), "raw");
    assert_eq!(log.acquires(), 1);
    assert!(!client.has_credential().await);
}

/// **VALUE**: Verifies that the outcome reports whether a refresh happened.
///
/// **WHY THIS MATTERS**: The tool envelope words its success message from this flag.
///
/// **BUG THIS CATCHES**: Would catch if the flag is hard-coded or set on the first-attempt path.
#[tokio::test]
async fn given_first_and_refreshed_attempts_when_executing_with_outcome_then_flag_matches_path() {
    // GIVEN: One client answering first time, one whose cached token is rejected once
    let (direct, _) = scripted_client(vec![token("t")], vec![Ok(sales_rows())]);
    let (refreshed, _) = scripted_client(vec![token("fresh")], vec![unauthorized(), Ok(sales_rows())]);
    let refreshed = refreshed.with_credential(AccessToken::new("stale"));

    // WHEN
    let first = direct
        .execute_with_outcome(&query("EVALUATE Sales"))
        .await
        .expect("rows");
    let second = refreshed
        .execute_with_outcome(&query("EVALUATE Sales"))
        .await
        .expect("rows");

    // THEN
    assert!(!first.refreshed);
    assert!(second.refreshed);
    assert_eq!(first.result, second.result);
    assert_eq!(second.result, sales_rows());
}
