use crate::helpers::{TOKEN_PATH, closed_port_url, config_for, config_with_hosts, token_body};

use query_core::error::AuthError;
use query_core::{ClientCredentialsProvider, CredentialSource, PowerBiConfig};

use std::time::Duration;

use reqwest::Client;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(config: &PowerBiConfig) -> ClientCredentialsProvider {
    ClientCredentialsProvider::new(config, Client::new()).expect("provider")
}

/// **VALUE**: Verifies the client credentials grant request on the wire.
///
/// **WHY THIS MATTERS**: The identity platform rejects JSON bodies and unknown grant types. An
/// unencoded scope URL is read as a different scope and yields a token the dataset refuses.
///
/// **BUG THIS CATCHES**: Would catch a wrong content type, a missing form field, or an
/// unencoded scope.
#[tokio::test]
async fn given_identity_endpoint_when_acquiring_then_posts_form_encoded_grant() {
    // GIVEN: An identity endpoint that only answers a correctly shaped grant
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=app-id"))
        .and(body_string_contains("client_secret=s3cr3t"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fanalysis.windows.net%2Fpowerbi%2Fapi%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("issued-token")))
        .expect(1)
        .mount(&server)
        .await;

    // WHEN: Acquiring
    let token = provider(&config_for(&server))
        .acquire()
        .await
        .expect("token issued");

    // THEN: Token and lifetime decoded
    assert_eq!(token.secret(), "issued-token");
    assert_eq!(token.expires_in(), Some(Duration::from_secs(3599)));
}

/// **VALUE**: Verifies that an identity rejection surfaces as AuthError::Rejected with its status.
///
/// **WHY THIS MATTERS**: AADSTS error bodies explain what is wrong with the app registration.
///
/// **BUG THIS CATCHES**: Would catch if non-2xx responses are parsed as tokens or the body is lost.
#[tokio::test]
async fn given_identity_rejects_when_acquiring_then_returns_rejected_with_body() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("AADSTS7000215: Invalid client secret"),
        )
        .mount(&server)
        .await;

    // WHEN
    let err = provider(&config_for(&server))
        .acquire()
        .await
        .expect_err("must fail");

    // THEN
    match err {
        AuthError::Rejected {
            status_code,
            message,
            ..
        } => {
            assert_eq!(status_code.0, 401);
            assert!(message.contains("AADSTS7000215"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn given_success_without_token_when_acquiring_then_returns_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let err = provider(&config_for(&server))
        .acquire()
        .await
        .expect_err("must fail");

    assert!(matches!(err, AuthError::InvalidResponse { .. }));
}

#[tokio::test]
async fn given_empty_token_when_acquiring_then_returns_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("")))
        .mount(&server)
        .await;

    let err = provider(&config_for(&server))
        .acquire()
        .await
        .expect_err("must fail");

    assert_eq!(err.error_category(), "invalid_response");
}

/// **VALUE**: Verifies that an unreachable identity endpoint is a network error, not a rejection.
///
/// **WHY THIS MATTERS**: Operators need to tell "wrong secret" from "no route to login host".
///
/// **BUG THIS CATCHES**: Would catch if connection failures are categorized as HTTP rejections.
#[tokio::test]
async fn given_unreachable_identity_endpoint_when_acquiring_then_returns_network_error() {
    // GIVEN: An authority host with nothing listening
    let unreachable = closed_port_url();
    let config = config_with_hosts(&unreachable, &unreachable);

    // WHEN
    let err = provider(&config).acquire().await.expect_err("must fail");

    // THEN
    assert!(matches!(err, AuthError::Network { .. }), "got {err:?}");
    assert_eq!(err.status_code(), None);
}
