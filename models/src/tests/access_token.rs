use crate::AccessToken;

use std::time::Duration;

/// **VALUE**: Verifies that an AccessToken never prints its bearer value.
///
/// **WHY THIS MATTERS**: The query client logs credential state on every refresh. A Debug leak
/// would put live Power BI tokens into log files.
///
/// **BUG THIS CATCHES**: Would catch if the token is stored as a plain String.
#[test]
fn given_access_token_when_debug_formatted_then_token_is_redacted() {
    // GIVEN: A token with a lifetime
    let token = AccessToken::new("eyJ0eXAiOiJKV1Qi").with_expires_in(Duration::from_secs(3599));

    // WHEN: Debug formatting
    let debug = format!("{:?}", token);

    // THEN: The raw token is hidden but the lifetime is visible
    assert!(!debug.contains("eyJ0eXAiOiJKV1Qi"));
    assert!(debug.contains("REDACTED"));
    assert_eq!(token.expires_in(), Some(Duration::from_secs(3599)));
}

#[test]
fn given_access_token_when_secret_read_then_returns_raw_value() {
    let token = AccessToken::new("abc");

    assert_eq!(token.secret(), "abc");
    assert_eq!(token.len(), 3);
    assert!(token.expires_in().is_none());
}
