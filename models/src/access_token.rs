use common::RedactedSecret;

use std::time::Duration;

/// A bearer token issued by the identity endpoint.
///
/// Validity is unknown until the token is used. A token that caused an
/// authorization failure is dropped and replaced, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: RedactedSecret,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            secret: RedactedSecret::new(token),
            expires_in: None,
        }
    }

    /// Lifetime reported by the identity endpoint at issue time.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// Raw token for the `Authorization` header.
    #[inline]
    pub fn secret(&self) -> &str {
        self.secret.expose()
    }

    /// Token length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.secret.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}
