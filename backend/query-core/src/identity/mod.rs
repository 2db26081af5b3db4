//! Credential acquisition.
//!
//! [`CredentialSource`] is the `acquireCredential` seam: one call, one
//! attempt, no caching. Retry policy belongs to the query client.

use crate::config::PowerBiConfig;
use crate::error::{AuthError, ConfigError};

use common::RedactedSecret;
use models::AccessToken;

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;
use url::form_urlencoded::Serializer as FormSerializer;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Issues bearer credentials for the remote query API.
pub trait CredentialSource: Send + Sync {
    /// Fetch a brand-new credential.
    ///
    /// # Errors
    /// Returns [`AuthError`] if the identity endpoint is unreachable or
    /// rejects the application credentials.
    fn acquire(&self) -> impl Future<Output = Result<AccessToken, AuthError>> + Send;
}

/// Body of a successful token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth2 client credentials grant against the Microsoft identity platform.
#[derive(Debug, Clone)]
pub struct ClientCredentialsProvider {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: RedactedSecret,
    scope: String,
}

impl ClientCredentialsProvider {
    pub fn new(config: &PowerBiConfig, client: Client) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            token_url: config.token_url()?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        })
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    fn form_body(&self) -> String {
        FormSerializer::new(String::new())
            .append_pair("grant_type", CLIENT_CREDENTIALS_GRANT)
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", self.client_secret.expose())
            .append_pair("scope", &self.scope)
            .finish()
    }
}

impl CredentialSource for ClientCredentialsProvider {
    async fn acquire(&self) -> Result<AccessToken, AuthError> {
        debug!("Requesting access token from {}", self.token_url);

        let response = self
            .client
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(self.form_body())
            .send()
            .await
            .map_err(|e| AuthError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::from_http_response(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::invalid_response(e.to_string()))?;

        if body.access_token.is_empty() {
            return Err(AuthError::invalid_response("access_token is empty"));
        }

        let mut token = AccessToken::new(body.access_token);
        if let Some(secs) = body.expires_in {
            token = token.with_expires_in(Duration::from_secs(secs));
        }

        info!(
            "Access token acquired ({} chars, expires in {:?})",
            token.len(),
            token.expires_in()
        );

        Ok(token)
    }
}
