//! # Authorization-code flow shared by the OAuth providers
//!
//! [`begin`] builds the provider authorization URL with a random CSRF `state` and a
//! PKCE (S256) challenge. The state and verifier come back as a
//! [`PendingAuthorization`], which the router keeps in the server-side session under
//! [`PENDING_OAUTH_KEY`] for [`PENDING_TTL_SECS`]. On callback the pending entry is
//! removed, checked with [`PendingAuthorization::verify`], and its verifier is handed
//! to [`exchange_code`] to obtain an access token.
//!
//! Profile fetching is provider specific and lives in [`super::google`] and
//! [`super::github`]; both return an [`OAuthProfile`].

use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use serde::{Deserialize, Serialize};

use super::config::OAuthConfig;
use crate::error::AuthError;
use crate::models::Provider;

/// Session key holding the [`PendingAuthorization`] of an in-progress flow.
pub const PENDING_OAUTH_KEY: &str = "pending_oauth";

/// How long a started flow may take before its state is rejected.
pub const PENDING_TTL_SECS: i64 = 10 * 60;

/// Identity assertion returned by an OAuth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthProfile {
    /// Provider-side account id.
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// State kept between the redirect to the provider and its callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub provider: Provider,
    pub state: String,
    pub pkce_verifier: String,
    /// Unix timestamp (seconds).
    pub expires_at: i64,
}

impl PendingAuthorization {
    /// Check that a callback belongs to this flow and arrived in time.
    pub fn verify(&self, provider: Provider, state: &str, now: i64) -> Result<(), AuthError> {
        if self.provider != provider || self.state != state || now >= self.expires_at {
            return Err(AuthError::InvalidState);
        }
        Ok(())
    }
}

/// Redirect target plus the state to remember until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub pending: PendingAuthorization,
}

/// OAuth client type with auth URL and token URL set.
pub(crate) type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

pub(crate) fn create_client(config: &OAuthConfig) -> ConfiguredClient {
    BasicClient::new(config.client_id.clone())
        .set_client_secret(config.client_secret.clone())
        .set_auth_uri(config.auth_url.clone())
        .set_token_uri(config.token_url.clone())
        .set_redirect_uri(config.redirect_url.clone())
}

/// Generate authorization URL with PKCE.
pub fn begin(config: &OAuthConfig, scopes: &[&str], now: i64) -> AuthorizationRequest {
    let client = create_client(config);
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (auth_url, csrf_state) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(scopes.iter().map(|s| Scope::new(s.to_string())))
        .set_pkce_challenge(pkce_challenge)
        .url();

    AuthorizationRequest {
        url: auth_url.to_string(),
        pending: PendingAuthorization {
            provider: config.provider,
            state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
            expires_at: now + PENDING_TTL_SECS,
        },
    }
}

/// Exchange an authorization code and PKCE verifier for an access token.
pub async fn exchange_code(
    config: &OAuthConfig,
    http: &reqwest::Client,
    code: &str,
    pkce_verifier: &str,
) -> Result<String, AuthError> {
    let client = create_client(config);

    let token_result = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
        .request_async(http)
        .await
        .map_err(|e| AuthError::OAuth(e.to_string()))?;

    Ok(token_result.access_token().secret().clone())
}
