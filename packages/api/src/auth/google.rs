//! # Google OAuth 2.0 provider
//!
//! Requests the `openid`, `email` and `profile` scopes and reads the signed-in
//! account from the userinfo endpoint (`googleapis.com/oauth2/v2/userinfo`). The
//! account `id` becomes the profile subject that is later sent to the backend as
//! `googleId`.

use serde::Deserialize;

use super::config::OAuthConfig;
use super::oauth::{self, AuthorizationRequest, OAuthProfile};
use crate::error::AuthError;

const SCOPES: &[&str] = &["openid", "email", "profile"];

/// Google user info from API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Google OAuth handler.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
}

impl GoogleOAuth {
    pub fn new(config: OAuthConfig) -> Self {
        Self { config }
    }

    /// Generate authorization URL with PKCE.
    pub fn authorize(&self, now: i64) -> AuthorizationRequest {
        oauth::begin(&self.config, SCOPES, now)
    }

    /// Exchange the authorization code and read the user's profile.
    pub async fn fetch_profile(
        &self,
        http: &reqwest::Client,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<OAuthProfile, AuthError> {
        let access_token = oauth::exchange_code(&self.config, http, code, pkce_verifier).await?;

        let response = http
            .get(&self.config.userinfo_url)
            .bearer_auth(&access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::Status(response.status()));
        }
        let google_user: GoogleUser = response.json().await?;

        Ok(OAuthProfile {
            sub: google_user.id,
            email: google_user.email,
            name: google_user.name,
            picture: google_user.picture,
        })
    }
}
