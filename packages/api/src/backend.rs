//! # Backend auth API client
//!
//! The backend owns every user record. The gateway reaches it through two calls:
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | [`BackendClient::login`] | `POST {login_api_url}/auth/login` `{email, password}` | `{data: User \| null}` |
//! | [`BackendClient::link_oauth`] | `POST {api_url}/auth/oauth` `{email, name, googleId \| githubId}` | `{user?: {id, email, roles?}}` |
//!
//! A non-2xx status is returned as [`AuthError::Status`]. Neither call retries; the
//! shared `reqwest` client carries the configured timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::OAuthProfile;
use crate::error::{AuthError, ConfigError};
use crate::models::{BackendUser, LinkedUser, Provider};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    data: Option<BackendUser>,
}

/// Body of `POST /auth/oauth`. Exactly one provider id field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthLinkRequest<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_id: Option<&'a str>,
}

impl<'a> OAuthLinkRequest<'a> {
    /// Build the link request for an OAuth provider. `None` for credentials.
    pub fn new(provider: Provider, profile: &'a OAuthProfile) -> Option<Self> {
        let mut request = Self {
            email: &profile.email,
            name: profile.name.as_deref(),
            google_id: None,
            github_id: None,
        };
        match provider {
            Provider::Google => request.google_id = Some(profile.sub.as_str()),
            Provider::Github => request.github_id = Some(profile.sub.as_str()),
            Provider::Credentials => return None,
        }
        Some(request)
    }
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    #[serde(default)]
    user: Option<LinkedUser>,
}

/// HTTP client for the backend auth API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    api_url: String,
    login_api_url: String,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, api_url: &str, login_api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            login_api_url: login_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the shared HTTP client. Redirects are not followed.
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
        Ok(reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?)
    }

    /// Check credentials. `Ok(None)` when the backend answers without a user.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<BackendUser>, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.login_api_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Status(response.status()));
        }

        let body: LoginResponse = response.json().await?;
        Ok(body.data)
    }

    /// Find or create the account for a federated identity.
    pub async fn link_oauth(
        &self,
        request: &OAuthLinkRequest<'_>,
    ) -> Result<Option<LinkedUser>, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/oauth", self.api_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Status(response.status()));
        }

        let body: LinkResponse = response.json().await?;
        Ok(body.user)
    }
}
