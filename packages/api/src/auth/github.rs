//! # GitHub OAuth 2.0 provider
//!
//! Requests the `read:user` and `user:email` scopes. The profile comes from
//! `GET {api}/user`; when the account hides its email there, the primary verified
//! address from `GET {api}/user/emails` is used instead. The numeric account id
//! becomes the profile subject (sent to the backend as `githubId`) and `login` stands
//! in for a missing display name.

use serde::Deserialize;

use super::config::OAuthConfig;
use super::oauth::{self, AuthorizationRequest, OAuthProfile};
use crate::error::AuthError;

const SCOPES: &[&str] = &["read:user", "user:email"];
const USER_AGENT: &str = "Hireform";

/// GitHub user info from API.
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
}

/// GitHub email info from API.
#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// GitHub OAuth handler.
#[derive(Debug, Clone)]
pub struct GitHubOAuth {
    config: OAuthConfig,
}

impl GitHubOAuth {
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
        let api = &self.config.userinfo_url;

        let github_user: GitHubUser = self
            .get_json(http, &format!("{}/user", api), &access_token)
            .await?;

        // Get primary email if not in user info
        let email = match github_user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => {
                let emails: Vec<GitHubEmail> = self
                    .get_json(http, &format!("{}/user/emails", api), &access_token)
                    .await?;
                primary_verified(emails).ok_or(AuthError::MissingEmail)?
            }
        };

        Ok(OAuthProfile {
            sub: github_user.id.to_string(),
            email,
            name: github_user.name.or(Some(github_user.login)),
            picture: github_user.avatar_url,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        http: &reqwest::Client,
        url: &str,
        access_token: &str,
    ) -> Result<T, AuthError> {
        let response = http
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

fn primary_verified(emails: Vec<GitHubEmail>) -> Option<String> {
    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_verified_email() {
        let emails: Vec<GitHubEmail> = serde_json::from_str(
            r#"[
                {"email": "old@example.com", "primary": false, "verified": true},
                {"email": "main@example.com", "primary": true, "verified": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(primary_verified(emails).as_deref(), Some("main@example.com"));
    }

    #[test]
    fn test_unverified_primary_is_ignored() {
        let emails = vec![GitHubEmail {
            email: "main@example.com".to_string(),
            primary: true,
            verified: false,
        }];
        assert!(primary_verified(emails).is_none());
    }
}
