//! Registry of the sign-in providers enabled by configuration.

use serde::Serialize;

use super::config::AuthSettings;
use super::github::GitHubOAuth;
use super::google::GoogleOAuth;
use super::oauth::{AuthorizationRequest, OAuthProfile};
use crate::error::AuthError;
use crate::models::Provider;

/// Provider entry listed by `GET /api/auth/providers`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: Provider,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub signin_url: String,
    pub callback_url: String,
}

/// Credentials are always available; OAuth providers only when configured.
#[derive(Debug, Clone, Default)]
pub struct Providers {
    google: Option<GoogleOAuth>,
    github: Option<GitHubOAuth>,
}

impl Providers {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            google: settings.google.clone().map(GoogleOAuth::new),
            github: settings.github.clone().map(GitHubOAuth::new),
        }
    }

    pub fn enabled(&self) -> Vec<Provider> {
        let mut providers = vec![Provider::Credentials];
        if self.google.is_some() {
            providers.push(Provider::Google);
        }
        if self.github.is_some() {
            providers.push(Provider::Github);
        }
        providers
    }

    pub fn is_enabled(&self, provider: Provider) -> bool {
        self.enabled().contains(&provider)
    }

    pub fn describe(&self, base_url: &str) -> Vec<ProviderInfo> {
        self.enabled()
            .into_iter()
            .map(|provider| ProviderInfo {
                id: provider,
                name: provider.display_name(),
                kind: if provider.is_oauth() { "oauth" } else { "credentials" },
                signin_url: if provider.is_oauth() {
                    format!("{}/api/auth/signin/{}", base_url, provider)
                } else {
                    format!("{}/api/auth/callback/{}", base_url, provider)
                },
                callback_url: format!("{}/api/auth/callback/{}", base_url, provider),
            })
            .collect()
    }

    /// Start the authorization-code flow for an OAuth provider.
    pub fn authorize(
        &self,
        provider: Provider,
        now: i64,
    ) -> Result<AuthorizationRequest, AuthError> {
        match provider {
            Provider::Google => self.google.as_ref().map(|g| g.authorize(now)),
            Provider::Github => self.github.as_ref().map(|g| g.authorize(now)),
            Provider::Credentials => None,
        }
        .ok_or_else(|| AuthError::ProviderNotConfigured(provider.to_string()))
    }

    /// Finish the flow: exchange the code and fetch the provider profile.
    pub async fn fetch_profile(
        &self,
        provider: Provider,
        http: &reqwest::Client,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<OAuthProfile, AuthError> {
        match provider {
            Provider::Google => match &self.google {
                Some(google) => google.fetch_profile(http, code, pkce_verifier).await,
                None => Err(AuthError::ProviderNotConfigured(provider.to_string())),
            },
            Provider::Github => match &self.github {
                Some(github) => github.fetch_profile(http, code, pkce_verifier).await,
                None => Err(AuthError::ProviderNotConfigured(provider.to_string())),
            },
            Provider::Credentials => Err(AuthError::ProviderNotConfigured(provider.to_string())),
        }
    }
}
