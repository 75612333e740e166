//! # Gateway configuration from environment variables
//!
//! [`AuthSettings::from_env`] loads `.env` through `dotenvy` and reads the process
//! environment. [`AuthSettings::from_lookup`] does the same against any key lookup so
//! tests never touch the real environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `API_URL` | required |
//! | `NEXT_PUBLIC_API_URL` | value of `API_URL` |
//! | `AUTH_SECRET` | required |
//! | `AUTH_URL` | `http://localhost:8080` |
//! | `AUTH_SESSION_MAX_AGE_SECS` | 30 days, at most 10 years |
//! | `AUTH_COOKIE_SECURE` | `false` |
//! | `BACKEND_TIMEOUT_SECS` | `10` |
//! | `AUTH_FLOW_CAPACITY` | `10000` in-flight OAuth flows |
//! | `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET` | provider disabled |
//! | `GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET` | provider disabled |
//!
//! Endpoint overrides (`GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`, `GOOGLE_USERINFO_URL`,
//! `GITHUB_AUTH_URL`, `GITHUB_TOKEN_URL`, `GITHUB_API_URL`) exist for GitHub Enterprise
//! and for pointing the flow at a local stub.

use std::str::FromStr;
use std::time::Duration;

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::error::ConfigError;
use crate::models::Provider;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_URL: &str = "https://api.github.com";

const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;
const MAX_SESSION_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FLOW_CAPACITY: u64 = 10_000;

/// OAuth provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub provider: Provider,
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
    /// Profile endpoint. For GitHub this is the REST API base (`/user`, `/user/emails`).
    pub userinfo_url: String,
}

impl OAuthConfig {
    /// Create Google OAuth config. Returns `None` when the client id is not set.
    pub fn google<F>(lookup: &F, base_url: &str) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(client_id) = lookup("GOOGLE_CLIENT_ID") else {
            return Ok(None);
        };
        let client_secret =
            lookup("GOOGLE_CLIENT_SECRET").ok_or(ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?;

        Ok(Some(Self {
            provider: Provider::Google,
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: auth_url(
                "GOOGLE_AUTH_URL",
                lookup("GOOGLE_AUTH_URL").unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
            )?,
            token_url: token_url(
                "GOOGLE_TOKEN_URL",
                lookup("GOOGLE_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
            )?,
            redirect_url: callback_url(base_url, Provider::Google)?,
            userinfo_url: lookup("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string()),
        }))
    }

    /// Create GitHub OAuth config. Returns `None` when the client id is not set.
    pub fn github<F>(lookup: &F, base_url: &str) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(client_id) = lookup("GITHUB_CLIENT_ID") else {
            return Ok(None);
        };
        let client_secret =
            lookup("GITHUB_CLIENT_SECRET").ok_or(ConfigError::Missing("GITHUB_CLIENT_SECRET"))?;

        Ok(Some(Self {
            provider: Provider::Github,
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: auth_url(
                "GITHUB_AUTH_URL",
                lookup("GITHUB_AUTH_URL").unwrap_or_else(|| GITHUB_AUTH_URL.to_string()),
            )?,
            token_url: token_url(
                "GITHUB_TOKEN_URL",
                lookup("GITHUB_TOKEN_URL").unwrap_or_else(|| GITHUB_TOKEN_URL.to_string()),
            )?,
            redirect_url: callback_url(base_url, Provider::Github)?,
            userinfo_url: lookup("GITHUB_API_URL")
                .unwrap_or_else(|| GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }))
    }
}

fn auth_url(name: &'static str, value: String) -> Result<AuthUrl, ConfigError> {
    AuthUrl::new(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn token_url(name: &'static str, value: String) -> Result<TokenUrl, ConfigError> {
    TokenUrl::new(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn callback_url(base_url: &str, provider: Provider) -> Result<RedirectUrl, ConfigError> {
    RedirectUrl::new(format!("{}/api/auth/callback/{}", base_url, provider))
        .map_err(|e| ConfigError::Invalid {
            name: "AUTH_URL",
            reason: e.to_string(),
        })
}

/// Everything the gateway needs at runtime.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Backend base URL for account linking.
    pub api_url: String,
    /// Backend base URL for credentials login.
    pub login_api_url: String,
    /// HMAC secret for session tokens.
    pub secret: String,
    /// Public base URL of this gateway, without trailing slash.
    pub base_url: String,
    pub session_max_age: Duration,
    pub cookie_secure: bool,
    pub backend_timeout: Duration,
    /// Upper bound on OAuth flows started but not yet called back.
    pub flow_capacity: u64,
    /// Where unauthenticated users and failed sign-ins are sent.
    pub sign_in_page: String,
    /// Where successful sign-ins land.
    pub home_page: String,
    pub google: Option<OAuthConfig>,
    pub github: Option<OAuthConfig>,
}

impl AuthSettings {
    /// Load settings from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = lookup("API_URL")
            .ok_or(ConfigError::Missing("API_URL"))?
            .trim_end_matches('/')
            .to_string();
        let login_api_url = lookup("NEXT_PUBLIC_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());
        let secret = lookup("AUTH_SECRET").ok_or(ConfigError::Missing("AUTH_SECRET"))?;
        let base_url = lookup("AUTH_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let session_max_age = parse_or(
            &lookup,
            "AUTH_SESSION_MAX_AGE_SECS",
            DEFAULT_SESSION_MAX_AGE_SECS,
        )?;
        if session_max_age > MAX_SESSION_MAX_AGE_SECS {
            return Err(ConfigError::Invalid {
                name: "AUTH_SESSION_MAX_AGE_SECS",
                reason: format!("must be at most {} seconds", MAX_SESSION_MAX_AGE_SECS),
            });
        }
        let session_max_age = Duration::from_secs(session_max_age);
        let backend_timeout = Duration::from_secs(parse_or(
            &lookup,
            "BACKEND_TIMEOUT_SECS",
            DEFAULT_BACKEND_TIMEOUT_SECS,
        )?);
        let cookie_secure = parse_or(&lookup, "AUTH_COOKIE_SECURE", false)?;
        let flow_capacity = parse_or(&lookup, "AUTH_FLOW_CAPACITY", DEFAULT_FLOW_CAPACITY)?;

        let google = OAuthConfig::google(&lookup, &base_url)?;
        let github = OAuthConfig::github(&lookup, &base_url)?;

        Ok(Self {
            api_url,
            login_api_url,
            secret,
            base_url,
            session_max_age,
            cookie_secure,
            backend_timeout,
            flow_capacity,
            sign_in_page: "/login".to_string(),
            home_page: "/".to_string(),
            google,
            github,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
