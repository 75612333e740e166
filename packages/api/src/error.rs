//! Error types for the auth gateway.
//!
//! [`AuthError`] covers everything that can go wrong while a sign-in is in flight.
//! It never reaches the browser: adapters collapse it to `None`/`false` after logging,
//! and the router turns failures into a [`SignInError`] redirect. [`ConfigError`] is
//! only produced at startup.

use axum::response::Redirect;
use reqwest::StatusCode;

/// Failure inside a sign-in attempt.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("oauth exchange failed: {0}")]
    OAuth(String),

    #[error("invalid or expired oauth state")]
    InvalidState,

    #[error("no verified primary email found")]
    MissingEmail,

    #[error("provider {0} is not configured")]
    ProviderNotConfigured(String),

    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Invalid or missing startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Error code appended to the sign-in page as `?error=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    /// Credentials were rejected by the backend.
    CredentialsSignin,
    /// The sign-in check returned false (backend refused to link the account).
    AccessDenied,
    /// The OAuth callback could not be completed.
    OAuthCallback,
    /// The OAuth flow could not be started.
    OAuthSignin,
    Configuration,
    /// A sign-in or sign-out form arrived without the matching CSRF token.
    MissingCsrf,
}

impl SignInError {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInError::CredentialsSignin => "CredentialsSignin",
            SignInError::AccessDenied => "AccessDenied",
            SignInError::OAuthCallback => "OAuthCallback",
            SignInError::OAuthSignin => "OAuthSignin",
            SignInError::Configuration => "Configuration",
            SignInError::MissingCsrf => "MissingCSRF",
        }
    }

    /// Redirect to `sign_in_page` carrying this error code.
    pub fn redirect(&self, sign_in_page: &str) -> Redirect {
        Redirect::to(&format!("{}?error={}", sign_in_page, self.as_str()))
    }
}
