//! # API crate: authentication gateway for Hireform
//!
//! Signs users in with email/password or Google/GitHub OAuth, confirms every account
//! with the backend auth API, and hands the browser a signed session token.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Settings, provider adapters, OAuth reconciliation, token issuing, session extraction |
//! | [`backend`] | `reqwest` client for the backend's `/auth/login` and `/auth/oauth` |
//! | [`error`] | [`AuthError`], [`ConfigError`] and the sign-in error codes |
//! | [`models`] | Backend user records, the in-flight [`models::Identity`], [`models::Provider`] |
//! | [`routes`] | The axum router under `/api/auth` |
//!
//! ## Sign-in lifecycle
//!
//! ```text
//! unauthenticated ──credentials ok / oauth reconciled──▶ token issued ──▶ session read
//!        ▲                                                   │
//!        └──────────────────── any failure ──────────────────┘
//! ```
//!
//! Failures never carry detail to the client: they become a redirect to the sign-in
//! page with a generic `?error=` code.

use std::sync::Arc;

use axum::Router;

pub mod auth;
pub mod backend;
pub mod error;
pub mod models;
pub mod routes;

pub use auth::{AuthSettings, Session, SessionUser};
pub use backend::BackendClient;
pub use error::{AuthError, ConfigError, SignInError};

/// Shared state for every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AuthSettings>,
    pub backend: BackendClient,
    pub jwt: auth::JwtManager,
    pub providers: Arc<auth::Providers>,
    /// Client used for provider token exchange and profile calls.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(settings: AuthSettings) -> Result<Self, ConfigError> {
        let http = BackendClient::http_client(settings.backend_timeout)?;
        let backend = BackendClient::new(http.clone(), &settings.api_url, &settings.login_api_url);
        let jwt = auth::JwtManager::new(&settings.secret, settings.session_max_age);
        let providers = Arc::new(auth::Providers::from_settings(&settings));

        Ok(Self {
            settings: Arc::new(settings),
            backend,
            jwt,
            providers,
            http,
        })
    }
}

/// The full auth router with the OAuth flow session layer applied.
pub fn app(state: AppState) -> Router {
    let session_layer = auth::session_layer(&state.settings);
    routes::auth_router(state).layer(session_layer)
}
