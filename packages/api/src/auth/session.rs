//! # Client-visible session
//!
//! The signed token lives in the [`SESSION_COOKIE`] cookie. On every request that asks
//! for it, the token is verified and its claims are copied into a [`Session`]: `id`,
//! `email` and `role`, plus name/image when present. Nothing else is merged in.
//!
//! [`Session`] is an axum extractor. Used directly it redirects unauthenticated
//! requests to the sign-in page; as `Option<Session>` it yields `None` instead.
//!
//! The OAuth flow also needs short-lived server-side state (CSRF state and PKCE
//! verifier). That is kept in a `tower-sessions` session built by [`session_layer`],
//! backed by the bounded [`FlowStore`].

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Redirect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Role;
use tower_sessions::cookie::{time, Cookie, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};

use super::config::AuthSettings;
use super::flow_store::FlowStore;
use super::oauth::PENDING_TTL_SECS;
use super::token::{JwtManager, SessionClaims};
use crate::AppState;

/// Cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "hireform.session-token";

/// Cookie carrying the server-side OAuth flow session id.
pub const FLOW_COOKIE: &str = "hireform.oauth-flow";

/// User part of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub role: Role,
}

/// Session object handed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Copy identity claims from a verified token.
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            user: SessionUser {
                id: claims.sub.clone(),
                name: claims.name.clone(),
                email: claims.email.clone(),
                image: claims.picture.clone(),
                role: claims.role,
            },
            expires: claims.expires(),
        }
    }
}

/// Value of the request cookie `name`, if sent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Read and verify the session token from request cookies.
pub fn read_session(headers: &HeaderMap, jwt: &JwtManager) -> Option<Session> {
    let token = read_cookie(headers, SESSION_COOKIE)?;

    match jwt.verify(&token) {
        Ok(claims) => Some(Session::from_claims(&claims)),
        Err(e) => {
            tracing::debug!("Ignoring invalid session token: {}", e);
            None
        }
    }
}

/// `Set-Cookie` value for a freshly issued token.
pub fn session_cookie(token: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX))
        .build()
}

/// `Set-Cookie` value that removes the session token.
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Session layer for the OAuth flow state.
pub fn session_layer(settings: &AuthSettings) -> SessionManagerLayer<FlowStore> {
    let store = FlowStore::new(
        settings.flow_capacity,
        Duration::from_secs(PENDING_TTL_SECS.unsigned_abs()),
    );
    SessionManagerLayer::new(store)
        .with_name(FLOW_COOKIE)
        .with_secure(settings.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(PENDING_TTL_SECS)))
}

impl<S> FromRequestParts<S> for Session
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        read_session(&parts.headers, &state.jwt)
            .ok_or_else(|| Redirect::to(&state.settings.sign_in_page))
    }
}

impl<S> OptionalFromRequestParts<S> for Session
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(read_session(&parts.headers, &state.jwt))
    }
}
