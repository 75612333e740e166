//! Double-submit CSRF tokens for the state-changing auth endpoints.
//!
//! `GET /api/auth/csrf` hands out a random token and stores the same value in the
//! [`CSRF_COOKIE`] cookie. Sign-in and sign-out forms must echo it back as
//! `csrfToken`; a cross-site form can submit to us but cannot read the cookie, so it
//! cannot produce a matching field.

use axum::http::HeaderMap;
use oauth2::CsrfToken;
use subtle::ConstantTimeEq;
use tower_sessions::cookie::{Cookie, SameSite};

use super::session::read_cookie;

/// Cookie carrying the CSRF token.
pub const CSRF_COOKIE: &str = "hireform.csrf-token";

/// Fresh random token (32 bytes, base64url).
pub fn new_token() -> String {
    CsrfToken::new_random().secret().clone()
}

/// Token already held by the browser, if any.
pub fn current_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, CSRF_COOKIE).filter(|token| !token.is_empty())
}

pub fn csrf_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Whether `submitted` matches the token in the request's CSRF cookie.
pub fn verify(headers: &HeaderMap, submitted: Option<&str>) -> bool {
    match (current_token(headers), submitted) {
        (Some(expected), Some(submitted)) => {
            expected.as_bytes().ct_eq(submitted.as_bytes()).into()
        }
        _ => false,
    }
}
