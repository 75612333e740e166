//! Authentication REST API routes.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /api/auth/providers` | enabled providers |
//! | `GET /api/auth/csrf` | CSRF token for the sign-in and sign-out forms |
//! | `POST /api/auth/callback/credentials` | email + password sign-in |
//! | `GET /api/auth/signin/{provider}` | redirect to the OAuth provider |
//! | `GET /api/auth/callback/{provider}` | OAuth callback |
//! | `GET /api/auth/session` | current session, `{}` when signed out |
//! | `GET /api/auth/me` | current user, redirect to the sign-in page when signed out |
//! | `POST /api/auth/signout` | drop the session cookie |
//!
//! Both POST routes require the `csrfToken` field to match the CSRF cookie.

use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::session::cleared_session_cookie;
use crate::auth::{
    credentials, csrf, reconcile, session::session_cookie, Credentials, PendingAuthorization,
    Session, PENDING_OAUTH_KEY,
};
use crate::error::{AuthError, SignInError};
use crate::models::{Identity, Provider};
use crate::AppState;

/// Create auth router.
pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/providers", get(providers))
        .route("/api/auth/csrf", get(csrf_token))
        .route("/api/auth/callback/credentials", post(credentials_callback))
        .route("/api/auth/signin/{provider}", get(oauth_signin))
        .route("/api/auth/callback/{provider}", get(oauth_callback))
        .route("/api/auth/session", get(session))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/signout", post(signout))
        .with_state(state)
}

impl AppState {
    fn fail(&self, error: SignInError) -> Response {
        error.redirect(&self.settings.sign_in_page).into_response()
    }

    /// Issue the session token for a signed-in identity and send the user home.
    fn complete_sign_in(&self, provider: Provider, identity: &Identity) -> Response {
        let (token, claims) = match self.jwt.issue(identity) {
            Ok(issued) => issued,
            Err(e) => {
                tracing::error!("Failed to issue session token: {}", e);
                return self.fail(SignInError::Configuration);
            }
        };

        tracing::info!(
            provider = %provider,
            user_id = %claims.sub,
            role = %claims.role,
            "User signed in"
        );

        let cookie = session_cookie(token, self.jwt.max_age(), self.settings.cookie_secure);
        (
            AppendHeaders([(SET_COOKIE, cookie.to_string())]),
            Redirect::to(&self.settings.home_page),
        )
            .into_response()
    }
}

/// Form body accepted as `application/x-www-form-urlencoded` or JSON.
pub struct AuthForm<T>(pub T);

impl<S, T> FromRequest<S> for AuthForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        }
    }
}

/// GET /api/auth/providers
async fn providers(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.providers.describe(&state.settings.base_url))
}

/// GET /api/auth/csrf
async fn csrf_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = csrf::current_token(&headers).unwrap_or_else(csrf::new_token);
    let cookie = csrf::csrf_cookie(token.clone(), state.settings.cookie_secure);
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(serde_json::json!({ "csrfToken": token })),
    )
        .into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody {
    email: String,
    password: String,
    #[serde(default)]
    csrf_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignOutBody {
    #[serde(default)]
    csrf_token: Option<String>,
}

/// POST /api/auth/callback/credentials
async fn credentials_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    AuthForm(body): AuthForm<SignInBody>,
) -> Response {
    if !csrf::verify(&headers, body.csrf_token.as_deref()) {
        tracing::warn!("Rejected credentials sign-in without a valid CSRF token");
        return state.fail(SignInError::MissingCsrf);
    }

    let credentials = Credentials {
        email: body.email,
        password: body.password,
    };
    let Some(user) = credentials::authorize(&state.backend, &credentials).await else {
        return state.fail(SignInError::CredentialsSignin);
    };

    let mut identity = Identity::from(user);
    if !reconcile::sign_in(&state.backend, Provider::Credentials, None, &mut identity).await {
        return state.fail(SignInError::AccessDenied);
    }

    state.complete_sign_in(Provider::Credentials, &identity)
}

fn parse_oauth_provider(raw: &str) -> Option<Provider> {
    Provider::from_str(raw).filter(Provider::is_oauth)
}

/// GET /api/auth/signin/{provider}
async fn oauth_signin(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    session: tower_sessions::Session,
) -> Response {
    let Some(provider) = parse_oauth_provider(&provider) else {
        tracing::warn!("Sign-in requested for unknown provider {}", provider);
        return state.fail(SignInError::Configuration);
    };

    let request = match state.providers.authorize(provider, Utc::now().timestamp()) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Failed to start {} OAuth: {}", provider.display_name(), e);
            return state.fail(SignInError::OAuthSignin);
        }
    };

    if let Err(e) = session.insert(PENDING_OAUTH_KEY, &request.pending).await {
        tracing::error!("Failed to store OAuth state: {}", e);
        return state.fail(SignInError::OAuthSignin);
    }

    Redirect::to(&request.url).into_response()
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /api/auth/callback/{provider}
async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    session: tower_sessions::Session,
) -> Response {
    let Some(provider) = parse_oauth_provider(&provider) else {
        tracing::warn!("Callback for unknown provider {}", provider);
        return state.fail(SignInError::Configuration);
    };

    match finish_oauth(&state, provider, params, &session).await {
        Ok(Some(identity)) => state.complete_sign_in(provider, &identity),
        Ok(None) => state.fail(SignInError::AccessDenied),
        Err(e) => {
            tracing::error!("{} OAuth callback failed: {}", provider.display_name(), e);
            state.fail(SignInError::OAuthCallback)
        }
    }
}

/// Validate the callback, fetch the provider profile and reconcile it.
///
/// The pending state is checked before anything else, including a provider `error`.
/// `Ok(None)` means the user or the backend refused the sign-in.
async fn finish_oauth(
    state: &AppState,
    provider: Provider,
    params: CallbackParams,
    session: &tower_sessions::Session,
) -> Result<Option<Identity>, AuthError> {
    let pending: Option<PendingAuthorization> = session.remove(PENDING_OAUTH_KEY).await?;
    let pending = pending.ok_or(AuthError::InvalidState)?;
    let returned_state = params.state.ok_or(AuthError::InvalidState)?;
    pending.verify(provider, &returned_state, Utc::now().timestamp())?;

    if let Some(error) = params.error {
        tracing::warn!("{} returned error: {}", provider.display_name(), error);
        return Ok(None);
    }

    let code = params
        .code
        .ok_or_else(|| AuthError::OAuth("missing authorization code".to_string()))?;

    let profile = state
        .providers
        .fetch_profile(provider, &state.http, &code, &pending.pkce_verifier)
        .await?;

    let mut identity = Identity::from_profile(&profile);
    if !reconcile::sign_in(&state.backend, provider, Some(&profile), &mut identity).await {
        return Ok(None);
    }

    Ok(Some(identity))
}

/// GET /api/auth/session
async fn session(session: Option<Session>) -> Response {
    match session {
        Some(session) => Json(session).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    }
}

/// GET /api/auth/me
async fn current_user(session: Session) -> impl IntoResponse {
    Json(session.user)
}

/// POST /api/auth/signout
async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Option<Session>,
    AuthForm(body): AuthForm<SignOutBody>,
) -> Response {
    if !csrf::verify(&headers, body.csrf_token.as_deref()) {
        tracing::warn!("Rejected sign-out without a valid CSRF token");
        return state.fail(SignInError::MissingCsrf);
    }

    if let Some(session) = session {
        tracing::info!(user_id = %session.user.id, "User signed out");
    }

    let cookie = cleared_session_cookie(state.settings.cookie_secure);
    (
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Redirect::to(&state.settings.sign_in_page),
    )
        .into_response()
}
