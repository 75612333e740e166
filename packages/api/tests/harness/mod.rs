#![allow(dead_code)]

use std::time::Duration;

use api::{AppState, AuthSettings, BackendClient};
use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// Settings pointing the backend at `backend` and, when given, both OAuth
/// providers at the stub server `oauth`.
pub fn settings(backend: &str, oauth: Option<&str>) -> AuthSettings {
    let backend = backend.to_string();
    let oauth = oauth.map(str::to_string);
    AuthSettings::from_lookup(move |key| {
        let stub = oauth.as_deref();
        match key {
            "API_URL" => Some(backend.clone()),
            "AUTH_SECRET" => Some(SECRET.to_string()),
            "AUTH_URL" => Some("http://gateway.test".to_string()),
            "BACKEND_TIMEOUT_SECS" => Some("5".to_string()),
            "GOOGLE_CLIENT_ID" | "GITHUB_CLIENT_ID" => stub.map(|_| "client-id".to_string()),
            "GOOGLE_CLIENT_SECRET" | "GITHUB_CLIENT_SECRET" => {
                stub.map(|_| "client-secret".to_string())
            }
            "GOOGLE_AUTH_URL" | "GITHUB_AUTH_URL" => stub.map(|s| format!("{}/authorize", s)),
            "GOOGLE_TOKEN_URL" | "GITHUB_TOKEN_URL" => stub.map(|s| format!("{}/token", s)),
            "GOOGLE_USERINFO_URL" => stub.map(|s| format!("{}/userinfo", s)),
            "GITHUB_API_URL" => stub.map(str::to_string),
            _ => None,
        }
    })
    .unwrap()
}

pub fn make_app(backend: &str, oauth: Option<&str>) -> Router {
    api::app(AppState::new(settings(backend, oauth)).unwrap())
}

pub fn backend_client(url: &str) -> BackendClient {
    backend_client_with_timeout(url, Duration::from_secs(5))
}

pub fn backend_client_with_timeout(url: &str, timeout: Duration) -> BackendClient {
    let http = BackendClient::http_client(timeout).unwrap();
    BackendClient::new(http, url, url)
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header("content-type", "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `name=value` pair of the first `Set-Cookie` for `name`.
pub fn set_cookie(resp: &Response<Body>, name: &str) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Value of `param` in a URL query string.
pub fn query_param(url: &str, param: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == param)
        .map(|(_, v)| v.to_string())
}

pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Fetch a CSRF token: returns the `name=value` cookie pair and the token.
pub async fn csrf(app: &Router) -> (String, String) {
    let resp = request(app, Method::GET, "/api/auth/csrf", None, None).await;
    let cookie = set_cookie(&resp, "hireform.csrf-token").unwrap();
    let token = json_body(resp).await["csrfToken"]
        .as_str()
        .unwrap()
        .to_string();
    (cookie, token)
}
