use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod harness;
use harness::{csrf, json_body, location, make_app, query_param, request, set_cookie};

const SESSION_COOKIE: &str = "hireform.session-token";
const FLOW_COOKIE: &str = "hireform.oauth-flow";
const LOGIN_FORM: &str = "email=ada%40hireform.dev&password=Secret123%21";

fn login_form(csrf_token: &str) -> String {
    format!("{}&csrfToken={}", LOGIN_FORM, csrf_token)
}

async fn mount_token_endpoint(oauth: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "provider-token",
            "token_type": "bearer"
        })))
        .mount(oauth)
        .await;
}

#[tokio::test]
async fn providers_lists_only_credentials_without_oauth_config() {
    let app = make_app("http://127.0.0.1:1", None);
    let resp = request(&app, Method::GET, "/api/auth/providers", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "credentials");
    assert_eq!(body[0]["type"], "credentials");
}

#[tokio::test]
async fn credentials_sign_in_issues_session() {
    let backend = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "u-1",
                "name": "Ada",
                "email": "ada@hireform.dev",
                "roles": [{"name": "ROLE_ADMIN"}]
            }
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = make_app(&backend.uri(), None);
    let (csrf_cookie, token) = csrf(&app).await;
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/callback/credentials",
        Some(&csrf_cookie),
        Some(&login_form(&token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let cookie = set_cookie(&resp, SESSION_COOKIE).expect("session cookie");
    let resp = request(&app, Method::GET, "/api/auth/session", Some(&cookie), None).await;
    let session = json_body(resp).await;
    assert_eq!(session["user"]["id"], "u-1");
    assert_eq!(session["user"]["email"], "ada@hireform.dev");
    assert_eq!(session["user"]["role"], "ROLE_ADMIN");

    let resp = request(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["name"], "Ada");
}

#[tokio::test]
async fn credentials_rejection_redirects_with_error() {
    let backend = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&backend)
        .await;

    let app = make_app(&backend.uri(), None);
    let (csrf_cookie, token) = csrf(&app).await;
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/callback/credentials",
        Some(&csrf_cookie),
        Some(&login_form(&token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login?error=CredentialsSignin");
    assert!(set_cookie(&resp, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn unauthenticated_session_is_empty_object() {
    let app = make_app("http://127.0.0.1:1", None);

    let resp = request(&app, Method::GET, "/api/auth/session", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({}));

    let forged = format!("{}=not-a-token", SESSION_COOKIE);
    let resp = request(&app, Method::GET, "/api/auth/session", Some(&forged), None).await;
    assert_eq!(json_body(resp).await, json!({}));
}

#[tokio::test]
async fn protected_route_redirects_to_login() {
    let app = make_app("http://127.0.0.1:1", None);
    let resp = request(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn credentials_sign_in_requires_csrf_token() {
    let backend = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let app = make_app(&backend.uri(), None);

    // No token at all
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/callback/credentials",
        None,
        Some(LOGIN_FORM),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login?error=MissingCSRF");
    assert!(set_cookie(&resp, SESSION_COOKIE).is_none());

    // Token field without the cookie, as a cross-site form would send it
    let (_, token) = csrf(&app).await;
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/callback/credentials",
        None,
        Some(&login_form(&token)),
    )
    .await;
    assert_eq!(location(&resp), "/login?error=MissingCSRF");

    // Cookie present but the field does not match
    let (csrf_cookie, _) = csrf(&app).await;
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/callback/credentials",
        Some(&csrf_cookie),
        Some(&login_form("forged")),
    )
    .await;
    assert_eq!(location(&resp), "/login?error=MissingCSRF");
}

#[tokio::test]
async fn csrf_token_is_reused_while_cookie_is_held() {
    let app = make_app("http://127.0.0.1:1", None);
    let (csrf_cookie, token) = csrf(&app).await;

    let resp = request(&app, Method::GET, "/api/auth/csrf", Some(&csrf_cookie), None).await;
    assert_eq!(json_body(resp).await["csrfToken"], token.as_str());
}

#[tokio::test]
async fn signout_without_csrf_keeps_session() {
    let app = make_app("http://127.0.0.1:1", None);
    let resp = request(&app, Method::POST, "/api/auth/signout", None, Some("")).await;
    assert_eq!(location(&resp), "/login?error=MissingCSRF");
    assert!(set_cookie(&resp, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn signout_clears_cookie() {
    let app = make_app("http://127.0.0.1:1", None);
    let (csrf_cookie, token) = csrf(&app).await;
    let resp = request(
        &app,
        Method::POST,
        "/api/auth/signout",
        Some(&csrf_cookie),
        Some(&format!("csrfToken={}", token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert_eq!(
        set_cookie(&resp, SESSION_COOKIE).as_deref(),
        Some("hireform.session-token=")
    );
}

#[tokio::test]
async fn unconfigured_provider_signin_fails() {
    let app = make_app("http://127.0.0.1:1", None);

    let resp = request(&app, Method::GET, "/api/auth/signin/google", None, None).await;
    assert_eq!(location(&resp), "/login?error=OAuthSignin");

    let resp = request(&app, Method::GET, "/api/auth/signin/myspace", None, None).await;
    assert_eq!(location(&resp), "/login?error=Configuration");
}

#[tokio::test]
async fn google_sign_in_reconciles_with_backend() {
    let backend = MockServer::start().await;
    let oauth = MockServer::start().await;

    mount_token_endpoint(&oauth).await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer provider-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g-123",
            "email": "ada@gmail.com",
            "name": "Ada Lovelace",
            "picture": "https://lh3.googleusercontent.com/ada"
        })))
        .mount(&oauth)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth"))
        .and(body_partial_json(json!({"googleId": "g-123", "email": "ada@gmail.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "u-42", "email": "ada@hireform.dev"}
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = make_app(&backend.uri(), Some(&oauth.uri()));

    let resp = request(&app, Method::GET, "/api/auth/signin/google", None, None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let authorize_url = location(&resp);
    assert!(authorize_url.starts_with(&format!("{}/authorize?", oauth.uri())));
    assert!(authorize_url.contains("code_challenge="));
    let state = query_param(&authorize_url, "state").expect("state param");
    let flow = set_cookie(&resp, FLOW_COOKIE).expect("flow cookie");

    let callback = format!("/api/auth/callback/google?code=auth-code&state={}", state);
    let resp = request(&app, Method::GET, &callback, Some(&flow), None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let cookie = set_cookie(&resp, SESSION_COOKIE).expect("session cookie");
    let resp = request(&app, Method::GET, "/api/auth/session", Some(&cookie), None).await;
    let session = json_body(resp).await;
    assert_eq!(session["user"]["id"], "u-42");
    assert_eq!(session["user"]["email"], "ada@hireform.dev");
    assert_eq!(session["user"]["role"], "ROLE_USER");
    assert_eq!(session["user"]["name"], "Ada Lovelace");
}

#[tokio::test]
async fn github_sign_in_denied_when_backend_fails() {
    let backend = MockServer::start().await;
    let oauth = MockServer::start().await;

    mount_token_endpoint(&oauth).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "login": "ada",
            "email": null,
            "name": null,
            "avatar_url": null
        })))
        .mount(&oauth)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "ada@users.noreply.github.com", "primary": false, "verified": true},
            {"email": "ada@hireform.dev", "primary": true, "verified": true}
        ])))
        .mount(&oauth)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth"))
        .and(body_partial_json(json!({"githubId": "77", "email": "ada@hireform.dev"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backend)
        .await;

    let app = make_app(&backend.uri(), Some(&oauth.uri()));

    let resp = request(&app, Method::GET, "/api/auth/signin/github", None, None).await;
    let state = query_param(&location(&resp), "state").expect("state param");
    let flow = set_cookie(&resp, FLOW_COOKIE).expect("flow cookie");

    let callback = format!("/api/auth/callback/github?code=auth-code&state={}", state);
    let resp = request(&app, Method::GET, &callback, Some(&flow), None).await;
    assert_eq!(location(&resp), "/login?error=AccessDenied");
    assert!(set_cookie(&resp, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn callback_with_wrong_state_never_reaches_backend() {
    let backend = MockServer::start().await;
    let oauth = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&oauth)
        .await;

    let app = make_app(&backend.uri(), Some(&oauth.uri()));

    let resp = request(&app, Method::GET, "/api/auth/signin/google", None, None).await;
    let flow = set_cookie(&resp, FLOW_COOKIE).expect("flow cookie");

    let resp = request(
        &app,
        Method::GET,
        "/api/auth/callback/google?code=auth-code&state=forged",
        Some(&flow),
        None,
    )
    .await;
    assert_eq!(location(&resp), "/login?error=OAuthCallback");

    // No pending flow at all
    let resp = request(
        &app,
        Method::GET,
        "/api/auth/callback/google?code=auth-code&state=forged",
        None,
        None,
    )
    .await;
    assert_eq!(location(&resp), "/login?error=OAuthCallback");
}

#[tokio::test]
async fn provider_error_is_access_denied() {
    let oauth = MockServer::start().await;
    let app = make_app("http://127.0.0.1:1", Some(&oauth.uri()));

    let resp = request(&app, Method::GET, "/api/auth/signin/github", None, None).await;
    let state = query_param(&location(&resp), "state").expect("state param");
    let flow = set_cookie(&resp, FLOW_COOKIE).expect("flow cookie");

    let callback = format!("/api/auth/callback/github?error=access_denied&state={}", state);
    let resp = request(&app, Method::GET, &callback, Some(&flow), None).await;
    assert_eq!(location(&resp), "/login?error=AccessDenied");
}

#[tokio::test]
async fn unsolicited_provider_error_fails_state_check() {
    let oauth = MockServer::start().await;
    let app = make_app("http://127.0.0.1:1", Some(&oauth.uri()));

    let resp = request(
        &app,
        Method::GET,
        "/api/auth/callback/github?error=access_denied",
        None,
        None,
    )
    .await;
    assert_eq!(location(&resp), "/login?error=OAuthCallback");

    let resp = request(&app, Method::GET, "/api/auth/signin/github", None, None).await;
    let flow = set_cookie(&resp, FLOW_COOKIE).expect("flow cookie");
    let resp = request(
        &app,
        Method::GET,
        "/api/auth/callback/github?error=access_denied&state=forged",
        Some(&flow),
        None,
    )
    .await;
    assert_eq!(location(&resp), "/login?error=OAuthCallback");
}
