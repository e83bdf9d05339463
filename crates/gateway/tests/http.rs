#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Router-level tests: each request goes through the full middleware stack.

use std::time::Duration;

use {
    agora_auth::{RefreshCookie, TokenIssuer},
    agora_config::{FrontendConfig, GoogleOAuthConfig, LimitsConfig, ServerConfig},
    agora_gateway::{AppState, build_app},
    agora_graphql::GqlContext,
    agora_oauth::GoogleFlow,
    agora_service_traits::Services,
    agora_store::Database,
    axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, Response, StatusCode, header},
    },
    secrecy::Secret,
    serde_json::{Value, json},
    tower::ServiceExt,
};

const COOKIE_NAME: &str = "rt";

async fn context() -> GqlContext {
    GqlContext {
        db: Database::connect_in_memory().await.unwrap(),
        services: Services::default(),
        tokens: TokenIssuer::new(
            &Secret::new("access-secret".into()),
            &Secret::new("refresh-secret".into()),
            Duration::from_secs(900),
            Duration::from_secs(3600),
        ),
        refresh_cookie: RefreshCookie::new(COOKIE_NAME, 3600, false),
        limits: LimitsConfig::default(),
        frontend: FrontendConfig::default(),
        currency: "usd".into(),
    }
}

fn google_config() -> GoogleOAuthConfig {
    GoogleOAuthConfig {
        client_id: "client-id".into(),
        client_secret: Secret::new("client-secret".into()),
        callback_url: "http://localhost:4000/auth/google/callback".into(),
        auth_url: "https://accounts.example.com/o/oauth2/auth".into(),
        token_url: "http://127.0.0.1:9/token".into(),
        userinfo_url: "http://127.0.0.1:9/userinfo".into(),
        scopes: vec!["profile".into()],
    }
}

async fn app_with(server: ServerConfig, google: bool) -> (Router, AppState) {
    let google = google.then(|| GoogleFlow::new(google_config()));
    let state = AppState::new(context().await, server, google);
    (build_app(state.clone()).unwrap(), state)
}

async fn app() -> (Router, AppState) {
    app_with(ServerConfig::default(), false).await
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn graphql_post() -> axum::http::request::Builder {
    Request::post("/graphql").header(header::CONTENT_TYPE, "application/json")
}

fn graphql_request(query: &str) -> Request<Body> {
    graphql_post()
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn refresh_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/refresh_token");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["google"], false);
}

#[tokio::test]
async fn graphiql_can_be_disabled() {
    let (app, _) = app().await;
    let response = app
        .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let server = ServerConfig {
        graphiql: false,
        ..ServerConfig::default()
    };
    let (app, _) = app_with(server, false).await;
    let response = app
        .oneshot(Request::get("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn graphql_post_executes_query() {
    let (app, _) = app().await;
    let response = app.oneshot(graphql_request("{ hello }")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["data"]["hello"].is_string());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (app, _) = app().await;
    let response = app
        .oneshot(graphql_post().body(Body::from("{not json")).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_sets_cookie_and_refresh_rotates_it() {
    let (app, _) = app().await;
    let response = app
        .clone()
        .oneshot(graphql_request(
            r#"mutation { register(userRegister: {name: "erin", password: "pw-123", email: "e@example.com"}) { accessToken account { id } } }"#,
        ))
        .await
        .unwrap();
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let pair = cookies[0].split(';').next().unwrap().to_string();
    assert!(pair.starts_with("rt="));
    let body = json_body(response).await;
    let access = body["data"]["register"]["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            graphql_post()
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::from(
                    json!({ "query": "{ me { account { name } } }" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["me"]["account"]["name"], "erin");

    let response = app.oneshot(refresh_request(Some(&pair))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = set_cookies(&response);
    assert_eq!(rotated.len(), 1);
    assert!(rotated[0].starts_with("rt="));
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert!(body["access_token"].is_string());
    assert!(body.get("errorMessage").is_none());
}

#[tokio::test]
async fn refresh_without_cookie_fails_softly() {
    let (app, _) = app().await;
    let response = app.oneshot(refresh_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body, json!({ "ok": false, "errorMessage": "Refresh token doesn't exist" }));
}

#[tokio::test]
async fn refresh_rejects_bad_token_and_unknown_account() {
    let (app, state) = app().await;
    let response = app
        .clone()
        .oneshot(refresh_request(Some("rt=garbage")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["errorMessage"], "Invalid refresh token");

    // An access token is signed with a different secret.
    let pair = state.gql.tokens.issue(1).unwrap();
    let response = app
        .clone()
        .oneshot(refresh_request(Some(&format!("rt={}", pair.access_token))))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["errorMessage"], "Invalid refresh token");

    let response = app
        .oneshot(refresh_request(Some(&format!("rt={}", pair.refresh_token))))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["errorMessage"], "Cannot find account");
}

#[tokio::test]
async fn cors_with_origin_allows_credentials() {
    let server = ServerConfig {
        cors_origin: Some("http://localhost:3000".into()),
        ..ServerConfig::default()
    };
    let (app, _) = app_with(server, false).await;
    let response = app
        .oneshot(
            Request::options("/graphql")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn google_routes_are_absent_without_config() {
    let (app, _) = app().await;
    let response = app
        .oneshot(Request::get("/auth/google/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn google_login_redirects_with_state_cookie() {
    let (app, _) = app_with(ServerConfig::default(), true).await;
    let response = app
        .oneshot(Request::get("/auth/google/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://accounts.example.com/o/oauth2/auth?"));
    assert!(location.contains("client_id=client-id"));

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("agora_oauth_state="));
    let state = cookies[0]
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches("agora_oauth_state=");
    assert!(location.contains(&format!("state={state}")));
}

#[tokio::test]
async fn google_callback_with_wrong_state_redirects_to_failure() {
    let (app, state) = app_with(ServerConfig::default(), true).await;
    let response = app
        .oneshot(
            Request::get("/auth/google/callback?code=abc&state=forged")
                .header(header::COOKIE, "agora_oauth_state=expected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("{}?failure=true", state.gql.frontend.redirect_url).as_str()
    );
}
