//! Shared helpers for integration tests.
//!
//! Suites run against the database named by `TEST_DATABASE_URL` and
//! self-skip when the variable is unset, so `cargo test` stays green on
//! machines without PostgreSQL.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use tunevault_api::config::ApiConfig;
use tunevault_api::services::email::{EmailOutbox, Mailer};
use tunevault_api::{AppState, router};

pub const TEST_JWT_SECRET: &str = "integration-test-signing-key";

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    // Held so the upload dir outlives the test.
    _upload_dir: tempfile::TempDir,
}

/// Connect, migrate, seed, and build a router. Returns `None` (after
/// logging a skip notice) when `TEST_DATABASE_URL` is unset.
pub async fn test_app() -> Option<TestApp> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPool::connect(&url).await.expect("connect test database");
    tunevault_api::migrate(&pool).await.expect("run migrations");
    tunevault_core::seed::ensure_default_accounts(&pool)
        .await
        .expect("seed default accounts");

    let upload_dir = tempfile::tempdir().expect("create upload dir");
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: url,
        jwt_secret: TEST_JWT_SECRET.into(),
        access_token_hours: 1,
        refresh_token_hours: 24,
        upload_dir: upload_dir.path().to_path_buf(),
        smtp: None,
        mail_from: "Tunevault <no-reply@music.com>".into(),
    };
    let outbox = EmailOutbox::spawn(Mailer::Console);

    let state = AppState {
        pool: pool.clone(),
        config,
        outbox,
    };
    Some(TestApp {
        router: router(state),
        pool,
        _upload_dir: upload_dir,
    })
}

/// POST a JSON body, returning status plus the parsed envelope.
pub async fn post_json(
    app: &TestApp,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// GET with a bearer token, returning status plus the parsed envelope.
pub async fn get_with_token(
    app: &TestApp,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Dispatch any request and parse the JSON response body.
pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.router.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Register a fresh user with a unique email; returns (email, password).
pub async fn register_unique_user(app: &TestApp) -> (String, String) {
    let email = format!("it-{}@music.com", Uuid::new_v4());
    let password = "Secret@1".to_string();
    let (status, body) = post_json(
        app,
        "/auth/register",
        serde_json::json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
            "username": "Integration User",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    (email, password)
}

/// Login, returning (accessToken, refreshToken).
pub async fn login(app: &TestApp, email: &str, password: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/auth/login",
        serde_json::json!({"email": email, "password": password}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let result = &body["result"];
    (
        result["accessToken"].as_str().expect("accessToken").to_string(),
        result["refreshToken"].as_str().expect("refreshToken").to_string(),
    )
}

/// Fetch a user's id by email, straight from the store.
pub async fn user_id_by_email(app: &TestApp, email: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(&app.pool)
        .await
        .expect("user id")
}

/// Fetch the newest OTP code issued for a user.
pub async fn latest_otp_code(app: &TestApp, user_id: Uuid) -> String {
    sqlx::query_scalar::<_, String>(
        "SELECT otp_code FROM otp_tokens WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_one(&app.pool)
    .await
    .expect("otp code")
}
