//! End-to-end tests for login, refresh rotation and logout.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn login_returns_verifiable_token_pair() {
    let Some(app) = test_app().await else { return };

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"email": "user@music.com", "password": "User@123"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    let result = &body["result"];
    assert_eq!(result["tokenType"], "Bearer");
    assert_eq!(result["expiresIn"], 3600);

    // The access token verifies immediately after issuance.
    let access = result["accessToken"].as_str().unwrap();
    let (status, _) = get_with_token(&app, "/songs/page", access).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let Some(app) = test_app().await else { return };

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"email": "user@music.com", "password": "nope"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 110);
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn login_with_unknown_email_is_rejected() {
    let Some(app) = test_app().await else { return };

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({"email": "ghost@music.com", "password": "whatever"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 102);
}

#[tokio::test]
async fn refresh_rotates_and_old_token_dies() {
    let Some(app) = test_app().await else { return };
    let (email, password) = register_unique_user(&app).await;
    let (_, refresh) = login(&app, &email, &password).await;

    // First refresh succeeds and mints a new pair.
    let (status, body) =
        post_json(&app, "/auth/refresh", json!({"refreshToken": refresh})).await;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = body["result"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // The consumed refresh token is now denylisted despite being unexpired.
    let (status, body) =
        post_json(&app, "/auth/refresh", json!({"refreshToken": refresh})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 105);

    // The newly issued refresh token still verifies.
    let (status, _) =
        post_json(&app, "/auth/refresh", json!({"refreshToken": new_refresh})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_access_tokens() {
    let Some(app) = test_app().await else { return };
    let (email, password) = register_unique_user(&app).await;
    let (access, _) = login(&app, &email, &password).await;

    let (status, body) = post_json(&app, "/auth/refresh", json!({"refreshToken": access})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 105);
}

#[tokio::test]
async fn refresh_window_bounds_forged_exp_claim() {
    let Some(app) = test_app().await else { return };
    let (email, _password) = register_unique_user(&app).await;
    let user_id = user_id_by_email(&app, &email).await;

    // Forge a refresh token with the real key whose embedded exp lies far
    // in the future but whose issue time exceeds the 24h policy window.
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": email,
        "iss": "tunevault",
        "iat": now - 25 * 3600,
        "exp": now + 1000 * 3600,
        "jti": uuid::Uuid::new_v4().to_string(),
        "userId": user_id,
        "token_type": "refresh",
        "scope": "USER",
    });
    let forged = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = post_json(&app, "/auth/refresh", json!({"refreshToken": forged})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 105);
}

#[tokio::test]
async fn logout_revokes_access_token_and_is_safe_to_repeat() {
    let Some(app) = test_app().await else { return };
    let (email, password) = register_unique_user(&app).await;
    let (access, _) = login(&app, &email, &password).await;

    // Token works before logout.
    let (status, _) = get_with_token(&app, "/songs/page", &access).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(&app, "/auth/logout", json!({"token": access})).await;
    assert_eq!(status, StatusCode::OK);

    // Denylisted before natural expiry.
    let (status, body) = get_with_token(&app, "/songs/page", &access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 103);

    // A second logout reports InvalidToken instead of crashing.
    let (status, body) = post_json(&app, "/auth/logout", json!({"token": access})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 105);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let Some(app) = test_app().await else { return };

    let request = axum::http::Request::builder()
        .uri("/songs/page")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 103);

    let (status, body) = get_with_token(&app, "/songs/page", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 103);
}
