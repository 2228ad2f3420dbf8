//! End-to-end tests for registration and profile updates.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use common::*;

async fn put_profile(
    app: &TestApp,
    token: &str,
    id: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/auth/profile/{id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn registration_returns_profile_with_default_role() {
    let Some(app) = test_app().await else { return };

    let email = format!("it-{}@music.com", uuid::Uuid::new_v4());
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({
            "email": email,
            "password": "Secret@1",
            "confirmPassword": "Secret@1",
            "username": "Fresh Listener",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["result"]["email"], email.as_str());
    assert_eq!(body["result"]["roles"], json!(["USER"]));
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let Some(app) = test_app().await else { return };
    let (email, _) = register_unique_user(&app).await;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({
            "email": email,
            "password": "Secret@1",
            "confirmPassword": "Secret@1",
            "username": "Copycat",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 101);
}

#[tokio::test]
async fn registration_validates_input() {
    let Some(app) = test_app().await else { return };

    // Short password.
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({
            "email": "short@music.com",
            "password": "abc",
            "confirmPassword": "abc",
            "username": "Shorty",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 104);

    // Mismatched confirmation.
    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({
            "email": "mismatch@music.com",
            "password": "Secret@1",
            "confirmPassword": "Secret@2",
            "username": "Mismatch",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 104);
}

#[tokio::test]
async fn owner_can_update_own_profile() {
    let Some(app) = test_app().await else { return };
    let (email, password) = register_unique_user(&app).await;
    let (access, _) = login(&app, &email, &password).await;
    let id = user_id_by_email(&app, &email).await.to_string();

    let (status, body) = put_profile(&app, &access, &id, json!({"username": "Renamed"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["username"], "Renamed");
}

#[tokio::test]
async fn profile_update_is_forbidden_for_other_users() {
    let Some(app) = test_app().await else { return };
    let (owner_email, _) = register_unique_user(&app).await;
    let owner_id = user_id_by_email(&app, &owner_email).await.to_string();

    let (other_email, other_password) = register_unique_user(&app).await;
    let (other_access, _) = login(&app, &other_email, &other_password).await;

    let (status, body) =
        put_profile(&app, &other_access, &owner_id, json!({"username": "Hijack"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 106);
}

#[tokio::test]
async fn admin_can_update_any_profile() {
    let Some(app) = test_app().await else { return };
    let (user_email, _) = register_unique_user(&app).await;
    let user_id = user_id_by_email(&app, &user_email).await.to_string();

    let (admin_access, _) = login(&app, "admin@music.com", "Admin@123").await;
    let (status, body) = put_profile(
        &app,
        &admin_access,
        &user_id,
        json!({"username": "Admin Renamed"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["username"], "Admin Renamed");
}
