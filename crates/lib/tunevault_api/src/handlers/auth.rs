//! Authentication and recovery request handlers.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    ResetPasswordRequest, UserProfileResponse, VerifyOtpRequest,
};
use crate::response::ApiResponse;
use crate::services::{auth, recovery};

/// `POST /auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let resp = auth::login(
        &state.pool,
        &body.email,
        &body.password,
        &state.config.token_settings(),
    )
    .await?;
    Ok(Json(ApiResponse::success(resp, "Login successful")))
}

/// `POST /auth/refresh` — exchange a refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let resp = auth::refresh(
        &state.pool,
        &body.refresh_token,
        &state.config.token_settings(),
    )
    .await?;
    Ok(Json(ApiResponse::success(resp, "Token refreshed")))
}

/// `POST /auth/logout` — revoke an access token.
pub async fn logout_handler(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth::logout(&state.pool, &body.token, &state.config.token_settings()).await?;
    Ok(Json(ApiResponse::ok("Logged out")))
}

/// `POST /auth/forgot-password` — issue an OTP and queue the email.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    recovery::send_otp(&state.pool, &state.outbox, &body.email).await?;
    Ok(Json(ApiResponse::ok("OTP sent")))
}

/// `POST /auth/verify-otp` — check a submitted OTP code.
pub async fn verify_otp_handler(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    recovery::verify_otp(&state.pool, &body.email, &body.otp_code).await?;
    Ok(Json(ApiResponse::ok("OTP verified")))
}

/// `POST /auth/reset-password` — reset the password using an OTP.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let profile = recovery::reset_password(
        &state.pool,
        &body.email,
        &body.otp_code,
        &body.new_password,
        &body.confirm_password,
    )
    .await?;
    Ok(Json(ApiResponse::success(profile, "Password updated")))
}
