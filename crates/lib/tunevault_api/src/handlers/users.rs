//! User account request handlers.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{RegisterRequest, UpdateProfileRequest, UserProfileResponse};
use crate::response::ApiResponse;
use crate::services::users;

/// `POST /auth/register` — create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let profile = users::register(&state.pool, &body).await?;
    Ok(Json(ApiResponse::success(profile, "User registered")))
}

/// `PUT /auth/profile/{id}` — update a profile. Requires authentication.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserProfileResponse>>> {
    let profile = users::update_profile(&state.pool, &principal, id, &body).await?;
    Ok(Json(ApiResponse::success(profile, "Profile updated")))
}
