//! User account service — registration and profile updates.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use tunevault_core::auth::{password, queries};
use tunevault_core::models::auth::Role;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{RegisterRequest, UpdateProfileRequest, UserProfileResponse};

/// Register a new account with the default `USER` role.
pub async fn register(pool: &PgPool, request: &RegisterRequest) -> AppResult<UserProfileResponse> {
    validate_registration(request)?;

    if queries::email_exists(pool, &request.email).await? {
        return Err(AppError::UserExisted);
    }

    let hash = password::hash_password(&request.password)?;
    let user = match queries::create_user(
        pool,
        &request.username,
        &request.email,
        &hash,
        &[Role::User],
    )
    .await
    {
        Ok(user) => user,
        // A concurrent registration can slip past the exists check.
        Err(tunevault_core::auth::AuthError::Db(sqlx::Error::Database(e)))
            if e.is_unique_violation() =>
        {
            return Err(AppError::UserExisted);
        }
        Err(e) => return Err(e.into()),
    };

    info!(email = %user.email, "user registered");
    Ok(user.into())
}

/// Update a user's profile. Only the owner or an administrator may.
pub async fn update_profile(
    pool: &PgPool,
    principal: &AuthenticatedUser,
    id: Uuid,
    request: &UpdateProfileRequest,
) -> AppResult<UserProfileResponse> {
    if principal.user_id != id && !principal.roles.contains(&Role::Admin) {
        return Err(AppError::Forbidden);
    }

    let user = queries::find_user_by_id(pool, id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let Some(username) = request.username.as_deref() else {
        return Ok(user.into());
    };
    validate_username(username)?;

    let updated = queries::update_username(pool, id, username)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(updated.into())
}

fn validate_registration(request: &RegisterRequest) -> AppResult<()> {
    if !request.email.contains('@') {
        return Err(AppError::InvalidRequest("Invalid email".into()));
    }
    if request.password.len() < 6 || request.password.len() > 30 {
        return Err(AppError::InvalidRequest(
            "Password must be 6-30 characters".into(),
        ));
    }
    if request.password != request.confirm_password {
        return Err(AppError::InvalidRequest(
            "Password confirmation does not match".into(),
        ));
    }
    validate_username(&request.username)
}

fn validate_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if !(2..=50).contains(&len) {
        return Err(AppError::InvalidRequest(
            "Username must be 2-50 characters".into(),
        ));
    }
    Ok(())
}
