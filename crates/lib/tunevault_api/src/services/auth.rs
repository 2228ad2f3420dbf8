//! Authentication service — login, refresh, logout and the shared
//! token verification primitive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use tunevault_core::auth::jwt::{self, TokenSettings};
use tunevault_core::auth::{AuthError, password, queries};
use tunevault_core::models::auth::{TokenClaims, TokenType, User};

use crate::error::{AppError, AppResult};
use crate::models::AuthResponse;

/// Full token verification: parse, signature, class-dependent expiry,
/// then the denylist.
///
/// The denylist lookup runs last so an expired token and a revoked one
/// produce the same `InvalidToken`, leaking nothing about why a token
/// was rejected.
pub async fn verify_token(
    pool: &PgPool,
    token: &str,
    class: TokenType,
    settings: &TokenSettings,
) -> Result<TokenClaims, AuthError> {
    let claims = jwt::decode_token(token, class, settings)?;
    if queries::is_token_denylisted(pool, &claims.jti).await? {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// Issue a fresh access+refresh pair for an authenticated user.
fn issue_pair(user: &User, settings: &TokenSettings) -> AppResult<AuthResponse> {
    let access_token = jwt::issue_token(user, TokenType::Access, settings)?;
    let refresh_token = jwt::issue_token(user, TokenType::Refresh, settings)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: settings.access_validity_secs(),
    })
}

/// Authenticate with email + password.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password_input: &str,
    settings: &TokenSettings,
) -> AppResult<AuthResponse> {
    let user = queries::find_user_by_email(pool, email)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if !password::verify_password(password_input, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    info!(email, "login");
    issue_pair(&user, settings)
}

/// Exchange a refresh token for a new pair, consuming the old one.
pub async fn refresh(
    pool: &PgPool,
    refresh_token: &str,
    settings: &TokenSettings,
) -> AppResult<AuthResponse> {
    let claims = verify_token(pool, refresh_token, TokenType::Refresh, settings).await?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::InvalidToken);
    }

    let user = queries::find_user_by_email(pool, &claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    // Rotate before issuing: the conditional insert makes the old jti
    // single-use, so of two racing refreshes only one wins.
    let expiry = claim_expiry(&claims)?;
    if !queries::denylist_token(pool, &claims.jti, expiry).await? {
        return Err(AppError::InvalidToken);
    }

    info!(email = %claims.sub, "refresh token rotated");
    issue_pair(&user, settings)
}

/// Revoke an access token by denylisting its jti until its natural expiry.
///
/// A second logout with the same token fails verification above (the jti
/// is now denylisted) and reports `InvalidToken` rather than crashing.
pub async fn logout(pool: &PgPool, token: &str, settings: &TokenSettings) -> AppResult<()> {
    let claims = verify_token(pool, token, TokenType::Access, settings).await?;
    let expiry = claim_expiry(&claims)?;
    queries::denylist_token(pool, &claims.jti, expiry).await?;
    info!(email = %claims.sub, "logout");
    Ok(())
}

fn claim_expiry(claims: &TokenClaims) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(claims.exp, 0).ok_or(AppError::InvalidToken)
}
