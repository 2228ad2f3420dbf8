//! Authentication middleware — Bearer token extraction and verification.
//!
//! The boundary owns all token handling: it verifies the access token
//! (including the denylist) and injects a trusted principal into request
//! extensions. Resource logic downstream never sees the raw token.

use std::collections::HashSet;

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use tunevault_core::models::auth::{Role, TokenClaims, TokenType};

use crate::AppState;
use crate::error::AppError;
use crate::services::auth::verify_token;

/// The verified identity stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub roles: HashSet<Role>,
}

impl From<TokenClaims> for AuthenticatedUser {
    fn from(claims: TokenClaims) -> Self {
        AuthenticatedUser {
            user_id: claims.user_id,
            email: claims.sub.clone(),
            roles: claims.roles(),
        }
    }
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies
/// the access token, and injects `AuthenticatedUser` into request
/// extensions. Rejects with `Unauthenticated` before any resource logic
/// runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthenticated)?;

    let claims = verify_token(
        &state.pool,
        token,
        TokenType::Access,
        &state.config.token_settings(),
    )
    .await
    .map_err(|_| AppError::Unauthenticated)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}
