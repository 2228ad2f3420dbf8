//! JWT token issuance and verification.
//!
//! Access and refresh tokens share one HS512 signing key and one claim
//! shape; they differ in `token_type` and validity window. Verification
//! here covers parse, signature and expiry policy — the denylist check
//! (the last step of the full verify sequence) lives with the callers
//! that hold a database pool.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{TokenClaims, TokenType, User};

/// Issuer claim stamped into every token.
pub const TOKEN_ISSUER: &str = "tunevault";

/// Signing key and validity windows, shared by issuance and verification.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// Symmetric HS512 signing key.
    pub secret: String,
    /// Access token validity in hours.
    pub access_validity_hours: i64,
    /// Refresh token validity in hours.
    pub refresh_validity_hours: i64,
}

impl TokenSettings {
    /// Access token validity in seconds, as reported in `expiresIn`.
    pub fn access_validity_secs(&self) -> i64 {
        self.access_validity_hours * 3600
    }
}

/// Issue a signed token for `user`.
///
/// No persistence happens on issue; the jti only reaches the denylist
/// when the token is logged out or consumed by a refresh.
pub fn issue_token(
    user: &User,
    token_type: TokenType,
    settings: &TokenSettings,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let validity_hours = match token_type {
        TokenType::Access => settings.access_validity_hours,
        TokenType::Refresh => settings.refresh_validity_hours,
    };
    let claims = TokenClaims {
        sub: user.email.clone(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(validity_hours)).timestamp(),
        jti: Uuid::new_v4().to_string(),
        user_id: user.id,
        token_type,
        scope: user.scope(),
    };
    encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Parse a token, check its signature, and apply the expiry policy for
/// the given class. Every failure collapses to `InvalidToken`.
///
/// Refresh-class checks recompute the deadline as `iat` plus the
/// configured refresh window instead of trusting the embedded `exp`
/// claim, so a refresh token's lifetime is bounded by server policy.
/// Access-class checks use the embedded `exp` directly.
pub fn decode_token(
    token: &str,
    class: TokenType,
    settings: &TokenSettings,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS512);
    // Expiry is class-dependent and checked manually below.
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthError::InvalidToken)?;
    let claims = data.claims;

    let expiry = match class {
        TokenType::Refresh => claims.iat + settings.refresh_validity_hours * 3600,
        TokenType::Access => claims.exp,
    };
    if expiry <= Utc::now().timestamp() {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}
