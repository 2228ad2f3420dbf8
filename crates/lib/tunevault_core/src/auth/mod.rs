//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT issuance/verification, OTP codes, and
//! the database queries backing the credential store, token denylist and
//! OTP store.

pub mod jwt;
pub mod otp;
pub mod password;
pub mod queries;

use thiserror::Error;

/// Authentication errors.
///
/// Token and OTP failures are deliberately coarse: malformed, forged,
/// expired and revoked tokens all surface as `InvalidToken`, and missing,
/// expired and mismatched codes all surface as `InvalidOtp`, so the caller
/// learns nothing about which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
