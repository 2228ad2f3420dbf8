//! Application error types.
//!
//! Every domain error carries a stable numeric code and a human message,
//! rendered through the response envelope. Token and OTP failures are
//! deliberately coarse so callers cannot distinguish expired from forged
//! from revoked. Anything unexpected collapses into `Uncategorized`
//! without leaking internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

/// Convenience alias for handler and service return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with envelope code and HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("User existed")]
    UserExisted,

    #[error("User not exist")]
    UserNotFound,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("You do not have permission")]
    Forbidden,

    #[error("Wrong password")]
    InvalidCredentials,

    #[error("Invalid file type")]
    InvalidFile,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid or Expired OTP")]
    InvalidOtp,

    #[error("Song not found")]
    SongNotFound,

    #[error("Failed to send email")]
    EmailSendFailed,

    #[error("Uncategorized error")]
    Uncategorized(String),
}

impl AppError {
    /// Stable numeric code reported in the envelope.
    pub fn code(&self) -> i32 {
        match self {
            AppError::Uncategorized(_) => 99,
            AppError::UserExisted => 101,
            AppError::UserNotFound => 102,
            AppError::Unauthenticated => 103,
            AppError::InvalidRequest(_) => 104,
            AppError::InvalidToken => 105,
            AppError::Forbidden => 106,
            AppError::InvalidCredentials => 110,
            AppError::InvalidFile => 121,
            AppError::AccessDenied => 122,
            AppError::InvalidOtp => 152,
            AppError::SongNotFound => 1008,
            AppError::EmailSendFailed => 1009,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::UserExisted
            | AppError::InvalidRequest(_)
            | AppError::InvalidToken
            | AppError::InvalidCredentials
            | AppError::InvalidFile
            | AppError::InvalidOtp => StatusCode::BAD_REQUEST,
            AppError::UserNotFound | AppError::SongNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::EmailSendFailed | AppError::Uncategorized(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InvalidRequest(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Uncategorized(detail) = &self {
            error!(detail, "uncategorized error");
        }
        let body = Json(ApiResponse::error(self.code(), self.message()));
        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Uncategorized(e.to_string())
    }
}

impl From<tunevault_core::auth::AuthError> for AppError {
    fn from(e: tunevault_core::auth::AuthError) -> Self {
        use tunevault_core::auth::AuthError;
        match e {
            AuthError::InvalidToken => AppError::InvalidToken,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::UserNotFound => AppError::UserNotFound,
            AuthError::InvalidOtp => AppError::InvalidOtp,
            AuthError::Db(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Uncategorized(msg),
        }
    }
}

impl From<tunevault_core::catalog::CatalogError> for AppError {
    fn from(e: tunevault_core::catalog::CatalogError) -> Self {
        use tunevault_core::catalog::CatalogError;
        match e {
            CatalogError::SongNotFound => AppError::SongNotFound,
            CatalogError::AccessDenied => AppError::AccessDenied,
            CatalogError::Db(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::UserExisted.code(), 101);
        assert_eq!(AppError::UserNotFound.code(), 102);
        assert_eq!(AppError::InvalidToken.code(), 105);
        assert_eq!(AppError::InvalidOtp.code(), 152);
        assert_eq!(AppError::SongNotFound.code(), 1008);
        assert_eq!(AppError::Uncategorized("x".into()).code(), 99);
    }

    #[test]
    fn uncategorized_hides_detail() {
        let err = AppError::Uncategorized("connection refused at 10.0.0.3".into());
        assert_eq!(err.message(), "Uncategorized error");
    }

    #[test]
    fn token_failures_share_one_kind() {
        use tunevault_core::auth::AuthError;
        // Expired, forged and revoked all arrive as the same variant.
        let mapped = AppError::from(AuthError::InvalidToken);
        assert_eq!(mapped.code(), 105);
        assert_eq!(mapped.status(), StatusCode::BAD_REQUEST);
    }
}
