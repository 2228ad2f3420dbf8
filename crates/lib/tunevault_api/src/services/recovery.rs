//! Password recovery — OTP issuance, verification and the reset itself.
//!
//! Recovery state is inferred from the OTP store: no row means awaiting
//! a request, an unverified row means a code is out, a verified row is a
//! single-use reset grant. The verify step converts a live code into a
//! grant; the reset step redeems a grant or a never-verified live code,
//! deleting the row either way, so every code is accepted at most once
//! per step.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use tunevault_core::auth::otp::{OTP_VALIDITY_MINUTES, generate_otp_code};
use tunevault_core::auth::{password, queries};
use tunevault_core::models::auth::{OtpRecord, User};

use crate::error::{AppError, AppResult};
use crate::models::UserProfileResponse;
use crate::services::email::{EmailOutbox, OutboundEmail};

/// Issue a new OTP for the account and queue the notification email.
///
/// Delivery is fire-and-forget: the OTP is valid regardless of whether
/// the email ever arrives.
pub async fn send_otp(pool: &PgPool, outbox: &EmailOutbox, email: &str) -> AppResult<()> {
    let user = resolve_user(pool, email).await?;

    let purged = queries::purge_expired_otps(pool, user.id).await?;
    if purged > 0 {
        debug!(user_id = %user.id, purged, "purged expired OTP records");
    }

    let code = generate_otp_code();
    let expires_at = Utc::now() + Duration::minutes(OTP_VALIDITY_MINUTES);
    queries::insert_otp(pool, user.id, &code, expires_at).await?;

    outbox.enqueue(OutboundEmail::otp(&user.email, &code, OTP_VALIDITY_MINUTES));
    info!(email, "OTP issued");
    Ok(())
}

/// Check a submitted code and, on success, turn it into a reset grant.
///
/// A code that was already verified stays untouched: only the reset
/// step may redeem a grant, and a repeat verify reports `InvalidOtp`.
pub async fn verify_otp(pool: &PgPool, email: &str, otp_code: &str) -> AppResult<()> {
    let user = resolve_user(pool, email).await?;
    let record = lookup_live_otp(pool, &user, otp_code).await?;
    if record.verified {
        return Err(AppError::InvalidOtp);
    }
    queries::mark_otp_verified(pool, record.id).await?;
    info!(email, "OTP verified");
    Ok(())
}

/// Reset the password, consuming the OTP (grant or live code).
pub async fn reset_password(
    pool: &PgPool,
    email: &str,
    otp_code: &str,
    new_password: &str,
    confirm_password: &str,
) -> AppResult<UserProfileResponse> {
    if new_password != confirm_password {
        return Err(AppError::InvalidRequest(
            "Password confirmation does not match".into(),
        ));
    }

    let user = resolve_user(pool, email).await?;
    let record = lookup_live_otp(pool, &user, otp_code).await?;
    queries::delete_otp(pool, record.id).await?;

    let hash = password::hash_password(new_password)?;
    let updated = queries::update_password(pool, user.id, &hash)
        .await?
        .ok_or(AppError::UserNotFound)?;

    info!(email, "password reset");
    Ok(updated.into())
}

async fn resolve_user(pool: &PgPool, email: &str) -> AppResult<User> {
    queries::find_user_by_email(pool, email)
        .await?
        .ok_or(AppError::UserNotFound)
}

/// Fetch the OTP record for (user, trimmed code), deleting it when it
/// has expired. A miss does not mutate the store.
async fn lookup_live_otp(pool: &PgPool, user: &User, otp_code: &str) -> AppResult<OtpRecord> {
    let record = queries::find_otp(pool, user.id, otp_code.trim())
        .await?
        .ok_or(AppError::InvalidOtp)?;
    if record.is_expired(Utc::now()) {
        queries::delete_otp(pool, record.id).await?;
        return Err(AppError::InvalidOtp);
    }
    Ok(record)
}
