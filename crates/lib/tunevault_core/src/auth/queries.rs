//! Database queries for the credential store, token denylist and OTP store.
//!
//! All operations are single-row reads/writes; correctness under
//! concurrency relies on per-row atomicity, with the denylist insert
//! doubling as the conditional write that enforces single-use refresh.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{OtpRecord, Role, User};
use crate::uuid::uuidv7;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            roles: row.roles.iter().filter_map(|r| Role::parse(r)).collect(),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, roles, is_active, created_at, updated_at";

/// Fetch a user by email (unique, matched as stored).
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(User::from))
}

/// Fetch a user by id.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(User::from))
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Create a new user record.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    roles: &[Role],
) -> Result<User, AuthError> {
    let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (username, email, password_hash, roles) \
         VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(&role_names)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Insert a user unless the email is already taken. Returns `true` when
/// the row was inserted; safe under concurrent callers.
pub async fn create_user_if_absent(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    roles: &[Role],
) -> Result<bool, AuthError> {
    let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, roles) \
         VALUES ($1, $2, $3, $4) ON CONFLICT (email) DO NOTHING",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(&role_names)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Update a user's display name.
pub async fn update_username(
    pool: &PgPool,
    id: Uuid,
    username: &str,
) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET username = $2, updated_at = now() WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(User::from))
}

/// Replace a user's password hash.
pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(User::from))
}

// ---------------------------------------------------------------------------
// Token denylist
// ---------------------------------------------------------------------------

/// Add a jti to the denylist with the token's original expiry.
///
/// Returns `true` if this call inserted the row and `false` when the jti
/// was already present. The conditional insert is what makes refresh
/// rotation single-use under concurrency: of two racing refreshes, only
/// one observes `true`.
pub async fn denylist_token(
    pool: &PgPool,
    jti: &str,
    expiry_time: DateTime<Utc>,
) -> Result<bool, AuthError> {
    let result = sqlx::query(
        "INSERT INTO invalidated_tokens (jti, expiry_time) VALUES ($1, $2) \
         ON CONFLICT (jti) DO NOTHING",
    )
    .bind(jti)
    .bind(expiry_time)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Check denylist membership for a jti.
pub async fn is_token_denylisted(pool: &PgPool, jti: &str) -> Result<bool, AuthError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM invalidated_tokens WHERE jti = $1)",
    )
    .bind(jti)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Garbage-collect denylist entries whose recorded expiry has passed.
/// Such tokens are already dead by natural expiry, so dropping the rows
/// never un-revokes anything.
pub async fn purge_expired_denylist(pool: &PgPool) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM invalidated_tokens WHERE expiry_time <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// OTP store
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    user_id: Uuid,
    otp_code: String,
    verified: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<OtpRow> for OtpRecord {
    fn from(row: OtpRow) -> Self {
        OtpRecord {
            id: row.id,
            user_id: row.user_id,
            otp_code: row.otp_code,
            verified: row.verified,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Persist a freshly issued OTP for a user.
pub async fn insert_otp(
    pool: &PgPool,
    user_id: Uuid,
    otp_code: &str,
    expires_at: DateTime<Utc>,
) -> Result<OtpRecord, AuthError> {
    let row = sqlx::query_as::<_, OtpRow>(
        "INSERT INTO otp_tokens (id, user_id, otp_code, expires_at) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, user_id, otp_code, verified, expires_at, created_at",
    )
    .bind(uuidv7())
    .bind(user_id)
    .bind(otp_code)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Look up an OTP by (user, code). A miss does not mutate anything.
pub async fn find_otp(
    pool: &PgPool,
    user_id: Uuid,
    otp_code: &str,
) -> Result<Option<OtpRecord>, AuthError> {
    let row = sqlx::query_as::<_, OtpRow>(
        "SELECT id, user_id, otp_code, verified, expires_at, created_at \
         FROM otp_tokens WHERE user_id = $1 AND otp_code = $2",
    )
    .bind(user_id)
    .bind(otp_code)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(OtpRecord::from))
}

/// Flip an OTP into a reset grant after a successful verify step.
pub async fn mark_otp_verified(pool: &PgPool, id: Uuid) -> Result<(), AuthError> {
    sqlx::query("UPDATE otp_tokens SET verified = true WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove a consumed or expired OTP record.
pub async fn delete_otp(pool: &PgPool, id: Uuid) -> Result<(), AuthError> {
    sqlx::query("DELETE FROM otp_tokens WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Purge a user's OTP records whose expiry has already passed.
/// Called when a new OTP is issued for the same user.
pub async fn purge_expired_otps(pool: &PgPool, user_id: Uuid) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM otp_tokens WHERE user_id = $1 AND expires_at <= now()")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
