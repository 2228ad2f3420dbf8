//! Default account seeding, run once at startup after migrations.

use sqlx::PgPool;
use tracing::info;

use crate::auth::{AuthError, password, queries};
use crate::models::auth::Role;

/// Ensure the default administrator and demo user accounts exist.
/// Existing accounts are left untouched.
pub async fn ensure_default_accounts(pool: &PgPool) -> Result<(), AuthError> {
    seed_account(pool, "Administrator", "admin@music.com", "Admin@123", Role::Admin).await?;
    seed_account(pool, "Default User", "user@music.com", "User@123", Role::User).await?;
    Ok(())
}

async fn seed_account(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), AuthError> {
    if queries::email_exists(pool, email).await? {
        return Ok(());
    }
    let hash = password::hash_password(password)?;
    // Conflict-free: a concurrent seeder may have won the race.
    if queries::create_user_if_absent(pool, username, email, &hash, &[role]).await? {
        info!(email, role = %role, "seeded default account");
    }
    Ok(())
}
