//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API-facing DTOs
//! (which carry `#[serde(rename)]` for the camelCase wire format).

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role.
///
/// Roles travel on the wire as a space-joined `scope` claim
/// (e.g. `"ADMIN USER"`); internally they are a typed set so that
/// capability checks never parse strings at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Parse a single role name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    /// Parse a space-joined `scope` claim into a role set.
    /// Unknown names are ignored to stay wire-compatible.
    pub fn parse_scope(scope: &str) -> HashSet<Role> {
        scope.split_whitespace().filter_map(Role::parse).collect()
    }

    /// Join role names into the space-joined `scope` wire format.
    pub fn join_scope(roles: &[Role]) -> String {
        roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain user as persisted in the `users` table.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Space-joined role names for the token `scope` claim.
    pub fn scope(&self) -> String {
        Role::join_scope(&self.roles)
    }
}

/// Discriminates access from refresh tokens inside the claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens.
///
/// Both classes are signed with the same key and carry the same shape;
/// they differ only in `token_type` and validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user email.
    pub sub: String,
    /// Issuer — fixed service name.
    pub iss: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Unique token identifier, the denylist key.
    pub jti: String,
    /// Owning user id.
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// `access` or `refresh`.
    pub token_type: TokenType,
    /// Space-joined role names.
    pub scope: String,
}

impl TokenClaims {
    /// Typed view of the `scope` claim.
    pub fn roles(&self) -> HashSet<Role> {
        Role::parse_scope(&self.scope)
    }
}

/// Denylist entry: a revoked-but-not-yet-expired token identifier.
#[derive(Debug, Clone)]
pub struct InvalidatedToken {
    pub jti: String,
    pub expiry_time: DateTime<Utc>,
}

/// One-time password record gating a password reset.
///
/// `verified` flips to true when the code passes the verify step,
/// turning the row into a single-use reset grant.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub otp_code: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
