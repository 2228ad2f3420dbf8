//! API server configuration.

use std::path::PathBuf;

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::info;

use tunevault_core::auth::jwt::TokenSettings;

/// SMTP relay settings for outbound mail.
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret, shared by issuance and verification.
    pub jwt_secret: String,
    /// Access token validity in hours.
    pub access_token_hours: i64,
    /// Refresh token validity in hours.
    pub refresh_token_hours: i64,
    /// Directory where uploaded song files land.
    pub upload_dir: PathBuf,
    /// SMTP relay; `None` switches outbound mail to the console transport.
    pub smtp: Option<SmtpSettings>,
    /// Sender mailbox for outbound mail.
    pub mail_from: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable            | Default                                    |
    /// |---------------------|--------------------------------------------|
    /// | `BIND_ADDR`         | `127.0.0.1:8080`                           |
    /// | `DATABASE_URL`      | `postgres://localhost:5432/tunevault`      |
    /// | `JWT_SECRET`        | generated & persisted to file              |
    /// | `JWT_VALID_HOURS`   | `1`                                        |
    /// | `JWT_REFRESH_HOURS` | `24`                                       |
    /// | `UPLOAD_DIR`        | `uploads`                                  |
    /// | `SMTP_HOST` etc.    | unset — console mail transport             |
    /// | `MAIL_FROM`         | `Tunevault <no-reply@music.com>`           |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/tunevault".into()),
            jwt_secret: resolve_jwt_secret(),
            access_token_hours: env_hours("JWT_VALID_HOURS", 1),
            refresh_token_hours: env_hours("JWT_REFRESH_HOURS", 24),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            smtp: smtp_from_env(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Tunevault <no-reply@music.com>".into()),
        }
    }

    /// Signing key and validity windows for the token engine.
    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.jwt_secret.clone(),
            access_validity_hours: self.access_token_hours,
            refresh_validity_hours: self.refresh_token_hours,
        }
    }
}

fn env_hours(var: &str, default: i64) -> i64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn smtp_from_env() -> Option<SmtpSettings> {
    let host = std::env::var("SMTP_HOST").ok()?;
    Some(SmtpSettings {
        host,
        port: std::env::var("SMTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(587),
        username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
        password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
    })
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tunevault")
        .join("jwt-secret")
}
