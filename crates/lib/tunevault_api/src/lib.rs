//! # tunevault_api
//!
//! HTTP API library for Tunevault.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::ApiConfig;
use crate::handlers::{auth, songs, users};
use crate::services::email::EmailOutbox;

/// Maximum accepted upload size (50 MiB).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Fire-and-forget outbound mail queue.
    pub outbox: EmailOutbox,
}

/// Run embedded database migrations.
///
/// Delegates to `tunevault_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tunevault_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no bearer token required; refresh/logout/reset carry
    // their token or OTP in the body)
    let public = Router::new()
        .route("/auth/register", post(users::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/refresh", post(auth::refresh_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/forgot-password", post(auth::forgot_password_handler))
        .route("/auth/verify-otp", post(auth::verify_otp_handler))
        .route("/auth/reset-password", post(auth::reset_password_handler));

    // Protected routes (require a verified access token)
    let protected = Router::new()
        .route("/auth/profile/{id}", put(users::update_profile_handler))
        .route("/songs", post(songs::upload_song_handler))
        .route("/songs/search", get(songs::search_songs_handler))
        .route("/songs/page", get(songs::paged_songs_handler))
        .route(
            "/songs/{id}",
            get(songs::get_song_handler)
                .put(songs::update_song_handler)
                .delete(songs::delete_song_handler),
        )
        .route("/songs/{id}/play", get(songs::play_song_handler))
        .nest_service("/files", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
