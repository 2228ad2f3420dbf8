//! Domain models.

pub mod auth;
pub mod song;

pub use auth::{InvalidatedToken, OtpRecord, Role, TokenClaims, TokenType, User};
pub use song::Song;
