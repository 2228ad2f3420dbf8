//! # tunevault_core
//!
//! Core domain logic for Tunevault: token issuance and verification,
//! password hashing, OTP lifecycle, and the persisted stores (users,
//! token denylist, OTP records, songs).

pub mod auth;
pub mod catalog;
pub mod migrate;
pub mod models;
pub mod seed;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
