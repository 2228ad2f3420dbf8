//! Service layer orchestrating core operations for the handlers.

pub mod auth;
pub mod email;
pub mod recovery;
pub mod songs;
pub mod users;
