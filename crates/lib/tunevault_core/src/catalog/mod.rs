//! Song catalog logic: CRUD, search and pagination over the `songs` table.

pub mod queries;

use thiserror::Error;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Song not found")]
    SongNotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
