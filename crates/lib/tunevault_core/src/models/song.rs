//! Song catalog domain model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A song record as persisted in the `songs` table.
#[derive(Debug, Clone)]
pub struct Song {
    pub id: Uuid,
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub uploaded_by: Uuid,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
