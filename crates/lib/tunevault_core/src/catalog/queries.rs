//! Database queries for the song catalog.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::CatalogError;
use crate::models::song::Song;
use crate::uuid::uuidv7;

#[derive(sqlx::FromRow)]
struct SongRow {
    id: Uuid,
    name: String,
    artist: String,
    genre: String,
    uploaded_by: Uuid,
    file_url: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: row.id,
            name: row.name,
            artist: row.artist,
            genre: row.genre,
            uploaded_by: row.uploaded_by,
            file_url: row.file_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SONG_COLUMNS: &str = "id, name, artist, genre, uploaded_by, file_url, created_at, updated_at";

/// Insert a new song owned by `uploaded_by`.
pub async fn insert_song(
    pool: &PgPool,
    name: &str,
    artist: &str,
    genre: &str,
    uploaded_by: Uuid,
    file_url: &str,
) -> Result<Song, CatalogError> {
    let row = sqlx::query_as::<_, SongRow>(&format!(
        "INSERT INTO songs (id, name, artist, genre, uploaded_by, file_url) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SONG_COLUMNS}"
    ))
    .bind(uuidv7())
    .bind(name)
    .bind(artist)
    .bind(genre)
    .bind(uploaded_by)
    .bind(file_url)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Fetch a song by id regardless of owner.
pub async fn find_song(pool: &PgPool, id: Uuid) -> Result<Option<Song>, CatalogError> {
    let row = sqlx::query_as::<_, SongRow>(&format!(
        "SELECT {SONG_COLUMNS} FROM songs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Song::from))
}

/// Fetch a song by id, enforcing ownership.
///
/// An unknown id is `SongNotFound`; a song owned by someone else is
/// `AccessDenied` — the caller learns the song exists only if it owns it.
pub async fn find_owned_song(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<Song, CatalogError> {
    let song = find_song(pool, id).await?.ok_or(CatalogError::SongNotFound)?;
    if song.uploaded_by != owner {
        return Err(CatalogError::AccessDenied);
    }
    Ok(song)
}

/// Apply a partial update to an owned song.
pub async fn update_song(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    artist: Option<&str>,
    genre: Option<&str>,
    file_url: Option<&str>,
) -> Result<Song, CatalogError> {
    let row = sqlx::query_as::<_, SongRow>(&format!(
        "UPDATE songs SET \
             name = COALESCE($2, name), \
             artist = COALESCE($3, artist), \
             genre = COALESCE($4, genre), \
             file_url = COALESCE($5, file_url), \
             updated_at = now() \
         WHERE id = $1 RETURNING {SONG_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(artist)
    .bind(genre)
    .bind(file_url)
    .fetch_optional(pool)
    .await?
    .ok_or(CatalogError::SongNotFound)?;
    Ok(row.into())
}

/// Delete a song row.
pub async fn delete_song(pool: &PgPool, id: Uuid) -> Result<(), CatalogError> {
    sqlx::query("DELETE FROM songs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// List an owner's songs, optionally filtered by a case-insensitive
/// name fragment. Blank keywords return everything the owner uploaded.
pub async fn search_songs(
    pool: &PgPool,
    owner: Uuid,
    keyword: Option<&str>,
) -> Result<Vec<Song>, CatalogError> {
    let rows = match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(keyword) => {
            sqlx::query_as::<_, SongRow>(&format!(
                "SELECT {SONG_COLUMNS} FROM songs \
                 WHERE uploaded_by = $1 AND name ILIKE $2 \
                 ORDER BY created_at DESC"
            ))
            .bind(owner)
            .bind(format!("%{keyword}%"))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SongRow>(&format!(
                "SELECT {SONG_COLUMNS} FROM songs \
                 WHERE uploaded_by = $1 ORDER BY created_at DESC"
            ))
            .bind(owner)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows.into_iter().map(Song::from).collect())
}

/// One page of an owner's songs, newest first, plus the total count.
pub async fn songs_page(
    pool: &PgPool,
    owner: Uuid,
    page: i64,
    size: i64,
) -> Result<(Vec<Song>, i64), CatalogError> {
    let rows = sqlx::query_as::<_, SongRow>(&format!(
        "SELECT {SONG_COLUMNS} FROM songs \
         WHERE uploaded_by = $1 ORDER BY created_at DESC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(owner)
    .bind(size)
    .bind(page * size)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM songs WHERE uploaded_by = $1")
        .bind(owner)
        .fetch_one(pool)
        .await?;

    Ok((rows.into_iter().map(Song::from).collect(), total))
}
