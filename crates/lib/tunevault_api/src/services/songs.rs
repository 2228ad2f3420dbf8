//! Song catalog service — upload, CRUD, search, pagination, streaming.

use std::path::Path;

use axum::body::Body;
use axum::extract::Multipart;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use sqlx::PgPool;
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;

use tunevault_core::catalog::queries;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateSongRequest, SongResponse, UpdateSongRequest};
use crate::response::PagedResponse;

/// Accepted upload extensions and their streaming content types.
const AUDIO_EXT: &str = "mp3";
const VIDEO_EXT: &str = "mp4";

/// Create a song from a multipart upload: an `info` JSON part plus the
/// media `file` part. The stored file location always wins over any
/// `fileUrl` the client put in the info JSON.
pub async fn create_from_multipart(
    state: &AppState,
    principal: &AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<SongResponse> {
    let mut info: Option<CreateSongRequest> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidRequest("Malformed multipart body".into()))?
    {
        let part = field.name().unwrap_or_default().to_string();
        match part.as_str() {
            "info" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| AppError::InvalidRequest("Unreadable info part".into()))?;
                info = Some(
                    serde_json::from_str(&text)
                        .map_err(|_| AppError::InvalidRequest("Invalid song info".into()))?,
                );
            }
            "file" => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::InvalidRequest("Unreadable file part".into()))?;
                file = Some((name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let info = info.ok_or_else(|| AppError::InvalidRequest("Missing info part".into()))?;
    validate_song_info(&info)?;
    let (file_name, bytes) =
        file.ok_or_else(|| AppError::InvalidRequest("Missing file part".into()))?;

    let file_url = store_file(&state.config.upload_dir, &file_name, &bytes).await?;
    let song = queries::insert_song(
        &state.pool,
        &info.name,
        &info.artist,
        &info.genre,
        principal.user_id,
        &file_url,
    )
    .await?;

    info!(song_id = %song.id, owner = %principal.email, "song uploaded");
    Ok(song.into())
}

/// Apply a partial update to a song the principal owns.
pub async fn update(
    pool: &PgPool,
    principal: &AuthenticatedUser,
    id: Uuid,
    request: &UpdateSongRequest,
) -> AppResult<SongResponse> {
    queries::find_owned_song(pool, id, principal.user_id).await?;
    let song = queries::update_song(
        pool,
        id,
        request.name.as_deref(),
        request.artist.as_deref(),
        request.genre.as_deref(),
        request.file_url.as_deref(),
    )
    .await?;
    Ok(song.into())
}

/// Delete a song the principal owns.
pub async fn delete(pool: &PgPool, principal: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
    queries::find_owned_song(pool, id, principal.user_id).await?;
    queries::delete_song(pool, id).await?;
    Ok(())
}

/// Fetch one owned song.
pub async fn get_by_id(
    pool: &PgPool,
    principal: &AuthenticatedUser,
    id: Uuid,
) -> AppResult<SongResponse> {
    let song = queries::find_owned_song(pool, id, principal.user_id).await?;
    Ok(song.into())
}

/// Search the principal's songs by name fragment.
pub async fn search(
    pool: &PgPool,
    principal: &AuthenticatedUser,
    keyword: Option<&str>,
) -> AppResult<Vec<SongResponse>> {
    let songs = queries::search_songs(pool, principal.user_id, keyword).await?;
    Ok(songs.into_iter().map(SongResponse::from).collect())
}

/// One page of the principal's songs, newest first.
pub async fn get_paged(
    pool: &PgPool,
    principal: &AuthenticatedUser,
    page: i64,
    size: i64,
) -> AppResult<PagedResponse<SongResponse>> {
    if page < 0 || size < 1 {
        return Err(AppError::InvalidRequest("Invalid page parameters".into()));
    }
    let (songs, total) = queries::songs_page(pool, principal.user_id, page, size).await?;
    let content = songs.into_iter().map(SongResponse::from).collect();
    Ok(PagedResponse::of(content, page, size, total))
}

/// Stream a song's media file. Any authenticated user may play a song
/// by id; only mutation is owner-scoped.
pub async fn play(state: &AppState, id: Uuid) -> AppResult<Response> {
    let song = queries::find_song(&state.pool, id)
        .await?
        .ok_or(AppError::SongNotFound)?;

    let filename = song.file_url.rsplit('/').next().unwrap_or_default();
    let path = state.config.upload_dir.join(filename);
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| AppError::SongNotFound)?;

    let content_type = if song.file_url.ends_with(AUDIO_EXT) {
        "audio/mpeg"
    } else {
        "video/mp4"
    };

    Response::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Uncategorized(e.to_string()))
}

fn validate_song_info(info: &CreateSongRequest) -> AppResult<()> {
    if info.name.trim().is_empty() || info.artist.trim().is_empty() || info.genre.trim().is_empty()
    {
        return Err(AppError::InvalidRequest(
            "Song name, artist and genre are required".into(),
        ));
    }
    Ok(())
}

/// Persist an uploaded file under the upload dir as `<uuid>.<ext>`.
/// Only mp3 and mp4 uploads are accepted.
async fn store_file(upload_dir: &Path, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    if bytes.is_empty() {
        return Err(AppError::InvalidFile);
    }
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if ext != AUDIO_EXT && ext != VIDEO_EXT {
        return Err(AppError::InvalidFile);
    }

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Uncategorized(e.to_string()))?;
    let filename = format!("{}.{ext}", Uuid::new_v4());
    tokio::fs::write(upload_dir.join(&filename), bytes)
        .await
        .map_err(|e| AppError::Uncategorized(e.to_string()))?;

    Ok(format!("/files/{filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_file_accepts_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let url = store_file(dir.path(), "track.MP3", b"id3 bytes").await.unwrap();
        assert!(url.starts_with("/files/"));
        assert!(url.ends_with(".mp3"));
        let stored = dir.path().join(url.rsplit('/').next().unwrap());
        assert!(stored.exists());
    }

    #[tokio::test]
    async fn store_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_file(dir.path(), "track.wav", b"bytes").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFile));
    }

    #[tokio::test]
    async fn store_file_rejects_empty_upload() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_file(dir.path(), "track.mp3", b"").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFile));
    }

    #[test]
    fn song_info_requires_fields() {
        let info = CreateSongRequest {
            name: " ".into(),
            artist: "Artist".into(),
            genre: "Pop".into(),
            file_url: None,
        };
        assert!(validate_song_info(&info).is_err());
    }
}
