//! Song catalog request handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{SongResponse, UpdateSongRequest};
use crate::response::{ApiResponse, PagedResponse};
use crate::services::songs;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

/// `POST /songs` — multipart upload (`info` JSON part + `file` part).
pub async fn upload_song_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<SongResponse>>> {
    let song = songs::create_from_multipart(&state, &principal, multipart).await?;
    Ok(Json(ApiResponse::success(song, "Song created")))
}

/// `PUT /songs/{id}` — partial update of an owned song.
pub async fn update_song_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSongRequest>,
) -> AppResult<Json<ApiResponse<SongResponse>>> {
    let song = songs::update(&state.pool, &principal, id, &body).await?;
    Ok(Json(ApiResponse::success(song, "Song updated")))
}

/// `DELETE /songs/{id}` — delete an owned song.
pub async fn delete_song_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    songs::delete(&state.pool, &principal, id).await?;
    Ok(Json(ApiResponse::ok("Song deleted")))
}

/// `GET /songs/{id}` — fetch one owned song.
pub async fn get_song_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SongResponse>>> {
    let song = songs::get_by_id(&state.pool, &principal, id).await?;
    Ok(Json(ApiResponse::success(song, "Success")))
}

/// `GET /songs/search?keyword=` — search owned songs by name.
pub async fn search_songs_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Vec<SongResponse>>>> {
    let found = songs::search(&state.pool, &principal, params.keyword.as_deref()).await?;
    Ok(Json(ApiResponse::success(found, "Success")))
}

/// `GET /songs/page?page=&size=` — paginated owned songs, newest first.
pub async fn paged_songs_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<PagedResponse<SongResponse>>>> {
    let page = songs::get_paged(&state.pool, &principal, params.page, params.size).await?;
    Ok(Json(ApiResponse::success(page, "Success")))
}

/// `GET /songs/{id}/play` — stream the media file (not enveloped).
pub async fn play_song_handler(
    State(state): State<AppState>,
    Extension(_principal): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    songs::play(&state, id).await
}
