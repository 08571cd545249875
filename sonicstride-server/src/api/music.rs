//! Experiment music endpoints
//!
//! - GET  /api/music/list
//! - GET  /api/music/download/:id
//! - POST /api/music/upload (multipart, `music_file` part)

use super::upload::{download_response, reject_oversized_upload, UploadForm, MAX_UPLOAD_BYTES};
use super::ApiPath;
use crate::{ApiResult, AppState};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sonicstride_common::db::{music, Music, MusicSummary, NewMusic};
use sonicstride_common::validation::{validate_track_id, Genre, Scene};
use std::path::Path;
use uuid::Uuid;

const MUSIC_FILE_PART: &str = "music_file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub music: Music,
}

pub async fn list_music(State(state): State<AppState>) -> ApiResult<Json<Vec<MusicSummary>>> {
    Ok(Json(music::list_music(&state.db).await?))
}

/// POST /api/music/upload
///
/// **Fields:** experiment_title, default_scene, genre, song_name, track_id
/// (required); bpm, key (optional).
///
/// Every field is checked before the file is written, so a rejected upload
/// leaves no row and no stored file behind.
pub async fn upload_music(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut form = UploadForm::read(multipart?, MUSIC_FILE_PART).await?;

    let track_id = form.required("track_id")?;
    validate_track_id(&track_id)?;

    let new = NewMusic {
        experiment_title: form.required("experiment_title")?,
        default_scene: form.required_parse::<Scene>("default_scene")?,
        genre: form.required_parse::<Genre>("genre")?,
        bpm: form.optional_parse::<i64>("bpm")?,
        key: form.optional("key"),
        song_name: form.required("song_name")?,
        track_id,
    };
    let file = form.take_file(MUSIC_FILE_PART)?;

    let path = state.music_store.store(&file.filename, &file.bytes).await?;
    let music_file = path.to_string_lossy().into_owned();

    match music::create_music(&state.db, new, &music_file).await {
        Ok(music) => Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                success: true,
                message: "File uploaded successfully".to_string(),
                music,
            }),
        )),
        Err(e) => {
            state.music_store.remove(&path).await;
            Err(e.into())
        }
    }
}

pub async fn download_music(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Response> {
    let music = music::get_music(&state.db, id).await?;
    let asset = state.music_store.open(Path::new(&music.music_file)).await?;
    download_response(asset)
}

pub fn music_routes() -> Router<AppState> {
    Router::new()
        .route("/api/music/list", get(list_music))
        .route("/api/music/download/:id", get(download_music))
        .route(
            "/api/music/upload",
            post(upload_music)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .layer(middleware::from_fn(reject_oversized_upload)),
        )
}
