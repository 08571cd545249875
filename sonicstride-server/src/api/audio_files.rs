//! Audio file endpoints
//!
//! Creation is a multipart upload: metadata fields plus an `audio_file` part
//! whose content goes to the audio asset store. Rows and stored content are
//! kept in step: a failed insert removes the just-stored file, and deletes
//! remove the file once the row is gone.

use super::upload::{download_response, reject_oversized_upload, UploadForm, MAX_UPLOAD_BYTES};
use super::{ApiJson, ApiPath, MessageResponse};
use crate::{ApiResult, AppState};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use sonicstride_common::db::{audio_files, AudioFile, AudioFilePatch, NewAudioFile};
use sonicstride_common::validation::Genre;
use std::path::Path;
use tracing::info;

const AUDIO_FILE_PART: &str = "audio_file";

/// GET /api/audiofiles/list
pub async fn list_audio_files(State(state): State<AppState>) -> ApiResult<Json<Vec<AudioFile>>> {
    Ok(Json(audio_files::list_audio_files(&state.db).await?))
}

/// POST /api/audiofiles (multipart)
///
/// **Fields:** name, type (required); author, genre, key, bpm (optional);
/// `audio_file` part (required).
///
/// **Errors:**
/// - 400: missing field, unknown genre, non-numeric bpm, bad filename
/// - 413: body over the upload cap
pub async fn create_audio_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<AudioFile>)> {
    let mut form = UploadForm::read(multipart?, AUDIO_FILE_PART).await?;

    let new = NewAudioFile {
        name: form.required("name")?,
        author: form.optional("author"),
        kind: form.required("type")?,
        genre: form.optional_parse::<Genre>("genre")?,
        key: form.optional("key"),
        bpm: form.optional_parse::<i64>("bpm")?,
    };
    let file = form.take_file(AUDIO_FILE_PART)?;

    let path = state.audio_store.store(&file.filename, &file.bytes).await?;
    let file_path = path.to_string_lossy().into_owned();

    match audio_files::create_audio_file(&state.db, new, &file_path).await {
        Ok(audio) => Ok((StatusCode::CREATED, Json(audio))),
        Err(e) => {
            state.audio_store.remove(&path).await;
            Err(e.into())
        }
    }
}

/// PUT /api/audiofiles/:id
///
/// Metadata only; the stored content cannot be replaced.
pub async fn update_audio_file(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<AudioFilePatch>,
) -> ApiResult<Json<AudioFile>> {
    Ok(Json(audio_files::update_audio_file(&state.db, id, patch).await?))
}

/// DELETE /api/audiofiles/:id
pub async fn delete_audio_file(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let audio = audio_files::delete_audio_file(&state.db, id).await?;
    state.audio_store.remove(Path::new(&audio.file_path)).await;
    Ok(Json(MessageResponse::new("AudioFile deleted successfully")))
}

/// DELETE /api/audiofiles/delete_all
pub async fn delete_all_audio_files(
    State(state): State<AppState>,
) -> ApiResult<Json<MessageResponse>> {
    let paths = audio_files::delete_all_audio_files(&state.db).await?;
    for path in &paths {
        state.audio_store.remove(Path::new(path)).await;
    }
    info!("Removed {} stored audio files", paths.len());
    Ok(Json(MessageResponse::new("All audio files deleted successfully")))
}

/// GET /api/audiofiles/download/:id
pub async fn download_audio_file(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Response> {
    let audio = audio_files::get_audio_file(&state.db, id).await?;
    let asset = state.audio_store.open(Path::new(&audio.file_path)).await?;
    download_response(asset)
}

pub fn audio_file_routes() -> Router<AppState> {
    let upload = post(create_audio_file)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(reject_oversized_upload));

    Router::new()
        .route("/api/audiofiles/list", get(list_audio_files))
        .route("/api/audiofiles", upload.clone())
        .route("/api/audiofiles/", upload)
        .route("/api/audiofiles/delete_all", delete(delete_all_audio_files))
        .route("/api/audiofiles/download/:id", get(download_audio_file))
        .route(
            "/api/audiofiles/:id",
            put(update_audio_file).delete(delete_audio_file),
        )
}
