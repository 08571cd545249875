//! Track endpoints

use super::{ApiJson, ApiPath, MessageResponse};
use crate::{ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sonicstride_common::db::{tracks, NewTrack, Track, TrackPatch};

pub async fn list_tracks(State(state): State<AppState>) -> ApiResult<Json<Vec<Track>>> {
    Ok(Json(tracks::list_tracks(&state.db).await?))
}

/// POST /api/tracks
///
/// 404 when `config_id` names no config.
pub async fn create_track(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewTrack>,
) -> ApiResult<(StatusCode, Json<Track>)> {
    let track = tracks::create_track(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(track)))
}

pub async fn update_track(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<TrackPatch>,
) -> ApiResult<Json<Track>> {
    Ok(Json(tracks::update_track(&state.db, id, patch).await?))
}

/// DELETE /api/tracks/:id (its events and their actions go with it)
pub async fn delete_track(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    tracks::delete_track(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Track deleted successfully")))
}

pub async fn delete_all_tracks(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    tracks::delete_all_tracks(&state.db).await?;
    Ok(Json(MessageResponse::new("All tracks deleted successfully")))
}

pub fn track_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tracks/list", get(list_tracks))
        .route("/api/tracks", post(create_track))
        .route("/api/tracks/", post(create_track))
        .route("/api/tracks/delete_all", delete(delete_all_tracks))
        .route("/api/tracks/:id", put(update_track).delete(delete_track))
}
