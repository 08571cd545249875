//! Relationship lookups
//!
//! Each endpoint answers with a JSON array of ids in ascending order.
//! Parent-keyed lookups 404 on a missing parent; filters return `[]` when
//! nothing matches.

use super::ApiPath;
use crate::{ApiResult, AppState};
use axum::{extract::State, routing::get, Json, Router};
use sonicstride_common::db::lookups;
use sonicstride_common::validation::Genre;

/// GET /api/others/:id/audios
pub async fn config_audio_ids(
    State(state): State<AppState>,
    ApiPath(config_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(lookups::audio_ids_for_config(&state.db, config_id).await?))
}

/// GET /api/others/audios/type/:type
pub async fn audio_ids_by_type(
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(lookups::audio_ids_by_type(&state.db, &kind).await?))
}

/// GET /api/others/audios/genre/:genre
///
/// 400 for a genre outside the vocabulary.
pub async fn audio_ids_by_genre(
    State(state): State<AppState>,
    ApiPath(genre): ApiPath<String>,
) -> ApiResult<Json<Vec<i64>>> {
    let genre: Genre = genre.parse()?;
    Ok(Json(lookups::audio_ids_by_genre(&state.db, genre).await?))
}

/// GET /api/others/interaction_type/:interaction_type
pub async fn config_ids_by_interaction_type(
    State(state): State<AppState>,
    ApiPath(interaction_type): ApiPath<String>,
) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(
        lookups::config_ids_by_interaction_type(&state.db, &interaction_type).await?,
    ))
}

/// GET /api/others/:id/events
pub async fn track_event_ids(
    State(state): State<AppState>,
    ApiPath(track_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(lookups::event_ids_for_track(&state.db, track_id).await?))
}

/// GET /api/others/events/:id/actions
pub async fn event_action_ids(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(lookups::action_ids_for_event(&state.db, event_id).await?))
}

pub fn other_routes() -> Router<AppState> {
    Router::new()
        .route("/api/others/:id/audios", get(config_audio_ids))
        .route("/api/others/:id/events", get(track_event_ids))
        .route("/api/others/audios/type/:type", get(audio_ids_by_type))
        .route("/api/others/audios/genre/:genre", get(audio_ids_by_genre))
        .route(
            "/api/others/interaction_type/:interaction_type",
            get(config_ids_by_interaction_type),
        )
        .route("/api/others/events/:id/actions", get(event_action_ids))
}
