//! Config endpoints
//!
//! - GET    /api/configs/list
//! - POST   /api/configs
//! - PUT    /api/configs/:id
//! - DELETE /api/configs/:id
//! - DELETE /api/configs/delete_all

use super::{ApiJson, ApiPath, MessageResponse};
use crate::{ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sonicstride_common::db::{configs, Config, ConfigPatch, NewConfig};

/// GET /api/configs/list
///
/// Every config with its associated audio summaries.
pub async fn list_configs(State(state): State<AppState>) -> ApiResult<Json<Vec<Config>>> {
    Ok(Json(configs::list_configs(&state.db).await?))
}

/// POST /api/configs
///
/// **Request:** `{"name": "...", "audio_ids": [1, 2], ...}`
///
/// **Errors:**
/// - 400: malformed body
/// - 404: an audio id does not exist (nothing is written)
pub async fn create_config(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewConfig>,
) -> ApiResult<(StatusCode, Json<Config>)> {
    let config = configs::create_config(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// PUT /api/configs/:id
///
/// Partial update. A supplied `audio_ids` replaces the association set.
pub async fn update_config(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ConfigPatch>,
) -> ApiResult<Json<Config>> {
    Ok(Json(configs::update_config(&state.db, id, patch).await?))
}

/// DELETE /api/configs/:id
pub async fn delete_config(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    configs::delete_config(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Config deleted successfully")))
}

/// DELETE /api/configs/delete_all
pub async fn delete_all_configs(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    configs::delete_all_configs(&state.db).await?;
    Ok(Json(MessageResponse::new("All configs deleted successfully")))
}

pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/api/configs/list", get(list_configs))
        .route("/api/configs", post(create_config))
        .route("/api/configs/", post(create_config))
        .route("/api/configs/delete_all", delete(delete_all_configs))
        .route("/api/configs/:id", put(update_config).delete(delete_config))
}
