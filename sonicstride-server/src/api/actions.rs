//! Action endpoints
//!
//! Actions are the leaves of the config tree, so deleting one never cascades.

use super::{ApiJson, ApiPath, MessageResponse};
use crate::{ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sonicstride_common::db::{actions, Action, ActionPatch, NewAction};

pub async fn list_actions(State(state): State<AppState>) -> ApiResult<Json<Vec<Action>>> {
    Ok(Json(actions::list_actions(&state.db).await?))
}

/// POST /api/actions
///
/// All of target, property, method, value and end_time are required.
pub async fn create_action(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewAction>,
) -> ApiResult<(StatusCode, Json<Action>)> {
    let action = actions::create_action(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(action)))
}

pub async fn update_action(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ActionPatch>,
) -> ApiResult<Json<Action>> {
    Ok(Json(actions::update_action(&state.db, id, patch).await?))
}

pub async fn delete_action(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    actions::delete_action(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Action deleted successfully")))
}

pub async fn delete_all_actions(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    actions::delete_all_actions(&state.db).await?;
    Ok(Json(MessageResponse::new("All actions deleted successfully")))
}

pub fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/api/actions/list", get(list_actions))
        .route("/api/actions", post(create_action))
        .route("/api/actions/", post(create_action))
        .route("/api/actions/delete_all", delete(delete_all_actions))
        .route("/api/actions/:id", put(update_action).delete(delete_action))
}
