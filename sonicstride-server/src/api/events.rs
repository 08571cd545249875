//! Event endpoints

use super::{ApiJson, ApiPath, MessageResponse};
use crate::{ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sonicstride_common::db::{events, Event, EventPatch, NewEvent};

pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(events::list_events(&state.db).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewEvent>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = events::create_event(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<EventPatch>,
) -> ApiResult<Json<Event>> {
    Ok(Json(events::update_event(&state.db, id, patch).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    events::delete_event(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub async fn delete_all_events(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    events::delete_all_events(&state.db).await?;
    Ok(Json(MessageResponse::new("All events deleted successfully")))
}

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events/list", get(list_events))
        .route("/api/events", post(create_event))
        .route("/api/events/", post(create_event))
        .route("/api/events/delete_all", delete(delete_all_events))
        .route("/api/events/:id", put(update_event).delete(delete_event))
}
