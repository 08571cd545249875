//! Integration tests for the JSON API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Config/track/event/action create, list, update, delete, delete_all
//! - Error bodies for missing rows, bad references and malformed input
//! - Relationship lookups

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sonicstride_common::db::init_database;
use sonicstride_common::AssetStore;
use sonicstride_server::{build_router, AppState};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app backed by a throwaway database and asset roots
async fn setup_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();
    let state = AppState::new(
        pool,
        AssetStore::new(dir.path().join("audio_files")),
        AssetStore::new(dir.path().join("files")),
    );
    (dir, build_router(state))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Send a request and return status plus parsed JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

async fn create_config(app: &Router, body: Value) -> i64 {
    let (status, config) = send(app, json_request("POST", "/api/configs", body)).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", config);
    config["id"].as_i64().unwrap()
}

async fn create_track(app: &Router, config_id: i64) -> i64 {
    let (status, track) = send(
        app,
        json_request(
            "POST",
            "/api/tracks",
            json!({ "config_id": config_id, "name": "bass", "type": "rhythm", "loop": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", track);
    track["id"].as_i64().unwrap()
}

async fn create_event(app: &Router, track_id: i64) -> i64 {
    let (status, event) = send(
        app,
        json_request("POST", "/api/events", json!({ "track_id": track_id, "type": "beat" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", event);
    event["id"].as_i64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "sonicstride-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (_dir, app) = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header(header::ORIGIN, "http://example.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

// =============================================================================
// Configs
// =============================================================================

#[tokio::test]
async fn test_config_create_list_update_delete() {
    let (_dir, app) = setup_app().await;

    let id = create_config(&app, json!({ "name": "Morning run", "bpm": 120 })).await;

    let (status, list) = send(&app, test_request("GET", "/api/configs/list")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["author"], "Sonicstride");
    assert_eq!(list[0]["audios"], json!([]));

    let (status, updated) = send(
        &app,
        json_request("PUT", &format!("/api/configs/{}", id), json!({ "bpm": 140 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bpm"], 140);
    assert_eq!(updated["name"], "Morning run");

    let (status, body) = send(&app, test_request("DELETE", &format!("/api/configs/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Config deleted successfully");

    let (_, list) = send(&app, test_request("GET", "/api/configs/list")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_with_trailing_slash() {
    let (_dir, app) = setup_app().await;

    let (status, _) = send(&app, json_request("POST", "/api/configs/", json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_config_with_unknown_audio_is_not_found() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/configs", json!({ "name": "A", "audio_ids": [7] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, list) = send(&app, test_request("GET", "/api/configs/list")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_update_and_delete_missing_config() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, json_request("PUT", "/api/configs/99", json!({ "bpm": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, test_request("DELETE", "/api/configs/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (_dir, app) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/configs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Missing required field
    let (status, _) = send(&app, json_request("POST", "/api/configs", json!({ "bpm": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, test_request("DELETE", "/api/configs/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_delete_all_on_empty_tables() {
    let (_dir, app) = setup_app().await;

    for resource in ["configs", "audiofiles", "tracks", "events", "actions"] {
        let (status, body) = send(
            &app,
            test_request("DELETE", &format!("/api/{}/delete_all", resource)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "resource {}", resource);
        assert!(body["message"].as_str().unwrap().ends_with("deleted successfully"));

        let (_, list) = send(&app, test_request("GET", &format!("/api/{}/list", resource))).await;
        assert_eq!(list, json!([]), "resource {}", resource);
    }
}

// =============================================================================
// Tracks, events, actions
// =============================================================================

#[tokio::test]
async fn test_track_with_missing_config_leaves_table_unchanged() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/tracks",
            json!({ "config_id": 5, "name": "t", "type": "melody" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("Config"));

    let (_, list) = send(&app, test_request("GET", "/api/tracks/list")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_event_with_missing_track_is_not_found() {
    let (_dir, app) = setup_app().await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/events", json!({ "track_id": 5, "type": "beat" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, test_request("GET", "/api/events/list")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_track_documents_are_returned_verbatim() {
    let (_dir, app) = setup_app().await;

    let config_id = create_config(&app, json!({ "name": "A" })).await;
    let effects = json!([{ "type": "reverb", "wet": 0.3 }, { "type": "delay", "time": [0.25, 0.5] }]);

    let (status, track) = send(
        &app,
        json_request(
            "POST",
            "/api/tracks",
            json!({
                "config_id": config_id,
                "name": "pad",
                "type": "ambient",
                "effect_nodes": effects.clone(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, test_request("GET", "/api/tracks/list")).await;
    assert_eq!(list[0]["id"], track["id"]);
    assert_eq!(list[0]["effect_nodes"], effects);
    assert_eq!(list[0]["track_gain_node"], Value::Null);
}

#[tokio::test]
async fn test_action_lifecycle() {
    let (_dir, app) = setup_app().await;

    let config_id = create_config(&app, json!({ "name": "A" })).await;
    let track_id = create_track(&app, config_id).await;
    let event_id = create_event(&app, track_id).await;

    let (status, action) = send(
        &app,
        json_request(
            "POST",
            "/api/actions",
            json!({
                "event_id": event_id,
                "target": "bass",
                "property": "gain",
                "method": "exponentialRamp",
                "value": 0.2,
                "end_time": 1.5,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let action_id = action["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/actions/{}", action_id),
            json!({ "value": 0.9, "method": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["value"], 0.9);
    assert_eq!(updated["method"], Value::Null);
    assert_eq!(updated["target"], "bass");

    let (status, _) = send(&app, test_request("DELETE", &format!("/api/actions/{}", action_id))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleting_config_removes_its_tree() {
    let (_dir, app) = setup_app().await;

    let config_id = create_config(&app, json!({ "name": "A" })).await;
    let track_id = create_track(&app, config_id).await;
    create_event(&app, track_id).await;

    let (status, _) = send(&app, test_request("DELETE", &format!("/api/configs/{}", config_id))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, tracks) = send(&app, test_request("GET", "/api/tracks/list")).await;
    let (_, events) = send(&app, test_request("GET", "/api/events/list")).await;
    assert_eq!(tracks, json!([]));
    assert_eq!(events, json!([]));
}

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn test_parent_lookups_distinguish_missing_from_empty() {
    let (_dir, app) = setup_app().await;

    let config_id = create_config(&app, json!({ "name": "A", "interaction_type": "tempo" })).await;
    let track_id = create_track(&app, config_id).await;
    let e1 = create_event(&app, track_id).await;
    let e2 = create_event(&app, track_id).await;

    let (status, ids) = send(&app, test_request("GET", &format!("/api/others/{}/audios", config_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([]));

    let (status, ids) = send(&app, test_request("GET", &format!("/api/others/{}/events", track_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([e1, e2]));

    let (status, ids) = send(
        &app,
        test_request("GET", &format!("/api/others/events/{}/actions", e1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([]));

    let (status, _) = send(&app, test_request("GET", "/api/others/999/audios")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, test_request("GET", "/api/others/999/events")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, test_request("GET", "/api/others/events/999/actions")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, ids) = send(&app, test_request("GET", "/api/others/interaction_type/tempo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([config_id]));
}

#[tokio::test]
async fn test_filter_lookups_return_empty_lists() {
    let (_dir, app) = setup_app().await;

    let (status, ids) = send(&app, test_request("GET", "/api/others/audios/type/ambient")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([]));

    let (status, ids) = send(&app, test_request("GET", "/api/others/audios/genre/Nature%20Sounds")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([]));

    let (status, ids) = send(&app, test_request("GET", "/api/others/interaction_type/none")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids, json!([]));
}

#[tokio::test]
async fn test_unknown_genre_is_bad_request() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api/others/audios/genre/Polka")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
