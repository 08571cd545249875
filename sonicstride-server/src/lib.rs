//! sonicstride-server library - HTTP backend for authoring audio experiments
//!
//! Exposes CRUD over configs, audio files, tracks, events and actions, the
//! relationship lookups, and music upload/download.

use axum::Router;
use sonicstride_common::config::ServerConfig;
use sonicstride_common::AssetStore;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Content of uploaded audio files
    pub audio_store: AssetStore,
    /// Content of uploaded experiment music
    pub music_store: AssetStore,
}

impl AppState {
    pub fn new(db: SqlitePool, audio_store: AssetStore, music_store: AssetStore) -> Self {
        Self {
            db,
            audio_store,
            music_store,
        }
    }

    /// State with asset stores under the configured root folder
    pub fn from_config(db: SqlitePool, config: &ServerConfig) -> Self {
        Self::new(
            db,
            AssetStore::new(config.audio_files_dir()),
            AssetStore::new(config.music_dir()),
        )
    }
}

/// Build application router
///
/// No authentication; CORS allows any origin, method and header.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::config_routes())
        .merge(api::audio_file_routes())
        .merge(api::track_routes())
        .merge(api::event_routes())
        .merge(api::action_routes())
        .merge(api::other_routes())
        .merge(api::music_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
