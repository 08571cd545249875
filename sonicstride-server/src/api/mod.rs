//! HTTP API handlers for sonicstride-server
//!
//! One module per resource; each exposes a `*_routes()` builder merged by
//! [`crate::build_router`].

pub mod actions;
pub mod audio_files;
pub mod configs;
pub mod events;
pub mod extract;
pub mod health;
pub mod music;
pub mod others;
pub mod tracks;
pub mod upload;

pub use actions::action_routes;
pub use audio_files::audio_file_routes;
pub use configs::config_routes;
pub use events::event_routes;
pub use extract::{ApiJson, ApiPath};
pub use health::health_routes;
pub use music::music_routes;
pub use others::other_routes;
pub use tracks::track_routes;

use serde::Serialize;

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
