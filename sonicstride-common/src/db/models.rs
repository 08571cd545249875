//! Database models and the commands that create or patch them
//!
//! `New*` types carry the fields of a create request, `*Patch` types the
//! fields of a partial update. In a patch, an absent field leaves the stored
//! value alone; for nullable columns `Some(None)` (JSON `null`) clears it.

use crate::validation::{Genre, Scene};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_AUTHOR: &str = "Sonicstride";

/// Distinguishes an explicit `null` from an absent field.
///
/// Used with `#[serde(default)]` on `Option<Option<T>>` fields: absent → `None`,
/// `null` → `Some(None)`, value → `Some(Some(v))`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn default_author() -> Option<String> {
    Some(DEFAULT_AUTHOR.to_string())
}

// ============================================================================
// Config
// ============================================================================

/// Id and name of an audio file associated with a config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub id: i64,
    pub name: String,
    pub author: Option<String>,
    pub interaction_type: Option<String>,
    pub bpm: Option<i64>,
    pub create_time: DateTime<Utc>,
    pub labels: Option<String>,
    pub audios: Vec<AudioSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConfig {
    pub name: String,
    #[serde(default = "default_author")]
    pub author: Option<String>,
    #[serde(default)]
    pub interaction_type: Option<String>,
    #[serde(default)]
    pub bpm: Option<i64>,
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub audio_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub interaction_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub bpm: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub labels: Option<Option<String>>,
    /// When present (even empty) replaces the whole association set
    #[serde(default)]
    pub audio_ids: Option<Vec<i64>>,
}

impl ConfigPatch {
    /// Apply the scalar fields; associations are handled by the repository
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(author) = &self.author {
            config.author = author.clone();
        }
        if let Some(interaction_type) = &self.interaction_type {
            config.interaction_type = interaction_type.clone();
        }
        if let Some(bpm) = self.bpm {
            config.bpm = bpm;
        }
        if let Some(labels) = &self.labels {
            config.labels = labels.clone();
        }
    }
}

// ============================================================================
// AudioFile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFile {
    pub id: i64,
    pub name: String,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub genre: Option<Genre>,
    pub key: Option<String>,
    pub bpm: Option<i64>,
    pub file_path: String,
}

/// Metadata of an uploaded audio file (the content goes to the asset store)
#[derive(Debug, Clone)]
pub struct NewAudioFile {
    pub name: String,
    pub author: Option<String>,
    pub kind: String,
    pub genre: Option<Genre>,
    pub key: Option<String>,
    pub bpm: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub author: Option<Option<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub genre: Option<Option<Genre>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub key: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub bpm: Option<Option<i64>>,
}

impl AudioFilePatch {
    pub fn apply_to(&self, audio: &mut AudioFile) {
        if let Some(name) = &self.name {
            audio.name = name.clone();
        }
        if let Some(author) = &self.author {
            audio.author = author.clone();
        }
        if let Some(kind) = &self.kind {
            audio.kind = kind.clone();
        }
        if let Some(genre) = self.genre {
            audio.genre = genre;
        }
        if let Some(key) = &self.key {
            audio.key = key.clone();
        }
        if let Some(bpm) = self.bpm {
            audio.bpm = bpm;
        }
    }
}

// ============================================================================
// Track
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub config_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "loop")]
    pub looped: Option<bool>,
    pub decay: Option<bool>,
    pub initial_gain: Option<f64>,
    pub track_initial_gain: Option<f64>,
    /// Opaque document, stored and returned verbatim
    pub track_gain_node: Option<Value>,
    /// Opaque document, stored and returned verbatim
    pub effect_nodes: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrack {
    pub config_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "loop")]
    pub looped: Option<bool>,
    #[serde(default)]
    pub decay: Option<bool>,
    #[serde(default)]
    pub initial_gain: Option<f64>,
    #[serde(default)]
    pub track_initial_gain: Option<f64>,
    #[serde(default)]
    pub track_gain_node: Option<Value>,
    #[serde(default)]
    pub effect_nodes: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPatch {
    #[serde(default)]
    pub config_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "loop", deserialize_with = "deserialize_some")]
    pub looped: Option<Option<bool>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub decay: Option<Option<bool>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub initial_gain: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub track_initial_gain: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub track_gain_node: Option<Option<Value>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub effect_nodes: Option<Option<Value>>,
}

impl TrackPatch {
    pub fn apply_to(&self, track: &mut Track) {
        if let Some(config_id) = self.config_id {
            track.config_id = config_id;
        }
        if let Some(name) = &self.name {
            track.name = name.clone();
        }
        if let Some(kind) = &self.kind {
            track.kind = kind.clone();
        }
        if let Some(looped) = self.looped {
            track.looped = looped;
        }
        if let Some(decay) = self.decay {
            track.decay = decay;
        }
        if let Some(gain) = self.initial_gain {
            track.initial_gain = gain;
        }
        if let Some(gain) = self.track_initial_gain {
            track.track_initial_gain = gain;
        }
        if let Some(node) = &self.track_gain_node {
            track.track_gain_node = node.clone();
        }
        if let Some(nodes) = &self.effect_nodes {
            track.effect_nodes = nodes.clone();
        }
    }
}

// ============================================================================
// Event
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub track_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub track_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub track_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(track_id) = self.track_id {
            event.track_id = track_id;
        }
        if let Some(kind) = &self.kind {
            event.kind = kind.clone();
        }
    }
}

// ============================================================================
// Action
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub event_id: i64,
    pub target: Option<String>,
    pub property: Option<String>,
    pub method: Option<String>,
    pub value: Option<f64>,
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAction {
    pub event_id: i64,
    pub target: String,
    pub property: String,
    pub method: String,
    pub value: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionPatch {
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub target: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub property: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub method: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub value: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_time: Option<Option<f64>>,
}

impl ActionPatch {
    pub fn apply_to(&self, action: &mut Action) {
        if let Some(event_id) = self.event_id {
            action.event_id = event_id;
        }
        if let Some(target) = &self.target {
            action.target = target.clone();
        }
        if let Some(property) = &self.property {
            action.property = property.clone();
        }
        if let Some(method) = &self.method {
            action.method = method.clone();
        }
        if let Some(value) = self.value {
            action.value = value;
        }
        if let Some(end_time) = self.end_time {
            action.end_time = end_time;
        }
    }
}

// ============================================================================
// Music
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Music {
    pub id: Uuid,
    pub experiment_title: String,
    pub default_scene: Scene,
    pub genre: Genre,
    pub bpm: Option<i64>,
    pub key: Option<String>,
    pub song_name: String,
    pub track_id: String,
    pub music_file: String,
    pub upload_date: DateTime<Utc>,
}

/// Row shape returned by the music list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicSummary {
    pub id: Uuid,
    pub song_name: String,
    pub file_path: String,
}

/// Form fields of a music upload (the content goes to the asset store)
#[derive(Debug, Clone)]
pub struct NewMusic {
    pub experiment_title: String,
    pub default_scene: Scene,
    pub genre: Genre,
    pub bpm: Option<i64>,
    pub key: Option<String>,
    pub song_name: String,
    pub track_id: String,
}
