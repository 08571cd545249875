//! Closed vocabularies and field-format checks
//!
//! Everything here runs before any write: a value that fails validation never
//! reaches the database or the asset store.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Music genre. `Other` is the escape value for anything outside the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Ambient,
    #[serde(rename = "Nature Sounds")]
    NatureSounds,
    Instrumental,
    Lofi,
    Classical,
    Jazz,
    Electronic,
    Meditative,
    #[serde(rename = "Binaural Beats")]
    BinauralBeats,
    #[serde(rename = "ASMR")]
    Asmr,
    Chillhop,
    Soundscapes,
    #[serde(rename = "World Music")]
    WorldMusic,
    Folk,
    #[serde(rename = "Rain Sounds")]
    RainSounds,
    #[serde(rename = "Ocean Waves")]
    OceanWaves,
    #[serde(rename = "White Noise")]
    WhiteNoise,
    #[serde(alias = "other")]
    Other,
}

impl Genre {
    pub const ALL: [Genre; 18] = [
        Genre::Ambient,
        Genre::NatureSounds,
        Genre::Instrumental,
        Genre::Lofi,
        Genre::Classical,
        Genre::Jazz,
        Genre::Electronic,
        Genre::Meditative,
        Genre::BinauralBeats,
        Genre::Asmr,
        Genre::Chillhop,
        Genre::Soundscapes,
        Genre::WorldMusic,
        Genre::Folk,
        Genre::RainSounds,
        Genre::OceanWaves,
        Genre::WhiteNoise,
        Genre::Other,
    ];

    /// Stored and wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Ambient => "Ambient",
            Genre::NatureSounds => "Nature Sounds",
            Genre::Instrumental => "Instrumental",
            Genre::Lofi => "Lofi",
            Genre::Classical => "Classical",
            Genre::Jazz => "Jazz",
            Genre::Electronic => "Electronic",
            Genre::Meditative => "Meditative",
            Genre::BinauralBeats => "Binaural Beats",
            Genre::Asmr => "ASMR",
            Genre::Chillhop => "Chillhop",
            Genre::Soundscapes => "Soundscapes",
            Genre::WorldMusic => "World Music",
            Genre::Folk => "Folk",
            Genre::RainSounds => "Rain Sounds",
            Genre::OceanWaves => "Ocean Waves",
            Genre::WhiteNoise => "White Noise",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "other" {
            return Ok(Genre::Other);
        }
        Genre::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Unknown genre '{}'", s)))
    }
}

/// Default playback scene of an uploaded music file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    Running,
    Walking,
    #[serde(rename = "NULL")]
    Null,
}

impl Scene {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Running => "Running",
            Scene::Walking => "Walking",
            Scene::Null => "NULL",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scene {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Running" => Ok(Scene::Running),
            "Walking" => Ok(Scene::Walking),
            "NULL" => Ok(Scene::Null),
            other => Err(Error::validation(format!("Unknown scene '{}'", other))),
        }
    }
}

// Two digits, one uppercase letter, three digits, "V" and a version digit
static TRACK_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}[A-Z]-[0-9]{3}-V[0-9]$").expect("valid track id regex"));

/// Check a music track identifier such as `01A-001-V1`
pub fn validate_track_id(track_id: &str) -> Result<()> {
    if TRACK_ID_PATTERN.is_match(track_id) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Invalid track ID format '{}'. Expected format: '01A-001-V1'",
            track_id
        )))
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components (either separator) are dropped and characters that
/// cannot appear in a header value or a path are replaced with `_`.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base.chars().all(|c| c == '.') {
        return Err(Error::validation(format!(
            "Invalid upload filename '{}'",
            filename
        )));
    }

    Ok(base
        .chars()
        .map(|c| if c.is_control() || c == '"' { '_' } else { c })
        .collect())
}
