//! Music repository
//!
//! Uploaded experiment music, identified by UUID.

use super::{parse_timestamp, Music, MusicSummary, NewMusic};
use crate::validation::{validate_track_id, Genre, Scene};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Corrupt music id '{}': {}", value, e)))
}

fn music_from_row(row: &SqliteRow) -> Result<Music> {
    let id: String = row.try_get("id")?;
    let scene: String = row.try_get("default_scene")?;
    let genre: String = row.try_get("genre")?;
    let upload_date: String = row.try_get("upload_date")?;

    Ok(Music {
        id: parse_uuid(&id)?,
        experiment_title: row.try_get("experiment_title")?,
        default_scene: scene.parse::<Scene>()?,
        genre: genre.parse::<Genre>()?,
        bpm: row.try_get("bpm")?,
        key: row.try_get("key")?,
        song_name: row.try_get("song_name")?,
        track_id: row.try_get("track_id")?,
        music_file: row.try_get("music_file")?,
        upload_date: parse_timestamp(&upload_date)?,
    })
}

/// List uploaded music in upload order
pub async fn list_music(pool: &SqlitePool) -> Result<Vec<MusicSummary>> {
    let rows = sqlx::query("SELECT id, song_name, music_file FROM musics ORDER BY seq")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<MusicSummary> {
            let id: String = row.try_get("id")?;
            Ok(MusicSummary {
                id: parse_uuid(&id)?,
                song_name: row.try_get("song_name")?,
                file_path: row.try_get("music_file")?,
            })
        })
        .collect()
}

pub async fn get_music(pool: &SqlitePool, id: Uuid) -> Result<Music> {
    let row = sqlx::query(
        r#"
        SELECT id, experiment_title, default_scene, genre, bpm, "key", song_name,
               track_id, music_file, upload_date
        FROM musics
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::not_found(format!("Music {} not found", id)))?;

    music_from_row(&row)
}

/// Record uploaded music whose content is already stored at `music_file`
pub async fn create_music(pool: &SqlitePool, new: NewMusic, music_file: &str) -> Result<Music> {
    validate_track_id(&new.track_id)?;

    let music = Music {
        id: Uuid::new_v4(),
        experiment_title: new.experiment_title,
        default_scene: new.default_scene,
        genre: new.genre,
        bpm: new.bpm,
        key: new.key,
        song_name: new.song_name,
        track_id: new.track_id,
        music_file: music_file.to_string(),
        upload_date: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO musics (id, experiment_title, default_scene, genre, bpm, "key",
                            song_name, track_id, music_file, upload_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(music.id.to_string())
    .bind(&music.experiment_title)
    .bind(music.default_scene.as_str())
    .bind(music.genre.as_str())
    .bind(music.bpm)
    .bind(&music.key)
    .bind(&music.song_name)
    .bind(&music.track_id)
    .bind(&music.music_file)
    .bind(music.upload_date.to_rfc3339())
    .execute(pool)
    .await?;

    info!("Recorded music {} ({})", music.id, music.track_id);
    Ok(music)
}
