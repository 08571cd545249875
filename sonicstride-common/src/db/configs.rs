//! Config repository
//!
//! Configs own their audio associations (config_audios) and their tracks.
//! Creating or updating a config and its associations is one transaction.

use super::{
    begin_write, ensure_exists, parse_timestamp, AudioSummary, Config, ConfigPatch, NewConfig,
    Parent,
};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

const SELECT_CONFIG: &str = r#"
    SELECT id, name, author, interaction_type, bpm, create_time, labels
    FROM configs
"#;

fn config_from_row(row: &SqliteRow, audios: Vec<AudioSummary>) -> Result<Config> {
    let create_time: String = row.try_get("create_time")?;
    Ok(Config {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        author: row.try_get("author")?,
        interaction_type: row.try_get("interaction_type")?,
        bpm: row.try_get("bpm")?,
        create_time: parse_timestamp(&create_time)?,
        labels: row.try_get("labels")?,
        audios,
    })
}

/// Audio summaries per config id, each list ordered by audio id
async fn load_audio_summaries(
    conn: &mut SqliteConnection,
    config_id: Option<i64>,
) -> Result<HashMap<i64, Vec<AudioSummary>>> {
    let rows = sqlx::query(
        r#"
        SELECT ca.config_id, a.id, a.name
        FROM config_audios ca
        JOIN audio_files a ON a.id = ca.audio_id
        WHERE ?1 IS NULL OR ca.config_id = ?1
        ORDER BY ca.config_id, a.id
        "#,
    )
    .bind(config_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_config: HashMap<i64, Vec<AudioSummary>> = HashMap::new();
    for row in rows {
        by_config
            .entry(row.try_get("config_id")?)
            .or_default()
            .push(AudioSummary {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            });
    }
    Ok(by_config)
}

pub(crate) async fn fetch_config(conn: &mut SqliteConnection, id: i64) -> Result<Option<Config>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_CONFIG))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let mut audios = load_audio_summaries(conn, Some(id)).await?;
            let config = config_from_row(&row, audios.remove(&id).unwrap_or_default())?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Validate every audio id, then link them to the config.
///
/// Duplicates collapse into a single association.
async fn replace_associations(
    conn: &mut SqliteConnection,
    config_id: i64,
    audio_ids: &[i64],
) -> Result<()> {
    let unique: BTreeSet<i64> = audio_ids.iter().copied().collect();
    for audio_id in &unique {
        ensure_exists(conn, Parent::AudioFile, *audio_id).await?;
    }

    sqlx::query("DELETE FROM config_audios WHERE config_id = ?")
        .bind(config_id)
        .execute(&mut *conn)
        .await?;

    for audio_id in unique {
        sqlx::query("INSERT INTO config_audios (config_id, audio_id) VALUES (?, ?)")
            .bind(config_id)
            .bind(audio_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// List all configs with their associated audio summaries
pub async fn list_configs(pool: &SqlitePool) -> Result<Vec<Config>> {
    let mut conn = pool.acquire().await?;

    let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_CONFIG))
        .fetch_all(&mut *conn)
        .await?;
    let mut audios = load_audio_summaries(&mut conn, None).await?;

    rows.iter()
        .map(|row| -> Result<Config> {
            let id: i64 = row.try_get("id")?;
            config_from_row(row, audios.remove(&id).unwrap_or_default())
        })
        .collect()
}

pub async fn get_config(pool: &SqlitePool, id: i64) -> Result<Config> {
    let mut conn = pool.acquire().await?;
    fetch_config(&mut conn, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Config {} not found", id)))
}

/// Create a config and its audio associations
pub async fn create_config(pool: &SqlitePool, new: NewConfig) -> Result<Config> {
    let mut tx = begin_write(pool).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO configs (name, author, interaction_type, bpm, create_time, labels)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.author)
    .bind(&new.interaction_type)
    .bind(new.bpm)
    .bind(Utc::now().to_rfc3339())
    .bind(&new.labels)
    .execute(&mut *tx)
    .await?;
    let id = result.last_insert_rowid();

    replace_associations(&mut tx, id, &new.audio_ids).await?;

    let config = fetch_config(&mut tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Config {} vanished after insert", id)))?;
    tx.commit().await?;

    info!("Created config {} ({} audio files)", id, config.audios.len());
    Ok(config)
}

/// Apply a partial update; a supplied `audio_ids` replaces the association set
pub async fn update_config(pool: &SqlitePool, id: i64, patch: ConfigPatch) -> Result<Config> {
    let mut tx = begin_write(pool).await?;

    let mut config = fetch_config(&mut tx, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Config {} not found", id)))?;
    patch.apply_to(&mut config);

    sqlx::query(
        r#"
        UPDATE configs
        SET name = ?, author = ?, interaction_type = ?, bpm = ?, labels = ?
        WHERE id = ?
        "#,
    )
    .bind(&config.name)
    .bind(&config.author)
    .bind(&config.interaction_type)
    .bind(config.bpm)
    .bind(&config.labels)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(audio_ids) = &patch.audio_ids {
        replace_associations(&mut tx, id, audio_ids).await?;
    }

    let config = fetch_config(&mut tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Config {} vanished during update", id)))?;
    tx.commit().await?;

    info!("Updated config {}", id);
    Ok(config)
}

/// Delete a config with its associations and its track subtree
pub async fn delete_config(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = begin_write(pool).await?;

    if !super::exists(&mut tx, Parent::Config, id).await? {
        return Err(Error::not_found(format!("Config {} not found", id)));
    }

    sqlx::query(
        r#"
        DELETE FROM actions WHERE event_id IN (
            SELECT e.id FROM events e JOIN tracks t ON t.id = e.track_id WHERE t.config_id = ?
        )
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM events WHERE track_id IN (SELECT id FROM tracks WHERE config_id = ?)")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM tracks WHERE config_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM config_audios WHERE config_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM configs WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted config {}", id);
    Ok(())
}

/// Delete every config and everything hanging off configs
pub async fn delete_all_configs(pool: &SqlitePool) -> Result<u64> {
    let mut tx = begin_write(pool).await?;

    for table in ["actions", "events", "tracks", "config_audios"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }
    let deleted = sqlx::query("DELETE FROM configs")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!("Deleted all configs ({} rows)", deleted);
    Ok(deleted)
}
