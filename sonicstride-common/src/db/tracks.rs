//! Track repository

use super::{
    begin_write, decode_document, encode_document, ensure_exists, NewTrack, Parent, Track,
    TrackPatch,
};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

const SELECT_TRACK: &str = r#"
    SELECT id, config_id, name, type, "loop", decay, initial_gain, track_initial_gain,
           track_gain_node, effect_nodes
    FROM tracks
"#;

fn track_from_row(row: &SqliteRow) -> Result<Track> {
    Ok(Track {
        id: row.try_get("id")?,
        config_id: row.try_get("config_id")?,
        name: row.try_get("name")?,
        kind: row.try_get("type")?,
        looped: row.try_get("loop")?,
        decay: row.try_get("decay")?,
        initial_gain: row.try_get("initial_gain")?,
        track_initial_gain: row.try_get("track_initial_gain")?,
        track_gain_node: decode_document(row.try_get("track_gain_node")?)?,
        effect_nodes: decode_document(row.try_get("effect_nodes")?)?,
    })
}

async fn fetch_track(conn: &mut SqliteConnection, id: i64) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_TRACK))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(track_from_row).transpose()
}

fn not_found(id: i64) -> Error {
    Error::not_found(format!("Track {} not found", id))
}

pub async fn list_tracks(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_TRACK))
        .fetch_all(pool)
        .await?;
    rows.iter().map(track_from_row).collect()
}

pub async fn get_track(pool: &SqlitePool, id: i64) -> Result<Track> {
    let mut conn = pool.acquire().await?;
    fetch_track(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Create a track under an existing config
pub async fn create_track(pool: &SqlitePool, new: NewTrack) -> Result<Track> {
    let mut tx = begin_write(pool).await?;

    ensure_exists(&mut tx, Parent::Config, new.config_id).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO tracks (config_id, name, type, "loop", decay, initial_gain,
                            track_initial_gain, track_gain_node, effect_nodes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.config_id)
    .bind(&new.name)
    .bind(&new.kind)
    .bind(new.looped)
    .bind(new.decay)
    .bind(new.initial_gain)
    .bind(new.track_initial_gain)
    .bind(encode_document(&new.track_gain_node)?)
    .bind(encode_document(&new.effect_nodes)?)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let track = fetch_track(&mut tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Track {} vanished after insert", id)))?;
    tx.commit().await?;

    info!("Created track {} under config {}", id, track.config_id);
    Ok(track)
}

/// Apply a partial update; moving the track to another config validates it
pub async fn update_track(pool: &SqlitePool, id: i64, patch: TrackPatch) -> Result<Track> {
    let mut tx = begin_write(pool).await?;

    let mut track = fetch_track(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    if let Some(config_id) = patch.config_id {
        ensure_exists(&mut tx, Parent::Config, config_id).await?;
    }
    patch.apply_to(&mut track);

    sqlx::query(
        r#"
        UPDATE tracks
        SET config_id = ?, name = ?, type = ?, "loop" = ?, decay = ?, initial_gain = ?,
            track_initial_gain = ?, track_gain_node = ?, effect_nodes = ?
        WHERE id = ?
        "#,
    )
    .bind(track.config_id)
    .bind(&track.name)
    .bind(&track.kind)
    .bind(track.looped)
    .bind(track.decay)
    .bind(track.initial_gain)
    .bind(track.track_initial_gain)
    .bind(encode_document(&track.track_gain_node)?)
    .bind(encode_document(&track.effect_nodes)?)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Updated track {}", id);
    Ok(track)
}

/// Delete a track with its events and their actions
pub async fn delete_track(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = begin_write(pool).await?;

    if !super::exists(&mut tx, Parent::Track, id).await? {
        return Err(not_found(id));
    }

    sqlx::query("DELETE FROM actions WHERE event_id IN (SELECT id FROM events WHERE track_id = ?)")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM events WHERE track_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted track {}", id);
    Ok(())
}

/// Delete every track (and so every event and action)
pub async fn delete_all_tracks(pool: &SqlitePool) -> Result<u64> {
    let mut tx = begin_write(pool).await?;

    sqlx::query("DELETE FROM actions").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM events").execute(&mut *tx).await?;
    let deleted = sqlx::query("DELETE FROM tracks")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!("Deleted all tracks ({} rows)", deleted);
    Ok(deleted)
}
