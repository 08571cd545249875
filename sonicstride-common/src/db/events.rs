//! Event repository

use super::{begin_write, ensure_exists, Event, EventPatch, NewEvent, Parent};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

fn event_from_row(row: &SqliteRow) -> Result<Event> {
    Ok(Event {
        id: row.try_get("id")?,
        track_id: row.try_get("track_id")?,
        kind: row.try_get("type")?,
    })
}

async fn fetch_event(conn: &mut SqliteConnection, id: i64) -> Result<Option<Event>> {
    let row = sqlx::query("SELECT id, track_id, type FROM events WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(event_from_row).transpose()
}

fn not_found(id: i64) -> Error {
    Error::not_found(format!("Event {} not found", id))
}

pub async fn list_events(pool: &SqlitePool) -> Result<Vec<Event>> {
    let rows = sqlx::query("SELECT id, track_id, type FROM events ORDER BY id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(event_from_row).collect()
}

pub async fn get_event(pool: &SqlitePool, id: i64) -> Result<Event> {
    let mut conn = pool.acquire().await?;
    fetch_event(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Create an event under an existing track
pub async fn create_event(pool: &SqlitePool, new: NewEvent) -> Result<Event> {
    let mut tx = begin_write(pool).await?;

    ensure_exists(&mut tx, Parent::Track, new.track_id).await?;

    let id = sqlx::query("INSERT INTO events (track_id, type) VALUES (?, ?)")
        .bind(new.track_id)
        .bind(&new.kind)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    tx.commit().await?;

    info!("Created event {} under track {}", id, new.track_id);
    Ok(Event {
        id,
        track_id: new.track_id,
        kind: new.kind,
    })
}

pub async fn update_event(pool: &SqlitePool, id: i64, patch: EventPatch) -> Result<Event> {
    let mut tx = begin_write(pool).await?;

    let mut event = fetch_event(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    if let Some(track_id) = patch.track_id {
        ensure_exists(&mut tx, Parent::Track, track_id).await?;
    }
    patch.apply_to(&mut event);

    sqlx::query("UPDATE events SET track_id = ?, type = ? WHERE id = ?")
        .bind(event.track_id)
        .bind(&event.kind)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Updated event {}", id);
    Ok(event)
}

/// Delete an event with its actions
pub async fn delete_event(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = begin_write(pool).await?;

    if !super::exists(&mut tx, Parent::Event, id).await? {
        return Err(not_found(id));
    }

    sqlx::query("DELETE FROM actions WHERE event_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted event {}", id);
    Ok(())
}

pub async fn delete_all_events(pool: &SqlitePool) -> Result<u64> {
    let mut tx = begin_write(pool).await?;

    sqlx::query("DELETE FROM actions").execute(&mut *tx).await?;
    let deleted = sqlx::query("DELETE FROM events")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!("Deleted all events ({} rows)", deleted);
    Ok(deleted)
}
