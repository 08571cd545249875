//! Read-only relationship lookups
//!
//! Parent-keyed lookups tell a missing parent (`NotFound`) apart from a parent
//! without children (empty list). Filter lookups have no parent, so no match
//! is simply an empty list.

use super::{exists, Parent};
use crate::validation::Genre;
use crate::{Error, Result};
use sqlx::SqlitePool;

async fn child_ids(
    pool: &SqlitePool,
    parent: Parent,
    parent_id: i64,
    sql: &str,
) -> Result<Vec<i64>> {
    let mut conn = pool.acquire().await?;

    if !exists(&mut conn, parent, parent_id).await? {
        return Err(Error::not_found(format!(
            "{} {} not found",
            parent.label(),
            parent_id
        )));
    }

    let ids = sqlx::query_scalar(sql)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

/// Audio file ids associated with a config
pub async fn audio_ids_for_config(pool: &SqlitePool, config_id: i64) -> Result<Vec<i64>> {
    child_ids(
        pool,
        Parent::Config,
        config_id,
        "SELECT audio_id FROM config_audios WHERE config_id = ? ORDER BY audio_id",
    )
    .await
}

/// Event ids belonging to a track
pub async fn event_ids_for_track(pool: &SqlitePool, track_id: i64) -> Result<Vec<i64>> {
    child_ids(
        pool,
        Parent::Track,
        track_id,
        "SELECT id FROM events WHERE track_id = ? ORDER BY id",
    )
    .await
}

/// Action ids belonging to an event
pub async fn action_ids_for_event(pool: &SqlitePool, event_id: i64) -> Result<Vec<i64>> {
    child_ids(
        pool,
        Parent::Event,
        event_id,
        "SELECT id FROM actions WHERE event_id = ? ORDER BY id",
    )
    .await
}

/// Audio file ids with the given type
pub async fn audio_ids_by_type(pool: &SqlitePool, kind: &str) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM audio_files WHERE type = ? ORDER BY id")
        .bind(kind)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Audio file ids with the given genre
pub async fn audio_ids_by_genre(pool: &SqlitePool, genre: Genre) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM audio_files WHERE genre = ? ORDER BY id")
        .bind(genre.as_str())
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Config ids with the given interaction type
pub async fn config_ids_by_interaction_type(
    pool: &SqlitePool,
    interaction_type: &str,
) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM configs WHERE interaction_type = ? ORDER BY id")
        .bind(interaction_type)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}
