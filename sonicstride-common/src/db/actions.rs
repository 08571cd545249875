//! Action repository

use super::{begin_write, ensure_exists, Action, ActionPatch, NewAction, Parent};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

const SELECT_ACTION: &str =
    "SELECT id, event_id, target, property, method, value, end_time FROM actions";

fn action_from_row(row: &SqliteRow) -> Result<Action> {
    Ok(Action {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        target: row.try_get("target")?,
        property: row.try_get("property")?,
        method: row.try_get("method")?,
        value: row.try_get("value")?,
        end_time: row.try_get("end_time")?,
    })
}

async fn fetch_action(conn: &mut SqliteConnection, id: i64) -> Result<Option<Action>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ACTION))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(action_from_row).transpose()
}

fn not_found(id: i64) -> Error {
    Error::not_found(format!("Action {} not found", id))
}

pub async fn list_actions(pool: &SqlitePool) -> Result<Vec<Action>> {
    let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_ACTION))
        .fetch_all(pool)
        .await?;
    rows.iter().map(action_from_row).collect()
}

pub async fn get_action(pool: &SqlitePool, id: i64) -> Result<Action> {
    let mut conn = pool.acquire().await?;
    fetch_action(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Create an action under an existing event
pub async fn create_action(pool: &SqlitePool, new: NewAction) -> Result<Action> {
    let mut tx = begin_write(pool).await?;

    ensure_exists(&mut tx, Parent::Event, new.event_id).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO actions (event_id, target, property, method, value, end_time)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.event_id)
    .bind(&new.target)
    .bind(&new.property)
    .bind(&new.method)
    .bind(new.value)
    .bind(new.end_time)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;

    info!("Created action {} under event {}", id, new.event_id);
    Ok(Action {
        id,
        event_id: new.event_id,
        target: Some(new.target),
        property: Some(new.property),
        method: Some(new.method),
        value: Some(new.value),
        end_time: Some(new.end_time),
    })
}

pub async fn update_action(pool: &SqlitePool, id: i64, patch: ActionPatch) -> Result<Action> {
    let mut tx = begin_write(pool).await?;

    let mut action = fetch_action(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    if let Some(event_id) = patch.event_id {
        ensure_exists(&mut tx, Parent::Event, event_id).await?;
    }
    patch.apply_to(&mut action);

    sqlx::query(
        r#"
        UPDATE actions
        SET event_id = ?, target = ?, property = ?, method = ?, value = ?, end_time = ?
        WHERE id = ?
        "#,
    )
    .bind(action.event_id)
    .bind(&action.target)
    .bind(&action.property)
    .bind(&action.method)
    .bind(action.value)
    .bind(action.end_time)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Updated action {}", id);
    Ok(action)
}

pub async fn delete_action(pool: &SqlitePool, id: i64) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM actions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(not_found(id));
    }

    info!("Deleted action {}", id);
    Ok(())
}

pub async fn delete_all_actions(pool: &SqlitePool) -> Result<u64> {
    let deleted = sqlx::query("DELETE FROM actions")
        .execute(pool)
        .await?
        .rows_affected();

    info!("Deleted all actions ({} rows)", deleted);
    Ok(deleted)
}
