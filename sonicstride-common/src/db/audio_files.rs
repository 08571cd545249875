//! Audio file repository
//!
//! Rows point at content held in the asset store. Removing the stored content
//! is the caller's job; delete functions hand back the paths they orphaned.

use super::{begin_write, AudioFile, AudioFilePatch, NewAudioFile};
use crate::validation::Genre;
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;

const SELECT_AUDIO_FILE: &str = r#"
    SELECT id, name, author, type, genre, "key", bpm, file_path
    FROM audio_files
"#;

fn audio_file_from_row(row: &SqliteRow) -> Result<AudioFile> {
    let genre: Option<String> = row.try_get("genre")?;
    Ok(AudioFile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        author: row.try_get("author")?,
        kind: row.try_get("type")?,
        genre: genre.as_deref().map(str::parse::<Genre>).transpose()?,
        key: row.try_get("key")?,
        bpm: row.try_get("bpm")?,
        file_path: row.try_get("file_path")?,
    })
}

async fn fetch_audio_file(conn: &mut SqliteConnection, id: i64) -> Result<Option<AudioFile>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_AUDIO_FILE))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(audio_file_from_row).transpose()
}

fn not_found(id: i64) -> Error {
    Error::not_found(format!("AudioFile {} not found", id))
}

pub async fn list_audio_files(pool: &SqlitePool) -> Result<Vec<AudioFile>> {
    let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_AUDIO_FILE))
        .fetch_all(pool)
        .await?;
    rows.iter().map(audio_file_from_row).collect()
}

pub async fn get_audio_file(pool: &SqlitePool, id: i64) -> Result<AudioFile> {
    let mut conn = pool.acquire().await?;
    fetch_audio_file(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Record an audio file whose content is already stored at `file_path`
pub async fn create_audio_file(
    pool: &SqlitePool,
    new: NewAudioFile,
    file_path: &str,
) -> Result<AudioFile> {
    let mut tx = begin_write(pool).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO audio_files (name, author, type, genre, "key", bpm, file_path)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.author)
    .bind(&new.kind)
    .bind(new.genre.map(|g| g.as_str()))
    .bind(&new.key)
    .bind(new.bpm)
    .bind(file_path)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let audio = fetch_audio_file(&mut tx, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("AudioFile {} vanished after insert", id)))?;
    tx.commit().await?;

    info!("Created audio file {} ({})", id, audio.file_path);
    Ok(audio)
}

/// Apply a partial metadata update; the stored content is not replaceable
pub async fn update_audio_file(
    pool: &SqlitePool,
    id: i64,
    patch: AudioFilePatch,
) -> Result<AudioFile> {
    let mut tx = begin_write(pool).await?;

    let mut audio = fetch_audio_file(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    patch.apply_to(&mut audio);

    sqlx::query(
        r#"
        UPDATE audio_files
        SET name = ?, author = ?, type = ?, genre = ?, "key" = ?, bpm = ?
        WHERE id = ?
        "#,
    )
    .bind(&audio.name)
    .bind(&audio.author)
    .bind(&audio.kind)
    .bind(audio.genre.map(|g| g.as_str()))
    .bind(&audio.key)
    .bind(audio.bpm)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Updated audio file {}", id);
    Ok(audio)
}

/// Delete an audio file row and its config associations.
///
/// Returns the deleted row so the caller can drop the stored content.
pub async fn delete_audio_file(pool: &SqlitePool, id: i64) -> Result<AudioFile> {
    let mut tx = begin_write(pool).await?;

    let audio = fetch_audio_file(&mut tx, id).await?.ok_or_else(|| not_found(id))?;

    sqlx::query("DELETE FROM config_audios WHERE audio_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM audio_files WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted audio file {}", id);
    Ok(audio)
}

/// Delete every audio file row; returns the stored paths they referenced
pub async fn delete_all_audio_files(pool: &SqlitePool) -> Result<Vec<String>> {
    let mut tx = begin_write(pool).await?;

    let paths: Vec<String> = sqlx::query_scalar("SELECT file_path FROM audio_files ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM config_audios")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM audio_files")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Deleted all audio files ({} rows)", paths.len());
    Ok(paths)
}
