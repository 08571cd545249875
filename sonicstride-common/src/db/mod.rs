//! Database schema, models and entity repositories
//!
//! Repository functions take the pool and run each mutating operation in one
//! `BEGIN IMMEDIATE` transaction. Foreign keys are checked explicitly before
//! any insert or update so callers get a `NotFound` naming the missing parent
//! rather than a constraint violation. Deletes cascade at the application level:
//!
//! | Deleted     | Also removed                                        |
//! |-------------|-----------------------------------------------------|
//! | config      | its config_audios rows, tracks, their events/actions |
//! | track       | its events and their actions                        |
//! | event       | its actions                                         |
//! | audio file  | its config_audios rows                              |

pub mod actions;
pub mod audio_files;
pub mod configs;
pub mod events;
pub mod init;
pub mod lookups;
pub mod models;
pub mod music;
pub mod tracks;

pub use init::{create_schema, init_database};
pub use models::*;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Start a write transaction holding SQLite's write lock from the outset.
///
/// Concurrent writers queue on the busy timeout rather than failing when a
/// deferred transaction upgrades from read to write.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Tables that can be the target of a foreign key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parent {
    Config,
    AudioFile,
    Track,
    Event,
}

impl Parent {
    fn table(self) -> &'static str {
        match self {
            Parent::Config => "configs",
            Parent::AudioFile => "audio_files",
            Parent::Track => "tracks",
            Parent::Event => "events",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Parent::Config => "Config",
            Parent::AudioFile => "AudioFile",
            Parent::Track => "Track",
            Parent::Event => "Event",
        }
    }
}

pub(crate) async fn exists(conn: &mut SqliteConnection, parent: Parent, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", parent.table());
    let found: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(found != 0)
}

/// Fail with `NotFound` naming the reference when `id` has no row
pub(crate) async fn ensure_exists(
    conn: &mut SqliteConnection,
    parent: Parent,
    id: i64,
) -> Result<()> {
    if exists(conn, parent, id).await? {
        Ok(())
    } else {
        Err(Error::not_found(format!("{} ID {} not found", parent.label(), id)))
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}': {}", value, e)))
}

pub(crate) fn encode_document(value: &Option<serde_json::Value>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(Error::from)
}

pub(crate) fn decode_document(text: Option<String>) -> Result<Option<serde_json::Value>> {
    text.as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(Error::from)
}
