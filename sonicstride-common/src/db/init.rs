//! Database initialization
//!
//! Opens (creating if needed) the SQLite database and creates every table.
//! Table creation is idempotent, so this runs on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection pragma in SQLite, so they go on the
    // connect options rather than a one-off query against the pool
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_configs_table(pool).await?;
    create_audio_files_table(pool).await?;
    create_config_audios_table(pool).await?;
    create_tracks_table(pool).await?;
    create_events_table(pool).await?;
    create_actions_table(pool).await?;
    create_musics_table(pool).await?;
    Ok(())
}

async fn create_configs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS configs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            author TEXT,
            interaction_type TEXT,
            bpm INTEGER,
            create_time TEXT NOT NULL,
            labels TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_configs_interaction_type ON configs(interaction_type)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_audio_files_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            author TEXT,
            type TEXT NOT NULL,
            genre TEXT,
            "key" TEXT,
            bpm INTEGER,
            file_path TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audio_files_type ON audio_files(type)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audio_files_genre ON audio_files(genre)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_config_audios_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS config_audios (
            config_id INTEGER NOT NULL REFERENCES configs(id),
            audio_id INTEGER NOT NULL REFERENCES audio_files(id),
            PRIMARY KEY (config_id, audio_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_config_audios_audio ON config_audios(audio_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            config_id INTEGER NOT NULL REFERENCES configs(id),
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            "loop" BOOLEAN,
            decay BOOLEAN,
            initial_gain REAL,
            track_initial_gain REAL,
            track_gain_node TEXT,
            effect_nodes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_config ON tracks(config_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_id INTEGER NOT NULL REFERENCES tracks(id),
            type TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_track ON events(track_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_actions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL REFERENCES events(id),
            target TEXT,
            property TEXT,
            method TEXT,
            value REAL,
            end_time REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_actions_event ON actions(event_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_musics_table(pool: &SqlitePool) -> Result<()> {
    // seq gives list order; the public identifier is the UUID
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS musics (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            experiment_title TEXT NOT NULL,
            default_scene TEXT NOT NULL,
            genre TEXT NOT NULL,
            bpm INTEGER,
            "key" TEXT,
            song_name TEXT NOT NULL,
            track_id TEXT NOT NULL,
            music_file TEXT NOT NULL,
            upload_date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
