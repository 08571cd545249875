//! Tests for database initialization
//!
//! - Database file and parent directories are created on first run
//! - Reopening an existing database keeps its rows
//! - Foreign keys are enforced on every pooled connection

use sonicstride_common::db::init::init_database;
use tempfile::TempDir;

const TABLES: [&str; 7] = [
    "configs",
    "audio_files",
    "config_audios",
    "tracks",
    "events",
    "actions",
    "musics",
];

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("sonicstride.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();

    for table in TABLES {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1, "table {} missing", table);
    }
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO configs (name, create_time) VALUES ('kept', '2024-01-01T00:00:00+00:00')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    // Second open runs schema creation again (idempotent)
    let pool = init_database(&db_path).await.unwrap();
    let name: String = sqlx::query_scalar("SELECT name FROM configs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "kept");
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();

    // Check several connections, not just the first one the pool hands out
    let mut held = Vec::new();
    for _ in 0..3 {
        let mut conn = pool.acquire().await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
        held.push(conn);
    }
    drop(held);

    let orphan = sqlx::query("INSERT INTO events (track_id, type) VALUES (999, 'beat')")
        .execute(&pool)
        .await;
    assert!(orphan.is_err(), "insert with dangling track_id should fail");
}
