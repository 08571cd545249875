//! Tests for relationship lookups

use sonicstride_common::db::{
    actions, audio_files, configs, events, init::init_database, lookups, tracks, NewAction,
    NewAudioFile, NewConfig, NewEvent, NewTrack,
};
use sonicstride_common::validation::Genre;
use sonicstride_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("test.db")).await.unwrap();
    (dir, pool)
}

async fn add_audio(pool: &SqlitePool, name: &str, kind: &str, genre: Option<Genre>) -> i64 {
    let new = NewAudioFile {
        name: name.to_string(),
        author: None,
        kind: kind.to_string(),
        genre,
        key: None,
        bpm: None,
    };
    audio_files::create_audio_file(pool, new, &format!("/store/{}", name))
        .await
        .unwrap()
        .id
}

async fn add_config(pool: &SqlitePool, interaction_type: Option<&str>, audio_ids: Vec<i64>) -> i64 {
    let new = NewConfig {
        name: "cfg".to_string(),
        author: None,
        interaction_type: interaction_type.map(str::to_string),
        bpm: None,
        labels: None,
        audio_ids,
    };
    configs::create_config(pool, new).await.unwrap().id
}

async fn add_track(pool: &SqlitePool, config_id: i64) -> i64 {
    let new = NewTrack {
        config_id,
        name: "t".to_string(),
        kind: "melody".to_string(),
        looped: None,
        decay: None,
        initial_gain: None,
        track_initial_gain: None,
        track_gain_node: None,
        effect_nodes: None,
    };
    tracks::create_track(pool, new).await.unwrap().id
}

async fn add_event(pool: &SqlitePool, track_id: i64) -> i64 {
    let new = NewEvent {
        track_id,
        kind: "beat".to_string(),
    };
    events::create_event(pool, new).await.unwrap().id
}

#[tokio::test]
async fn test_audio_ids_for_config() {
    let (_dir, pool) = setup_test_db().await;

    let a = add_audio(&pool, "a", "fx", None).await;
    let b = add_audio(&pool, "b", "fx", None).await;
    let config = add_config(&pool, None, vec![b, a]).await;
    let empty = add_config(&pool, None, vec![]).await;

    assert_eq!(lookups::audio_ids_for_config(&pool, config).await.unwrap(), vec![a, b]);
    assert!(lookups::audio_ids_for_config(&pool, empty).await.unwrap().is_empty());
    assert!(matches!(
        lookups::audio_ids_for_config(&pool, 999).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_event_and_action_ids() {
    let (_dir, pool) = setup_test_db().await;

    let config = add_config(&pool, None, vec![]).await;
    let track = add_track(&pool, config).await;
    let other_track = add_track(&pool, config).await;
    let e1 = add_event(&pool, track).await;
    let e2 = add_event(&pool, track).await;
    add_event(&pool, other_track).await;

    let action = actions::create_action(
        &pool,
        NewAction {
            event_id: e1,
            target: "t".to_string(),
            property: "gain".to_string(),
            method: "set".to_string(),
            value: 1.0,
            end_time: 0.5,
        },
    )
    .await
    .unwrap();

    assert_eq!(lookups::event_ids_for_track(&pool, track).await.unwrap(), vec![e1, e2]);
    assert_eq!(lookups::action_ids_for_event(&pool, e1).await.unwrap(), vec![action.id]);
    assert!(lookups::action_ids_for_event(&pool, e2).await.unwrap().is_empty());
    assert!(matches!(
        lookups::event_ids_for_track(&pool, 404).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        lookups::action_ids_for_event(&pool, 404).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_filter_lookups() {
    let (_dir, pool) = setup_test_db().await;

    let rain = add_audio(&pool, "rain", "ambient", Some(Genre::RainSounds)).await;
    let beat = add_audio(&pool, "beat", "rhythm", Some(Genre::Lofi)).await;
    let drizzle = add_audio(&pool, "drizzle", "ambient", Some(Genre::RainSounds)).await;
    let tempo = add_config(&pool, Some("tempo"), vec![]).await;
    add_config(&pool, Some("step"), vec![]).await;

    assert_eq!(
        lookups::audio_ids_by_type(&pool, "ambient").await.unwrap(),
        vec![rain, drizzle]
    );
    assert_eq!(
        lookups::audio_ids_by_genre(&pool, Genre::Lofi).await.unwrap(),
        vec![beat]
    );
    assert_eq!(
        lookups::config_ids_by_interaction_type(&pool, "tempo").await.unwrap(),
        vec![tempo]
    );

    // No match is an empty list, not an error
    assert!(lookups::audio_ids_by_type(&pool, "speech").await.unwrap().is_empty());
    assert!(lookups::audio_ids_by_genre(&pool, Genre::Jazz).await.unwrap().is_empty());
    assert!(lookups::config_ids_by_interaction_type(&pool, "none")
        .await
        .unwrap()
        .is_empty());
}
