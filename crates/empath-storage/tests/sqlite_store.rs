// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `SqliteStore` behavior through the `PersistentStore` trait.

use chrono::TimeZone;
use tempfile::tempdir;

use empath_config::model::StorageConfig;
use empath_core::types::{EmotionLabel, SummaryRecord, Transcript, Turn, UserId, UserMemory};
use empath_core::{HealthStatus, PersistentStore, PluginAdapter};
use empath_storage::{Database, SqliteStore};

fn record(minute: u32, text: &str) -> SummaryRecord {
    let at = chrono::Utc
        .with_ymd_and_hms(2026, 2, 14, 9, minute, 0)
        .unwrap();
    SummaryRecord::new(at, text)
}

#[tokio::test]
async fn unknown_user_loads_empty() {
    let store = SqliteStore::from_database(Database::open_in_memory().await.unwrap());
    let memory = store.load(&UserId::from("nobody")).await.unwrap();
    assert_eq!(memory, UserMemory::default());
    assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
}

#[tokio::test]
async fn save_and_reload_across_reopen() {
    let dir = tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("empath.db").to_string_lossy().to_string(),
        wal_mode: true,
    };
    let user = UserId::from("ana");
    let memory = UserMemory {
        transcript: Transcript::from_turns(vec![
            Turn::new("exams tomorrow", "You've prepared well.", EmotionLabel::Fear),
            Turn::new("thanks", "Any time.", EmotionLabel::Happy),
        ]),
        summaries: vec![record(1, "talked about a new job")],
    };

    {
        let store = SqliteStore::open(&config).await.unwrap();
        store.save(&user, &memory).await.unwrap();
        store.close().await.unwrap();
    }

    let store = SqliteStore::open(&config).await.unwrap();
    assert_eq!(store.load(&user).await.unwrap(), memory);
}

#[tokio::test]
async fn farewell_shape_save_clears_turns_and_appends_summary() {
    let store = SqliteStore::from_database(Database::open_in_memory().await.unwrap());
    let user = UserId::from("ana");

    let mut memory = UserMemory {
        transcript: Transcript::from_turns(vec![Turn::new("hi", "hello", EmotionLabel::Neutral)]),
        summaries: vec![record(1, "first chat")],
    };
    store.save(&user, &memory).await.unwrap();

    memory.transcript.clear();
    memory.summaries.push(record(30, "second chat"));
    store.save(&user, &memory).await.unwrap();

    let loaded = store.load(&user).await.unwrap();
    assert!(loaded.transcript.is_empty());
    assert_eq!(
        loaded.summary_texts(),
        vec!["first chat".to_string(), "second chat".to_string()]
    );
}

#[tokio::test]
async fn stored_summaries_are_never_removed() {
    let store = SqliteStore::from_database(Database::open_in_memory().await.unwrap());
    let user = UserId::from("ana");

    let memory = UserMemory {
        transcript: Transcript::new(),
        summaries: vec![record(1, "a"), record(2, "b")],
    };
    store.save(&user, &memory).await.unwrap();
    store.save(&user, &UserMemory::default()).await.unwrap();

    assert_eq!(store.load(&user).await.unwrap().summaries.len(), 2);
}
