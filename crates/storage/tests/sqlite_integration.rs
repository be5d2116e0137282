use std::sync::Arc;

use lesson_core::model::{Progress, TopicId};
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::{ProgressGateway, progress_key};

#[tokio::test]
async fn sqlite_store_upserts_values() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("Progress_0").await.unwrap(), None);

    repo.set("Progress_0", b"first").await.unwrap();
    repo.set("Progress_0", b"second").await.unwrap();

    let stored = repo.get("Progress_0").await.unwrap();
    assert_eq!(stored.as_deref(), Some(&b"second"[..]));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", b"v").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some(&b"v"[..]));
}

#[tokio::test]
async fn progress_round_trips_through_sqlite_storage() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_progress?mode=memory&cache=shared")
        .await
        .expect("storage");
    let gateway = ProgressGateway::new(Arc::clone(&storage.kv));

    let topic_id = TopicId::new(0);
    assert_eq!(gateway.load(topic_id).await, None);

    let mut progress = Progress::new(topic_id);
    progress.lesson_read = true;
    progress.record_quiz_pass(31);
    gateway.save(&progress).await;

    assert_eq!(gateway.load(topic_id).await, Some(progress));

    let raw = storage.kv.get(&progress_key(topic_id)).await.unwrap().unwrap();
    let json = String::from_utf8(raw).unwrap();
    assert!(json.contains(r#""quizHighScore":31"#));
}
