use chrono::{SubsecRound, Utc};
use serde_json::json;
use uuid::Uuid;

use safecon_sync::models::{Action, ActionStatus};
use safecon_sync::store::{ActionStore, JsonFileStore};

fn action(kind: &str, status: ActionStatus) -> Action {
    Action {
        id: Uuid::now_v7(),
        kind: kind.to_string(),
        payload: json!({ "title": "A" }),
        timestamp: Utc::now(),
        retries: 1,
        max_retries: 3,
        status,
        error: None,
    }
}

#[tokio::test]
async fn round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("queue.json"));

    let saved = vec![
        action("CREATE_CONTRACT", ActionStatus::Pending),
        action("ANCHOR_CONTRACT", ActionStatus::Failed),
    ];
    store.save(&saved).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, saved[0].id);
    assert_eq!(loaded[0].kind, "CREATE_CONTRACT");
    assert_eq!(loaded[0].timestamp, saved[0].timestamp.trunc_subsecs(3));
    assert_eq!(loaded[1].status, ActionStatus::Failed);
}

#[tokio::test]
async fn processing_becomes_pending_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("queue.json"));

    store
        .save(&[action("REQUEST_SIGNATURE", ActionStatus::Processing)])
        .await
        .unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded[0].status, ActionStatus::Pending);
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("never-written.json"));

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    tokio::fs::write(&path, b"{not json").await.unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn persisted_shape_matches_wire_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let store = JsonFileStore::new(&path);

    let mut failed = action("ANCHOR_CONTRACT", ActionStatus::Failed);
    failed.error = Some("network down".to_string());
    store.save(&[failed]).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
    let record = &raw[0];

    assert_eq!(record["type"], "ANCHOR_CONTRACT");
    assert_eq!(record["status"], "failed");
    assert_eq!(record["maxRetries"], 3);
    assert_eq!(record["error"], "network down");
    assert!(record["timestamp"].is_i64(), "timestamp persists as epoch ms");
}
