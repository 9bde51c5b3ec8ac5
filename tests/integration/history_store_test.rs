//! Integration tests for the SQLite history store and query engine.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use trailhub_core::config::DatabaseConfig;
use trailhub_core::types::HistoryFilter;
use trailhub_database::migration::run_migrations;
use trailhub_database::{DatabasePool, HistoryRepository, HistoryStore};
use trailhub_entity::history::{ChangePayload, FieldChange, NewHistoryEntry};
use trailhub_service::{HistoryCriteria, HistoryQueryEngine, HistoryRecorder, RecordChanges, RecordHistory, ViewerContext};

/// A file database under the system temp dir, removed on drop
struct TempDatabase {
    dir: PathBuf,
    config: DatabaseConfig,
}

impl TempDatabase {
    fn new(name: &str) -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("trailhub-{name}-{}-{nanos}", std::process::id()));
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.join("history.db").display()),
            max_connections: 4,
            ..DatabaseConfig::default()
        };
        Self { dir, config }
    }

    async fn connect(&self) -> DatabasePool {
        let db = DatabasePool::connect(&self.config).await.expect("connect");
        run_migrations(db.pool()).await.expect("migrate");
        db
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[tokio::test]
async fn test_entries_survive_reconnect() {
    let temp = TempDatabase::new("reconnect");

    let db = temp.connect().await;
    let repo = HistoryRepository::new(db.pool().clone());
    let written = repo
        .append(
            NewHistoryEntry::new("invoice", "7", "update")
                .named("INV-7")
                .with_changes(ChangePayload::encode(&[FieldChange::new("status", "draft", "sent")])),
        )
        .await
        .expect("append");
    db.close().await;

    let db = temp.connect().await;
    let repo = HistoryRepository::new(db.pool().clone());
    let read = repo.find_by_id(written.id).await.expect("find").expect("present");
    assert_eq!(read.entity_name.as_deref(), Some("INV-7"));
    assert_eq!(
        ChangePayload::decode(read.changes.as_deref()),
        vec![FieldChange::new("status", "draft", "sent")]
    );
    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_recorders_share_one_sequence() {
    let temp = TempDatabase::new("concurrent");
    let db = temp.connect().await;
    let store: Arc<dyn HistoryStore> = Arc::new(HistoryRepository::new(db.pool().clone()));
    let recorder = HistoryRecorder::new(Arc::clone(&store));

    let mut handles = Vec::new();
    for i in 0..32 {
        let recorder = recorder.clone();
        handles.push(tokio::spawn(async move {
            recorder
                .record(RecordHistory::new("invoice", format!("{}", i % 4), "update"))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.expect("join").expect("record"));
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 32);

    let all = store.query(&HistoryFilter::all()).await.expect("query");
    assert_eq!(all.len(), 32);
    db.close().await;
}

#[tokio::test]
async fn test_engine_over_sqlite_store() {
    let db = DatabasePool::connect(&DatabaseConfig::in_memory()).await.expect("connect");
    run_migrations(db.pool()).await.expect("migrate");
    let store: Arc<dyn HistoryStore> = Arc::new(HistoryRepository::new(db.pool().clone()));
    let engine = HistoryQueryEngine::new(Arc::clone(&store));

    let d1 = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();
    store
        .append(NewHistoryEntry::new("invoice", "1", "create").named("INV-1").at(d1))
        .await
        .expect("append");
    store
        .append(
            NewHistoryEntry::new("invoice", "1", "update")
                .with_changes(r#"{"status":"paid"}"#)
                .by("u2", "Bob Stone")
                .at(d1),
        )
        .await
        .expect("append");
    store
        .append(NewHistoryEntry::new("user", "9", "delete").at(d1 + Duration::days(1)))
        .await
        .expect("append");

    let viewer = ViewerContext::utc();
    let grouped = engine.find(&HistoryCriteria::all(), &viewer).await.expect("find");
    assert_eq!(grouped.total, 3);
    assert_eq!(grouped.groups.len(), 2);
    assert_eq!(grouped.groups[0].date.to_string(), "2024-05-03");
    let day1: Vec<&str> = grouped.groups[1].entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(day1, ["create", "update"]);

    let invoices = engine
        .find(&HistoryCriteria::all().entity_type("invoice"), &viewer)
        .await
        .expect("find");
    assert_eq!(invoices.total, 2);
    assert_eq!(invoices.groups.len(), 1);

    let by_actor = engine.find(&HistoryCriteria::all().search("bob"), &viewer).await.expect("find");
    assert_eq!(by_actor.total, 1);

    let recorder = HistoryRecorder::new(Arc::clone(&store));
    let id = recorder
        .record(
            RecordHistory::new("invoice", "1", "cancel").with_changes(RecordChanges::Text("some free text".to_string())),
        )
        .await
        .expect("record");
    let entry = engine.entry(id).await.expect("entry");
    assert_eq!(
        ChangePayload::decode(entry.changes.as_deref()),
        vec![FieldChange::added("details", "some free text")]
    );
}
