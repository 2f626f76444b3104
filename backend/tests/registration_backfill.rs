//! End-to-end registration backfill against the JSON file record store.
use std::path::Path;
use std::sync::Arc;

use ecoclub_console::domain::ports::{Collection, Document, RecordStore};
use ecoclub_console::domain::{JobState, ReconciliationJob, ReconciliationTally};
use ecoclub_console::outbound::document_store::{JsonFileRecordStore, StoreSnapshot};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

fn write_snapshot(path: &Path) {
    let mut snapshot = StoreSnapshot::default();
    snapshot.users.insert(
        "u-jane".to_owned(),
        document(json!({
            "name": "Jane Doe",
            "email": "jane@x.com",
            "mobile": "9876543210",
            "batch": "2023"
        })),
    );
    snapshot.registrations.insert(
        "reg-1".to_owned(),
        document(json!({ "userId": "u-jane", "eventId": "evt-cleanup", "answers": { "f1": "yes" } })),
    );
    snapshot.registrations.insert(
        "reg-2".to_owned(),
        document(json!({ "userId": "u-gone" })),
    );
    let contents = serde_json::to_string(&snapshot).expect("encode snapshot");
    std::fs::write(path, contents).expect("write snapshot");
}

#[fixture]
fn store_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write_snapshot(&dir.path().join("store.json"));
    dir
}

#[rstest]
#[tokio::test]
async fn backfill_persists_and_is_idempotent(store_dir: TempDir) {
    let path = store_dir.path().join("store.json");
    let store = Arc::new(JsonFileRecordStore::open(&path).expect("open store"));
    let job = ReconciliationJob::new(store);

    let first = job.run().await.expect("first run");
    assert_eq!(
        first,
        ReconciliationTally {
            succeeded: 1,
            skipped: 0,
            failed: 1,
        }
    );

    let reopened = Arc::new(JsonFileRecordStore::open(&path).expect("reopen store"));
    let stored = reopened
        .get(Collection::Registrations, "reg-1")
        .await
        .expect("get")
        .expect("registration present");
    assert_eq!(
        Value::Object(stored),
        json!({
            "userId": "u-jane",
            "eventId": "evt-cleanup",
            "answers": { "f1": "yes" },
            "mobile": "9876543210",
            "batch": "2023"
        })
    );

    let before = std::fs::read_to_string(&path).expect("read store");
    let second_job = ReconciliationJob::new(reopened);
    let second = second_job.run().await.expect("second run");
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(second_job.state(), JobState::Complete(second));
    assert_eq!(std::fs::read_to_string(&path).expect("read store"), before);
}
