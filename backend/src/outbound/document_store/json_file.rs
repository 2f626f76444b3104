//! File-backed record store for operator tooling.
//!
//! The whole store lives in one JSON file. Reads are served from memory.
//! Every write is applied to a staged copy, the copy is written through a
//! temporary sibling and a rename, and only then does it replace the
//! in-memory state. A failed write leaves both memory and disk unchanged.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::fs::Dir;
use tracing::debug;

use super::memory::{InMemoryRecordStore, StoreSnapshot};
use crate::domain::ports::{Collection, Document, RecordStore, RecordStoreError, WriteOutcome};
use crate::outbound::local_fs::{open_parent, write_replacing};

/// Record store persisted as a JSON snapshot file.
pub struct JsonFileRecordStore {
    directory: Dir,
    file_name: PathBuf,
    display_path: PathBuf,
    inner: InMemoryRecordStore,
}

impl JsonFileRecordStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] when the parent directory
    /// cannot be opened or the file exists but is not a valid snapshot.
    pub fn open(path: &Path) -> Result<Self, RecordStoreError> {
        let (directory, file_name) = open_parent(path).map_err(|error| {
            RecordStoreError::unavailable(format!("open {}: {error}", path.display()))
        })?;

        let snapshot = match directory.read_to_string(&file_name) {
            Ok(contents) => serde_json::from_str::<StoreSnapshot>(&contents).map_err(|error| {
                RecordStoreError::unavailable(format!("parse {}: {error}", path.display()))
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(error) => {
                return Err(RecordStoreError::unavailable(format!(
                    "read {}: {error}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            directory,
            file_name,
            display_path: path.to_path_buf(),
            inner: InMemoryRecordStore::from_snapshot(snapshot),
        })
    }

    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), RecordStoreError> {
        let contents = serde_json::to_string_pretty(snapshot)
            .map_err(|error| RecordStoreError::write(format!("encode snapshot: {error}")))?;

        write_replacing(&self.directory, &self.file_name, contents.as_bytes()).map_err(
            |error| {
                RecordStoreError::write(format!("write {}: {error}", self.display_path.display()))
            },
        )?;
        debug!(path = %self.display_path.display(), "record store snapshot written");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, RecordStoreError> {
        self.inner.get_sync(collection, id)
    }

    async fn put(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<WriteOutcome, RecordStoreError> {
        self.inner
            .put_staged(collection, id, document, |staged| self.persist(staged))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), RecordStoreError> {
        self.inner
            .update_staged(collection, id, patch, |staged| self.persist(staged))
    }

    async fn scan_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, Document)>, RecordStoreError> {
        self.inner.scan_sync(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_survive_reopening() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("store.json");

        let store = JsonFileRecordStore::open(&path).expect("open empty");
        let serde_json::Value::Object(document) = json!({ "userId": "u-1" }) else {
            panic!("fixture must be an object");
        };
        store
            .put(Collection::Registrations, "reg-1", document)
            .await
            .expect("put");
        let serde_json::Value::Object(patch) = json!({ "batch": "2024" }) else {
            panic!("fixture must be an object");
        };
        store
            .update(Collection::Registrations, "reg-1", patch)
            .await
            .expect("update");

        let reopened = JsonFileRecordStore::open(&path).expect("reopen");
        let stored = reopened
            .get(Collection::Registrations, "reg-1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.get("batch"), Some(&json!("2024")));
        assert_eq!(stored.get("userId"), Some(&json!("u-1")));
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_unchanged() {
        let dir = TempDir::new().expect("temp dir");
        let data = dir.path().join("data");
        std::fs::create_dir(&data).expect("data dir");
        let store = JsonFileRecordStore::open(&data.join("store.json")).expect("open empty");
        let serde_json::Value::Object(document) = json!({ "userId": "u-1" }) else {
            panic!("fixture must be an object");
        };
        store
            .put(Collection::Registrations, "reg-1", document)
            .await
            .expect("put");
        std::fs::remove_dir_all(&data).expect("remove data dir");

        let serde_json::Value::Object(patch) = json!({ "batch": "2024" }) else {
            panic!("fixture must be an object");
        };
        let err = store
            .update(Collection::Registrations, "reg-1", patch)
            .await
            .expect_err("write must fail");
        let created = store
            .put(Collection::Registrations, "reg-2", Document::new())
            .await
            .expect_err("write must fail");

        assert!(matches!(err, RecordStoreError::Write { .. }));
        assert!(matches!(created, RecordStoreError::Write { .. }));
        let stored = store
            .get(Collection::Registrations, "reg-1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(serde_json::Value::Object(stored), json!({ "userId": "u-1" }));
        assert_eq!(
            store
                .get(Collection::Registrations, "reg-2")
                .await
                .expect("get"),
            None
        );
    }

    #[test]
    fn rejects_corrupt_snapshots() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"[not json").expect("write");

        let Err(err) = JsonFileRecordStore::open(&path) else {
            panic!("corrupt snapshot must not open");
        };
        assert!(matches!(err, RecordStoreError::Unavailable { .. }));
    }
}
