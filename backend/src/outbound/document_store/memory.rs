//! In-process record store.
//!
//! Collections are ordered maps so scans return documents in id order. The
//! file-backed adapter wraps this store and persists snapshots of it.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{Collection, Document, RecordStore, RecordStoreError, WriteOutcome};

/// Serialisable view of every collection, keyed by collection name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Member profiles by uid.
    #[serde(default)]
    pub users: BTreeMap<String, Document>,
    /// Event registrations by id.
    #[serde(default)]
    pub registrations: BTreeMap<String, Document>,
    /// Site content singleton.
    #[serde(default)]
    pub site_content: BTreeMap<String, Document>,
}

impl StoreSnapshot {
    fn collection(&self, collection: Collection) -> &BTreeMap<String, Document> {
        match collection {
            Collection::Users => &self.users,
            Collection::Registrations => &self.registrations,
            Collection::SiteContent => &self.site_content,
        }
    }

    fn collection_mut(&mut self, collection: Collection) -> &mut BTreeMap<String, Document> {
        match collection {
            Collection::Users => &mut self.users,
            Collection::Registrations => &mut self.registrations,
            Collection::SiteContent => &mut self.site_content,
        }
    }

    fn put(&mut self, collection: Collection, id: &str, document: Document) -> WriteOutcome {
        let documents = self.collection_mut(collection);
        if documents.contains_key(id) {
            return WriteOutcome::AlreadyPresent;
        }
        documents.insert(id.to_owned(), document);
        WriteOutcome::Created
    }

    fn update(
        &mut self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), RecordStoreError> {
        let existing = self
            .collection_mut(collection)
            .get_mut(id)
            .ok_or_else(|| RecordStoreError::not_found(collection.as_str(), id))?;
        existing.extend(patch);
        Ok(())
    }
}

/// Record store holding all documents in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    snapshot: Mutex<StoreSnapshot>,
}

impl InMemoryRecordStore {
    /// Build a store seeded from `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Insert or replace a document, bypassing create-if-absent semantics.
    ///
    /// Used for seeding; domain code goes through [`RecordStore`].
    pub fn insert(
        &self,
        collection: Collection,
        id: impl Into<String>,
        document: Document,
    ) -> Result<(), RecordStoreError> {
        self.lock()?
            .collection_mut(collection)
            .insert(id.into(), document);
        Ok(())
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot, RecordStoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>, RecordStoreError> {
        self.snapshot
            .lock()
            .map_err(|_| RecordStoreError::unavailable("in-memory store lock poisoned"))
    }

    pub(super) fn get_sync(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, RecordStoreError> {
        Ok(self.lock()?.collection(collection).get(id).cloned())
    }

    fn put_sync(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<WriteOutcome, RecordStoreError> {
        Ok(self.lock()?.put(collection, id, document))
    }

    fn update_sync(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), RecordStoreError> {
        self.lock()?.update(collection, id, patch)
    }

    /// Create `document` on a staged copy and keep it only if `commit` accepts
    /// the copy.
    pub(super) fn put_staged(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
        commit: impl FnOnce(&StoreSnapshot) -> Result<(), RecordStoreError>,
    ) -> Result<WriteOutcome, RecordStoreError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let outcome = staged.put(collection, id, document);
        if outcome == WriteOutcome::Created {
            commit(&staged)?;
            *guard = staged;
        }
        Ok(outcome)
    }

    /// Merge `patch` on a staged copy and keep it only if `commit` accepts
    /// the copy.
    pub(super) fn update_staged(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
        commit: impl FnOnce(&StoreSnapshot) -> Result<(), RecordStoreError>,
    ) -> Result<(), RecordStoreError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        staged.update(collection, id, patch)?;
        commit(&staged)?;
        *guard = staged;
        Ok(())
    }

    pub(super) fn scan_sync(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, Document)>, RecordStoreError> {
        Ok(self
            .lock()?
            .collection(collection)
            .iter()
            .map(|(id, document)| (id.clone(), document.clone()))
            .collect())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, RecordStoreError> {
        self.get_sync(collection, id)
    }

    async fn put(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<WriteOutcome, RecordStoreError> {
        self.put_sync(collection, id, document)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), RecordStoreError> {
        self.update_sync(collection, id, patch)
    }

    async fn scan_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, Document)>, RecordStoreError> {
        self.scan_sync(collection)
    }
}
