//! Driven port over the hosted document database.
//!
//! The domain only needs four primitives: point reads, create-if-absent
//! writes, partial (merge) updates, and full collection scans. Filtering and
//! ordering always happen in memory, so no query pushdown is modelled here.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;

/// A schemaless JSON document as stored in a collection.
pub type Document = Map<String, Value>;

/// Collections the console reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Member profiles keyed by identity provider uid.
    Users,
    /// Event registrations referencing a member by `userId`.
    Registrations,
    /// Singleton site configuration documents.
    SiteContent,
}

impl Collection {
    /// Every collection, in storage order.
    pub const ALL: [Self; 3] = [Self::Users, Self::Registrations, Self::SiteContent];

    /// Stable collection name used by the backing store.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::ports::Collection;
    ///
    /// assert_eq!(Collection::Registrations.as_str(), "registrations");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Registrations => "registrations",
            Self::SiteContent => "site_content",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a create-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The document did not exist and was written.
    Created,
    /// A document already existed under that id and was left untouched.
    AlreadyPresent,
}

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordStoreError {
        /// The backing store could not be reached or read.
        Unavailable { message: String } =>
            "record store unavailable: {message}",
        /// A partial update targeted a document that does not exist.
        NotFound { collection: String, id: String } =>
            "document {collection}/{id} does not exist",
        /// A write was rejected by the backing store.
        Write { message: String } =>
            "record store write failed: {message}",
    }
}

/// Port for per-document access and collection scans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read one document, returning `None` when it does not exist.
    async fn get(&self, collection: Collection, id: &str)
    -> Result<Option<Document>, RecordStoreError>;

    /// Write `document` only when no document exists under `id`.
    async fn put(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<WriteOutcome, RecordStoreError>;

    /// Merge `patch` into an existing document, leaving other fields intact.
    ///
    /// Adapters must fail with [`RecordStoreError::NotFound`] instead of
    /// creating the document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<(), RecordStoreError>;

    /// Read every `(id, document)` pair in a collection.
    async fn scan_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, Document)>, RecordStoreError>;
}
