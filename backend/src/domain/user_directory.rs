//! Member directory loading and administrative profile edits.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::ports::{Collection, Document, RecordStore, RecordStoreError};
use crate::domain::user::{Role, UserId, UserRecord};

/// Read and administer member profiles through the record store.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
}

impl UserDirectory {
    /// Directory over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Load every member profile.
    ///
    /// Documents that do not decode are logged and left out of the listing.
    ///
    /// # Errors
    ///
    /// Propagates a failed collection scan.
    pub async fn load_all(&self) -> Result<Vec<UserRecord>, RecordStoreError> {
        let scanned = self.store.scan_all(Collection::Users).await?;
        let scanned_count = scanned.len();
        let users: Vec<UserRecord> = scanned
            .into_iter()
            .filter_map(|(id, document)| match UserRecord::from_document(&id, document) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(user = %id, error = %error, "skipping undecodable user");
                    None
                }
            })
            .collect();
        debug!(scanned = scanned_count, loaded = users.len(), "user directory loaded");
        Ok(users)
    }

    /// Fetch one member, or `None` when absent or undecodable.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn find(&self, uid: &UserId) -> Result<Option<UserRecord>, RecordStoreError> {
        let Some(document) = self.store.get(Collection::Users, uid.as_ref()).await? else {
            return Ok(None);
        };
        match UserRecord::from_document(uid.as_ref(), document) {
            Ok(user) => Ok(Some(user)),
            Err(error) => {
                warn!(user = %uid, error = %error, "stored user could not be decoded");
                Ok(None)
            }
        }
    }

    /// Merge `edit` into the member's profile.
    ///
    /// Empty edits are a no-op. The uid is never written.
    ///
    /// # Errors
    ///
    /// [`RecordStoreError::NotFound`] when the member does not exist, or any
    /// other store failure.
    pub async fn apply_admin_edit(
        &self,
        uid: &UserId,
        edit: &AdminProfileEdit,
    ) -> Result<(), RecordStoreError> {
        if edit.is_empty() {
            return Ok(());
        }
        self.store
            .update(Collection::Users, uid.as_ref(), edit.to_document())
            .await?;
        info!(user = %uid, fields = ?edit.field_names(), "user profile edited");
        Ok(())
    }
}

/// Fields an administrator may change on a member profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProfileEdit {
    /// New display name.
    pub name: Option<String>,
    /// New mobile number.
    pub mobile: Option<String>,
    /// New batch label.
    pub batch: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New department label.
    pub department: Option<String>,
}

impl AdminProfileEdit {
    /// True when the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Document field names this edit writes.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("mobile", self.mobile.is_some()),
            ("batch", self.batch.is_some()),
            ("role", self.role.is_some()),
            ("department", self.department.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }

    /// Partial update document holding only the edited fields.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        let texts = [
            ("name", &self.name),
            ("mobile", &self.mobile),
            ("batch", &self.batch),
            ("department", &self.department),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                document.insert(field.to_owned(), Value::String(value.clone()));
            }
        }
        if let Some(role) = self.role {
            document.insert("role".to_owned(), Value::String(role.as_str().to_owned()));
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockRecordStore;
    use crate::outbound::document_store::InMemoryRecordStore;
    use serde_json::json;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[tokio::test]
    async fn listing_skips_undecodable_users() {
        let store = InMemoryRecordStore::default();
        store
            .insert(
                Collection::Users,
                "u-1",
                document(json!({ "name": "Jane", "email": "j@x.org" })),
            )
            .expect("seed");
        store
            .insert(
                Collection::Users,
                "u-2",
                document(json!({ "name": "Odd", "email": "o@x.org", "role": "overlord" })),
            )
            .expect("seed");
        let directory = UserDirectory::new(Arc::new(store));

        let users = directory.load_all().await.expect("load");

        assert_eq!(users.len(), 1);
        assert_eq!(users.first().map(UserRecord::name), Some("Jane"));
    }

    #[tokio::test]
    async fn admin_edit_changes_only_named_fields() {
        let store = Arc::new(InMemoryRecordStore::default());
        store
            .insert(
                Collection::Users,
                "u-1",
                document(json!({ "name": "Jane", "email": "j@x.org", "batch": "2023" })),
            )
            .expect("seed");
        let directory = UserDirectory::new(store.clone());
        let uid = UserId::new("u-1").expect("uid");
        let edit = AdminProfileEdit {
            role: Some(Role::Secretary),
            department: Some("Chemistry".to_owned()),
            ..AdminProfileEdit::default()
        };

        directory.apply_admin_edit(&uid, &edit).await.expect("edit");

        let user = directory.find(&uid).await.expect("find").expect("present");
        assert_eq!(user.role(), Role::Secretary);
        assert_eq!(user.department(), Some("Chemistry"));
        assert_eq!(user.batch(), Some("2023"));
        assert_eq!(user.email(), "j@x.org");
    }

    #[tokio::test]
    async fn editing_a_missing_user_fails() {
        let directory = UserDirectory::new(Arc::new(InMemoryRecordStore::default()));
        let edit = AdminProfileEdit {
            name: Some("Ghost".to_owned()),
            ..AdminProfileEdit::default()
        };

        let err = directory
            .apply_admin_edit(&UserId::new("ghost").expect("uid"), &edit)
            .await
            .expect_err("missing user");

        assert_eq!(err, RecordStoreError::not_found("users", "ghost"));
    }

    #[tokio::test]
    async fn empty_edit_writes_nothing() {
        let mut store = MockRecordStore::new();
        store.expect_update().never();
        let directory = UserDirectory::new(Arc::new(store));

        directory
            .apply_admin_edit(&UserId::new("u-1").expect("uid"), &AdminProfileEdit::default())
            .await
            .expect("no-op");
    }
}
