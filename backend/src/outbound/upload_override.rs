//! JSON file holding the locally persisted image host override.
//!
//! The file stores a single object, `{"cloudName": .., "uploadPreset": ..}`.
//! A missing file is an empty override.

use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::local_fs::{open_parent, write_replacing};
use crate::domain::asset_upload::UploadConfigSource;
use crate::domain::ports::{UploadOverrideStore, UploadOverrideStoreError};

/// Override store backed by one JSON file.
pub struct JsonFileUploadOverrideStore {
    path: PathBuf,
}

impl JsonFileUploadOverrideStore {
    /// Store the override at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UploadOverrideStore for JsonFileUploadOverrideStore {
    fn load(&self) -> Result<UploadConfigSource, UploadOverrideStoreError> {
        let read_error = |error: &dyn std::fmt::Display| {
            UploadOverrideStoreError::read(format!("{}: {error}", self.path.display()))
        };

        let (dir, file_name) = match open_parent(&self.path) {
            Ok(opened) => opened,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(UploadConfigSource::default());
            }
            Err(error) => return Err(read_error(&error)),
        };
        match dir.read_to_string(&file_name) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|error| read_error(&error)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Ok(UploadConfigSource::default())
            }
            Err(error) => Err(read_error(&error)),
        }
    }

    fn save(&self, source: &UploadConfigSource) -> Result<(), UploadOverrideStoreError> {
        let write_error = |error: &dyn std::fmt::Display| {
            UploadOverrideStoreError::write(format!("{}: {error}", self.path.display()))
        };

        let (dir, file_name) = open_parent(&self.path).map_err(|error| write_error(&error))?;
        let contents =
            serde_json::to_string_pretty(source).map_err(|error| write_error(&error))?;
        write_replacing(&dir, &file_name, contents.as_bytes())
            .map_err(|error| write_error(&error))?;
        debug!(path = %self.path.display(), "upload override written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_empty_override() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonFileUploadOverrideStore::new(dir.path().join("override.json"));

        assert_eq!(store.load(), Ok(UploadConfigSource::default()));
    }

    #[test]
    fn saved_override_uses_legacy_keys() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("override.json");
        let store = JsonFileUploadOverrideStore::new(&path);

        store
            .save(&UploadConfigSource::new(Some("club".to_owned()), None))
            .expect("save");

        let raw = std::fs::read_to_string(&path).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value, serde_json::json!({ "cloudName": "club" }));
        assert_eq!(
            store.load().expect("load").cloud_account.as_deref(),
            Some("club")
        );
    }

    #[test]
    fn malformed_file_is_a_read_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("override.json");
        std::fs::write(&path, "{ nope").expect("write");

        let err = JsonFileUploadOverrideStore::new(path)
            .load()
            .expect_err("malformed");
        assert!(matches!(err, UploadOverrideStoreError::Read { .. }));
    }
}
