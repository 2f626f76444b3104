//! Driven port for the locally persisted image host override.

use super::define_port_error;
use crate::domain::asset_upload::UploadConfigSource;

define_port_error! {
    /// Errors raised while reading or writing the override.
    pub enum UploadOverrideStoreError {
        /// The override exists but could not be read or parsed.
        Read { message: String } =>
            "upload override could not be read: {message}",
        /// The override could not be written.
        Write { message: String } =>
            "upload override could not be written: {message}",
    }
}

/// Key-value override consulted after process configuration.
#[cfg_attr(test, mockall::automock)]
pub trait UploadOverrideStore: Send + Sync {
    /// Load the stored override; a missing override is an empty source.
    fn load(&self) -> Result<UploadConfigSource, UploadOverrideStoreError>;

    /// Replace the stored override.
    fn save(&self, source: &UploadConfigSource) -> Result<(), UploadOverrideStoreError>;
}

/// Override store that never holds a value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUploadOverride;

impl UploadOverrideStore for NoUploadOverride {
    fn load(&self) -> Result<UploadConfigSource, UploadOverrideStoreError> {
        Ok(UploadConfigSource::default())
    }

    fn save(&self, _source: &UploadConfigSource) -> Result<(), UploadOverrideStoreError> {
        Err(UploadOverrideStoreError::write(
            "no override store is configured",
        ))
    }
}
