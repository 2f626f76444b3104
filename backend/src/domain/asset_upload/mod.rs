//! Image ingestion: validate a candidate file, resolve image host settings,
//! upload once, and hand back the public URL.
//!
//! Steps run in a fixed order and each may short-circuit: validation never
//! touches configuration, and neither failure reaches the network. There is
//! no automatic retry.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::domain::ports::{
    AssetTransport, AssetTransportError, AssetUploadRequest, UploadOverrideStore,
    UploadOverrideStoreError,
};

mod config;
mod gallery;

pub use config::{UploadConfig, UploadConfigSource, resolve_upload_config};
pub use gallery::{DEFAULT_MAX_IMAGES, ImageGallery, ImageSlot};

/// Largest accepted file, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Folder used when the caller does not choose one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl CandidateFile {
    /// Describe a file by name, declared MIME type and contents.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the contents in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Why an upload did not produce a URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The declared media type is not an image.
    #[error("unsupported media type {mime_type}; only image/* is accepted")]
    InvalidType {
        /// The rejected media type.
        mime_type: String,
    },
    /// The file exceeds [`MAX_UPLOAD_BYTES`].
    #[error("file is {size_bytes} bytes; the limit is {limit} bytes")]
    TooLarge {
        /// Size of the offered file in bytes.
        size_bytes: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },
    /// Neither configuration layer supplies the named settings.
    #[error("image host settings missing: {}", .missing.join(", "))]
    MissingConfiguration {
        /// Names of the missing settings.
        missing: Vec<&'static str>,
    },
    /// The image host refused the upload or could not be reached.
    #[error("upload rejected: {message}")]
    UploadRejected {
        /// Description of the failure.
        message: String,
    },
    /// The gallery already holds its maximum number of images.
    #[error("gallery already holds the maximum of {max} images")]
    GalleryFull {
        /// Maximum number of images in the gallery.
        max: usize,
    },
}

impl UploadError {
    /// Short message suitable for inline display next to the upload control.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::asset_upload::UploadError;
    ///
    /// let err = UploadError::UploadRejected { message: "Invalid preset".into() };
    /// assert_eq!(err.user_message(), "Invalid preset");
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidType { .. } => "Please select an image file".to_owned(),
            Self::TooLarge { .. } => "Image size should be less than 5MB".to_owned(),
            Self::MissingConfiguration { .. } => {
                "Image host settings missing. Configure the environment or the upload override."
                    .to_owned()
            }
            Self::UploadRejected { message } => message.clone(),
            Self::GalleryFull { max } => format!("At most {max} images can be attached"),
        }
    }
}

impl From<AssetTransportError> for UploadError {
    fn from(error: AssetTransportError) -> Self {
        let message = match error {
            AssetTransportError::Rejected { message } => message,
            other => other.to_string(),
        };
        Self::UploadRejected { message }
    }
}

/// Check media type then size.
///
/// # Errors
///
/// [`UploadError::InvalidType`] unless the media type starts with `image/`;
/// [`UploadError::TooLarge`] when the file exceeds [`MAX_UPLOAD_BYTES`].
pub fn validate_candidate(file: &CandidateFile) -> Result<(), UploadError> {
    if !file.mime_type().starts_with("image/") {
        return Err(UploadError::InvalidType {
            mime_type: file.mime_type().to_owned(),
        });
    }
    if file.size_bytes() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size_bytes: file.size_bytes(),
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Per-call upload options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConstraints {
    folder: Option<String>,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            folder: Some(DEFAULT_UPLOAD_FOLDER.to_owned()),
        }
    }
}

impl UploadConstraints {
    /// Upload into `folder`; a blank name uploads to the account root.
    #[must_use]
    pub fn with_folder(folder: impl Into<String>) -> Self {
        let name = folder.into();
        Self {
            folder: (!name.trim().is_empty()).then_some(name),
        }
    }

    /// Destination folder, or `None` for the account root.
    #[must_use]
    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }
}

/// Uploads validated images using layered image host settings.
pub struct AssetUploader {
    transport: Arc<dyn AssetTransport>,
    process_config: UploadConfigSource,
    overrides: Arc<dyn UploadOverrideStore>,
}

impl AssetUploader {
    /// `process_config` is the first configuration layer; `overrides`
    /// supplies the second and is consulted on every upload.
    #[must_use]
    pub fn new(
        transport: Arc<dyn AssetTransport>,
        process_config: UploadConfigSource,
        overrides: Arc<dyn UploadOverrideStore>,
    ) -> Self {
        Self {
            transport,
            process_config,
            overrides,
        }
    }

    /// Resolve the image host settings without uploading anything.
    ///
    /// An unreadable override is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// [`UploadError::MissingConfiguration`] when a field is absent from
    /// both layers.
    pub fn resolve_config(&self) -> Result<UploadConfig, UploadError> {
        let persisted = self.overrides.load().unwrap_or_else(|error| {
            warn!(error = %error, "ignoring unreadable upload override");
            UploadConfigSource::default()
        });
        resolve_upload_config(&self.process_config, &persisted)
    }

    /// Merge `update` into the persisted override and return the result.
    ///
    /// # Errors
    ///
    /// Propagates override store failures; nothing is written when the
    /// current override cannot be read.
    pub fn save_override(
        &self,
        update: UploadConfigSource,
    ) -> Result<UploadConfigSource, UploadOverrideStoreError> {
        let merged = self.overrides.load()?.merge(update);
        self.overrides.save(&merged)?;
        info!(
            cloud_account = merged.cloud_account.is_some(),
            upload_preset = merged.upload_preset.is_some(),
            "upload override saved"
        );
        Ok(merged)
    }

    /// Validate, resolve settings, then upload exactly once.
    ///
    /// # Errors
    ///
    /// Validation and configuration errors are returned before any request
    /// is made; transport failures surface as
    /// [`UploadError::UploadRejected`].
    pub async fn upload(
        &self,
        file: &CandidateFile,
        constraints: &UploadConstraints,
    ) -> Result<Url, UploadError> {
        validate_candidate(file)?;
        let config = self.resolve_config()?;

        let request = AssetUploadRequest {
            cloud_account: config.cloud_account().to_owned(),
            upload_preset: config.upload_preset().to_owned(),
            folder: constraints.folder().map(str::to_owned),
            file: file.clone(),
        };
        let url = self.transport.upload(&request).await.map_err(|error| {
            warn!(file = file.file_name(), error = %error, "image upload failed");
            UploadError::from(error)
        })?;
        info!(file = file.file_name(), bytes = file.size_bytes(), url = %url, "image uploaded");
        Ok(url)
    }
}
