//! Driven port for the external image host.
//!
//! One call is one multipart upload. Adapters translate provider responses
//! into a public URL or a typed rejection; they never retry.

use async_trait::async_trait;
use url::Url;

use super::define_port_error;
use crate::domain::asset_upload::CandidateFile;

/// Everything the image host needs for one unsigned upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUploadRequest {
    /// Storage account the upload is addressed to.
    pub cloud_account: String,
    /// Unsigned upload preset configured on the account.
    pub upload_preset: String,
    /// Optional destination folder.
    pub folder: Option<String>,
    /// The validated file.
    pub file: CandidateFile,
}

define_port_error! {
    /// Errors raised by image host adapters.
    pub enum AssetTransportError {
        /// The host answered with a non-success status.
        Rejected { message: String } =>
            "{message}",
        /// The request could not be sent or the response could not be read.
        Transport { message: String } =>
            "image host request failed: {message}",
        /// The host answered successfully but the body was unusable.
        Decode { message: String } =>
            "image host response could not be decoded: {message}",
    }
}

/// Port for uploading one asset and receiving its public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetTransport: Send + Sync {
    /// Upload the file described by `request`.
    async fn upload(&self, request: &AssetUploadRequest) -> Result<Url, AssetTransportError>;
}
