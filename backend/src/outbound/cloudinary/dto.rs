//! DTOs for decoding image host upload responses.

use serde::Deserialize;

/// Body of a successful upload. Only the public URL is used.
#[derive(Debug, Deserialize)]
pub(super) struct UploadResponseDto {
    pub(super) secure_url: String,
}

/// Body of a refused upload.
#[derive(Debug, Default, Deserialize)]
pub(super) struct UploadErrorResponseDto {
    #[serde(default)]
    pub(super) error: Option<UploadErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadErrorDto {
    #[serde(default)]
    pub(super) message: Option<String>,
}

impl UploadErrorResponseDto {
    /// Provider message, if one was supplied and is not blank.
    pub(super) fn into_message(self) -> Option<String> {
        self.error
            .and_then(|error| error.message)
            .filter(|message| !message.trim().is_empty())
    }
}
