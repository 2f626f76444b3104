//! Layered image host configuration.
//!
//! Two sources are consulted field by field: process configuration first,
//! then the locally persisted override. Blank values count as absent.

use serde::{Deserialize, Serialize};

use super::UploadError;

/// One layer of image host settings; any field may be absent.
///
/// Serialises with the key names the override file has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfigSource {
    /// Image host account name.
    #[serde(rename = "cloudName", default, skip_serializing_if = "Option::is_none")]
    pub cloud_account: Option<String>,
    /// Unsigned upload preset.
    #[serde(rename = "uploadPreset", default, skip_serializing_if = "Option::is_none")]
    pub upload_preset: Option<String>,
}

impl UploadConfigSource {
    /// Build a source from optional values.
    #[must_use]
    pub fn new(cloud_account: Option<String>, upload_preset: Option<String>) -> Self {
        Self {
            cloud_account,
            upload_preset,
        }
    }

    /// Overlay `update` onto `self`.
    ///
    /// Fields `update` leaves unset are kept; a field set to a blank value is
    /// cleared.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::asset_upload::UploadConfigSource;
    ///
    /// let stored = UploadConfigSource::new(Some("club".into()), Some("old".into()));
    /// let merged = stored.merge(UploadConfigSource::new(None, Some(String::new())));
    /// assert_eq!(merged.cloud_account.as_deref(), Some("club"));
    /// assert_eq!(merged.upload_preset, None);
    /// ```
    #[must_use]
    pub fn merge(self, update: Self) -> Self {
        Self {
            cloud_account: present(update.cloud_account.or(self.cloud_account)),
            upload_preset: present(update.upload_preset.or(self.upload_preset)),
        }
    }
}

/// Fully resolved image host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    cloud_account: String,
    upload_preset: String,
}

impl UploadConfig {
    /// Image host account name.
    #[must_use]
    pub fn cloud_account(&self) -> &str {
        &self.cloud_account
    }

    /// Unsigned upload preset.
    #[must_use]
    pub fn upload_preset(&self) -> &str {
        &self.upload_preset
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Resolve each field from `process`, falling back to `persisted`.
///
/// # Errors
///
/// Returns [`UploadError::MissingConfiguration`] naming every field that
/// neither layer supplies.
pub fn resolve_upload_config(
    process: &UploadConfigSource,
    persisted: &UploadConfigSource,
) -> Result<UploadConfig, UploadError> {
    let cloud_account = present(process.cloud_account.clone())
        .or_else(|| present(persisted.cloud_account.clone()));
    let upload_preset = present(process.upload_preset.clone())
        .or_else(|| present(persisted.upload_preset.clone()));

    match (cloud_account, upload_preset) {
        (Some(cloud_account), Some(upload_preset)) => Ok(UploadConfig {
            cloud_account,
            upload_preset,
        }),
        (cloud_account, upload_preset) => {
            let mut missing = Vec::new();
            if cloud_account.is_none() {
                missing.push("cloud account");
            }
            if upload_preset.is_none() {
                missing.push("upload preset");
            }
            Err(UploadError::MissingConfiguration { missing })
        }
    }
}
