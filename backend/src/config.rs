//! Console settings loaded via OrthoConfig.
//!
//! Values come from `ECOCLUB_*` environment variables or a configuration
//! file. The image host fields form the first layer of the upload settings;
//! the override file at [`ConsoleSettings::override_path`] is the second.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::asset_upload::{DEFAULT_UPLOAD_FOLDER, UploadConfigSource};
use crate::outbound::cloudinary::DEFAULT_UPLOAD_BASE_URL;

const DEFAULT_STORE_PATH: &str = "ecoclub-store.json";
const DEFAULT_OVERRIDE_PATH: &str = "ecoclub-upload-override.json";
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every console subcommand.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ECOCLUB")]
pub struct ConsoleSettings {
    /// Image host account name.
    pub cloud_account: Option<String>,
    /// Unsigned upload preset on that account.
    pub upload_preset: Option<String>,
    /// Image host API root; overridable for local testing.
    pub upload_base_url: Option<String>,
    /// Request timeout for uploads, in seconds.
    pub upload_timeout_secs: Option<u64>,
    /// Folder uploads land in.
    pub upload_folder: Option<String>,
    /// JSON snapshot backing the record store.
    pub store_path: Option<PathBuf>,
    /// JSON file holding the persisted upload override.
    pub override_path: Option<PathBuf>,
}

/// A configured URL that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid upload base URL {value:?}: {message}")]
pub struct InvalidBaseUrl {
    /// The configured value.
    pub value: String,
    /// Parser diagnostic.
    pub message: String,
}

impl ConsoleSettings {
    /// Process layer of the upload configuration.
    #[must_use]
    pub fn upload_source(&self) -> UploadConfigSource {
        UploadConfigSource::new(self.cloud_account.clone(), self.upload_preset.clone())
    }

    /// Image host API root, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// [`InvalidBaseUrl`] when the configured value is not an absolute URL.
    pub fn upload_base_url(&self) -> Result<Url, InvalidBaseUrl> {
        let raw = self
            .upload_base_url
            .as_deref()
            .unwrap_or(DEFAULT_UPLOAD_BASE_URL);
        Url::parse(raw).map_err(|error| InvalidBaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// Upload request timeout, 30 seconds by default.
    #[must_use]
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upload_timeout_secs
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        )
    }

    /// Destination folder for uploads.
    #[must_use]
    pub fn upload_folder(&self) -> &str {
        self.upload_folder
            .as_deref()
            .unwrap_or(DEFAULT_UPLOAD_FOLDER)
    }

    /// Location of the record store snapshot.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    /// Location of the upload override file.
    #[must_use]
    pub fn override_path(&self) -> PathBuf {
        self.override_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OVERRIDE_PATH))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for console settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "ECOCLUB_CLOUD_ACCOUNT",
        "ECOCLUB_UPLOAD_PRESET",
        "ECOCLUB_UPLOAD_BASE_URL",
        "ECOCLUB_UPLOAD_TIMEOUT_SECS",
        "ECOCLUB_UPLOAD_FOLDER",
        "ECOCLUB_STORE_PATH",
        "ECOCLUB_OVERRIDE_PATH",
    ];

    fn load_from_empty_args() -> ConsoleSettings {
        ConsoleSettings::load_from_iter([OsString::from("ecoclub-console")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.upload_source(), UploadConfigSource::default());
        assert_eq!(
            settings.upload_base_url().expect("default url").as_str(),
            DEFAULT_UPLOAD_BASE_URL
        );
        assert_eq!(settings.upload_folder(), DEFAULT_UPLOAD_FOLDER);
        assert_eq!(settings.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(
            settings.upload_timeout(),
            Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ECOCLUB_CLOUD_ACCOUNT", Some("eco-club".to_owned())),
            ("ECOCLUB_UPLOAD_PRESET", Some("unsigned".to_owned())),
            (
                "ECOCLUB_UPLOAD_BASE_URL",
                Some("http://127.0.0.1:9000/".to_owned()),
            ),
            ("ECOCLUB_UPLOAD_TIMEOUT_SECS", Some("5".to_owned())),
            ("ECOCLUB_UPLOAD_FOLDER", Some("events".to_owned())),
            ("ECOCLUB_STORE_PATH", Some("/tmp/store.json".to_owned())),
            ("ECOCLUB_OVERRIDE_PATH", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.cloud_account.as_deref(), Some("eco-club"));
        assert_eq!(settings.upload_source().upload_preset.as_deref(), Some("unsigned"));
        assert_eq!(
            settings.upload_base_url().expect("url").host_str(),
            Some("127.0.0.1")
        );
        assert_eq!(settings.upload_timeout(), Duration::from_secs(5));
        assert_eq!(settings.upload_folder(), "events");
        assert_eq!(settings.store_path(), PathBuf::from("/tmp/store.json"));
        assert_eq!(
            settings.override_path(),
            PathBuf::from(DEFAULT_OVERRIDE_PATH)
        );
    }

    #[rstest]
    fn malformed_base_url_is_reported() {
        let _guard = lock_env([("ECOCLUB_UPLOAD_BASE_URL", Some("not a url".to_owned()))]);

        let settings = load_from_empty_args();
        let err = settings.upload_base_url().expect_err("must fail");
        assert_eq!(err.value, "not a url");
    }
}
