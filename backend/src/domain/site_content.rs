//! Public site content and first-run bootstrap.
//!
//! The content lives in one singleton document, `site_content/main`. It is
//! written in full only when absent; afterwards only the fields an
//! administrator changes are merged in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::domain::ports::{Collection, Document, RecordStore, RecordStoreError, WriteOutcome};
use crate::domain::user::{Role, UserId};
use crate::domain::user_directory::{AdminProfileEdit, UserDirectory};

/// Document id of the singleton.
pub const SITE_CONTENT_ID: &str = "main";

/// Links shown in the site footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    /// Community chat invite link.
    #[serde(default)]
    pub whatsapp: String,
    /// Club profile link.
    #[serde(default)]
    pub instagram: String,
}

/// Editable copy and imagery for the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    /// Headline on the landing page.
    #[serde(default)]
    pub hero_title: String,
    /// Line under the headline.
    #[serde(default)]
    pub hero_subtitle: String,
    /// Club history section.
    #[serde(default)]
    pub history: String,
    /// Mission statement.
    #[serde(default)]
    pub mission: String,
    /// Footer links.
    #[serde(default)]
    pub social_links: SocialLinks,
    /// Hero background image URL.
    #[serde(default)]
    pub background_image: String,
    /// Favicon URL.
    #[serde(default)]
    pub favicon: String,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero_title: "Eco Club".to_owned(),
            hero_subtitle: "Students working together for a greener campus".to_owned(),
            history: String::new(),
            mission: "Protect, restore and celebrate the environment around us.".to_owned(),
            social_links: SocialLinks::default(),
            background_image: String::new(),
            favicon: String::new(),
        }
    }
}

impl SiteContent {
    fn to_document(&self) -> Result<Document, RecordStoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(RecordStoreError::write("site content is not an object")),
            Err(error) => Err(RecordStoreError::write(error.to_string())),
        }
    }
}

/// Fields to change on the site content; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContentPatch {
    /// Replacement headline on the landing page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    /// Replacement line under the headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    /// Replacement club history section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    /// Replacement mission statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    /// Replacement footer links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    /// Replacement hero background image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Replacement favicon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl SiteContentPatch {
    fn to_document(&self) -> Result<Document, RecordStoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(RecordStoreError::write("site content patch is not an object")),
            Err(error) => Err(RecordStoreError::write(error.to_string())),
        }
    }
}

/// Reads and writes the site content singleton.
#[derive(Clone)]
pub struct SiteContentService {
    store: Arc<dyn RecordStore>,
}

impl SiteContentService {
    /// Service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Current content, or `None` before initialisation.
    ///
    /// # Errors
    ///
    /// Store failures, or a stored document that does not decode.
    pub async fn load(&self) -> Result<Option<SiteContent>, RecordStoreError> {
        self.store
            .get(Collection::SiteContent, SITE_CONTENT_ID)
            .await?
            .map(|document| {
                serde_json::from_value(Value::Object(document)).map_err(|error| {
                    RecordStoreError::unavailable(format!("site content undecodable: {error}"))
                })
            })
            .transpose()
    }

    /// Write the default content unless a document already exists.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn ensure_initialised(&self) -> Result<WriteOutcome, RecordStoreError> {
        let outcome = self
            .store
            .put(
                Collection::SiteContent,
                SITE_CONTENT_ID,
                SiteContent::default().to_document()?,
            )
            .await?;
        if outcome == WriteOutcome::Created {
            info!("site content initialised");
        }
        Ok(outcome)
    }

    /// Merge the fields set on `patch`.
    ///
    /// # Errors
    ///
    /// [`RecordStoreError::NotFound`] before initialisation.
    pub async fn apply_patch(&self, patch: &SiteContentPatch) -> Result<(), RecordStoreError> {
        let document = patch.to_document()?;
        if document.is_empty() {
            return Ok(());
        }
        let fields: Vec<&str> = document.keys().map(String::as_str).collect();
        info!(fields = ?fields, "site content updated");
        self.store
            .update(Collection::SiteContent, SITE_CONTENT_ID, document)
            .await
    }
}

/// What a bootstrap run changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Whether default content was written by this run.
    pub content_initialised: bool,
}

/// First-run setup: promote the operator and make sure content exists.
pub struct SiteBootstrap {
    users: UserDirectory,
    content: SiteContentService,
}

impl SiteBootstrap {
    /// Bootstrap over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            users: UserDirectory::new(store.clone()),
            content: SiteContentService::new(store),
        }
    }

    /// Promote `operator` to admin, then initialise site content if absent.
    ///
    /// # Errors
    ///
    /// [`RecordStoreError::NotFound`] when the operator has no profile; the
    /// content is not touched in that case.
    pub async fn run(&self, operator: &UserId) -> Result<BootstrapReport, RecordStoreError> {
        let promotion = AdminProfileEdit {
            role: Some(Role::Admin),
            ..AdminProfileEdit::default()
        };
        self.users.apply_admin_edit(operator, &promotion).await?;
        let outcome = self.content.ensure_initialised().await?;
        Ok(BootstrapReport {
            content_initialised: outcome == WriteOutcome::Created,
        })
    }
}
