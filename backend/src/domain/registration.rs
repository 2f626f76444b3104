//! Event registration records and the backfill patch applied to them.
//!
//! Registrations carry denormalised copies of the member's `mobile` and
//! `batch`. Historical writes left those copies empty on some documents; the
//! reconciliation job fills them from the member profile without ever
//! overwriting a value that is already present.

use serde::Deserialize;
use serde_json::Value;

use super::ports::Document;
use super::user::non_empty;

/// Error raised when a registration or member document cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document {id} could not be decoded: {message}")]
pub struct RegistrationDecodeError {
    /// Document id of the offending record.
    pub id: String,
    /// Decoder diagnostic.
    pub message: String,
}

/// The slice of a registration document the console reasons about.
///
/// Other fields (event id, form answers, timestamps) stay in the store and
/// are never rewritten because repairs use partial updates. The member
/// reference is kept as stored; it is only needed when a repair requires a
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    id: String,
    user_ref: Option<String>,
    mobile: Option<String>,
    batch: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationDto {
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    batch: Option<String>,
}

impl RegistrationRecord {
    /// Build a registration from its parts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        user_ref: Option<String>,
        mobile: Option<String>,
        batch: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_ref,
            mobile,
            batch,
        }
    }

    /// Decode a stored registration document.
    ///
    /// A `userId` that is absent or not a string leaves the record without a
    /// member reference; that only matters once a repair needs a lookup.
    ///
    /// # Errors
    ///
    /// [`RegistrationDecodeError`] when `mobile` or `batch` hold something
    /// other than a string.
    pub fn from_document(id: &str, document: Document) -> Result<Self, RegistrationDecodeError> {
        let dto: RegistrationDto = decode(id, document)?;
        let user_ref = match dto.user_id {
            Some(Value::String(user_ref)) => Some(user_ref),
            _ => None,
        };
        Ok(Self::new(id, user_ref, dto.mobile, dto.batch))
    }

    /// Store id of the registration document.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Referenced member uid, or `None` when absent or empty.
    #[must_use]
    pub fn user_ref(&self) -> Option<&str> {
        non_empty(self.user_ref.as_deref())
    }

    /// Mobile copy, or `None` when absent or empty.
    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        non_empty(self.mobile.as_deref())
    }

    /// Batch copy, or `None` when absent or empty.
    #[must_use]
    pub fn batch(&self) -> Option<&str> {
        non_empty(self.batch.as_deref())
    }

    /// True when either denormalised field is missing.
    #[must_use]
    pub fn needs_repair(&self) -> bool {
        self.mobile().is_none() || self.batch().is_none()
    }

    /// Compute the minimal backfill from `member`.
    ///
    /// Only fields that are missing here and present on the member are copied.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::{MemberContact, RegistrationRecord};
    ///
    /// let registration = RegistrationRecord::new(
    ///     "r1",
    ///     Some("u1".to_owned()),
    ///     Some("1112223334".to_owned()),
    ///     None,
    /// );
    /// let member = MemberContact::new(Some("9998887776".to_owned()), Some("2023".to_owned()));
    ///
    /// let patch = registration.backfill_from(&member);
    /// assert_eq!(patch.mobile(), None);
    /// assert_eq!(patch.batch(), Some("2023"));
    /// ```
    #[must_use]
    pub fn backfill_from(&self, member: &MemberContact) -> RegistrationPatch {
        RegistrationPatch {
            mobile: fill_gap(self.mobile(), member.mobile()),
            batch: fill_gap(self.batch(), member.batch()),
        }
    }
}

/// The member fields a registration copies.
///
/// Decoded leniently from a `users` document: every other field, including
/// role and badges, is ignored so that profile drift elsewhere never blocks
/// a backfill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemberContact {
    mobile: Option<String>,
    batch: Option<String>,
}

impl MemberContact {
    /// Build a contact view from its parts.
    #[must_use]
    pub const fn new(mobile: Option<String>, batch: Option<String>) -> Self {
        Self { mobile, batch }
    }

    /// Decode the contact fields of a member document.
    ///
    /// # Errors
    ///
    /// [`RegistrationDecodeError`] when `mobile` or `batch` hold something
    /// other than a string.
    pub fn from_document(id: &str, document: Document) -> Result<Self, RegistrationDecodeError> {
        decode(id, document)
    }

    /// Mobile number, or `None` when absent or empty.
    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        non_empty(self.mobile.as_deref())
    }

    /// Batch label, or `None` when absent or empty.
    #[must_use]
    pub fn batch(&self) -> Option<&str> {
        non_empty(self.batch.as_deref())
    }
}

fn decode<T>(id: &str, document: Document) -> Result<T, RegistrationDecodeError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(Value::Object(document)).map_err(|err| RegistrationDecodeError {
        id: id.to_owned(),
        message: err.to_string(),
    })
}

fn fill_gap(current: Option<&str>, authoritative: Option<&str>) -> Option<String> {
    match current {
        Some(_) => None,
        None => authoritative.map(str::to_owned),
    }
}

/// Fields to merge into a registration. Never contains empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationPatch {
    mobile: Option<String>,
    batch: Option<String>,
}

impl RegistrationPatch {
    /// True when there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mobile.is_none() && self.batch.is_none()
    }

    /// Mobile value to write, if any.
    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }

    /// Batch value to write, if any.
    #[must_use]
    pub fn batch(&self) -> Option<&str> {
        self.batch.as_deref()
    }

    /// Names of the fields carried by this patch, for logging.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            self.mobile.as_ref().map(|_| "mobile"),
            self.batch.as_ref().map(|_| "batch"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Render the patch as a partial-update document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        if let Some(mobile) = &self.mobile {
            document.insert("mobile".to_owned(), Value::String(mobile.clone()));
        }
        if let Some(batch) = &self.batch {
            document.insert("batch".to_owned(), Value::String(batch.clone()));
        }
        document
    }
}
