//! Member profile model.
//!
//! Profiles are stored as camelCase JSON documents in the `users` collection
//! keyed by the identity provider uid. Optional text fields treat an empty
//! string the same as an absent field, matching historical writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

use super::ports::Document;

/// Validation errors returned by [`UserId::new`] and document decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id is empty.
    EmptyId,
    /// The id carries surrounding whitespace.
    InvalidId,
    /// The stored document does not match the profile shape.
    UndecodableDocument {
        /// Description of the decoding failure.
        message: String,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::UndecodableDocument { message } => {
                write!(f, "user document could not be decoded: {message}")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable identifier issued by the identity provider.
///
/// The value is opaque; it is only checked for being non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::UserId;
    ///
    /// let id = UserId::new("G7xk2aQ").expect("valid uid");
    /// assert_eq!(id.as_ref(), "G7xk2aQ");
    /// assert!(UserId::new(" padded ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.into())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Member role. Transitions are administrator initiated only.
///
/// Stored lowercase; decoding accepts any case, like [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member.
    #[default]
    Student,
    /// Full administrative access.
    Admin,
    /// Club office holder.
    Secretary,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Role {
    /// Lowercase role label as stored in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Admin => "admin",
            Self::Secretary => "secretary",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Role`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'; expected student, admin, or secretary")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            "secretary" => Ok(Self::Secretary),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// An earned badge: a name and the glyph shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    #[serde(default)]
    name: String,
    #[serde(default)]
    emoji: String,
}

impl Badge {
    /// Build a badge value.
    #[must_use]
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// Badge name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Glyph displayed for the badge.
    #[must_use]
    pub fn emoji(&self) -> &str {
        self.emoji.as_str()
    }
}

/// Member profile.
///
/// ## Invariants
/// - `uid` never changes once the profile exists.
/// - `role` only changes through an administrator edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    uid: UserId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    batch: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    department: Option<String>,
    #[serde(default)]
    badges: Vec<Badge>,
    #[serde(default)]
    registered_events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
}

impl UserRecord {
    /// Build a student profile with no optional fields set.
    #[must_use]
    pub fn new(uid: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            email: email.into(),
            mobile: None,
            batch: None,
            role: Role::Student,
            department: None,
            badges: Vec::new(),
            registered_events: Vec::new(),
            avatar: None,
        }
    }

    /// Decode a stored document.
    ///
    /// Older documents omit `uid`; the document id is used in that case.
    pub fn from_document(id: &str, mut document: Document) -> Result<Self, UserValidationError> {
        if !document.contains_key("uid") {
            document.insert("uid".to_owned(), Value::String(id.to_owned()));
        }
        serde_json::from_value(Value::Object(document)).map_err(|err| {
            UserValidationError::UndecodableDocument {
                message: err.to_string(),
            }
        })
    }

    /// Encode the profile as a store document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct with string-keyed fields always serialises to an object.
            _ => Document::new(),
        }
    }

    /// Set the mobile number.
    #[must_use]
    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Set the batch (cohort) label.
    #[must_use]
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the department label.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Replace the earned badges.
    #[must_use]
    pub fn with_badges(mut self, badges: Vec<Badge>) -> Self {
        self.badges = badges;
        self
    }

    /// Replace the registered event identifiers.
    #[must_use]
    pub fn with_registered_events(mut self, events: Vec<String>) -> Self {
        self.registered_events = events;
        self
    }

    /// Set the avatar seed.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Identity provider uid.
    #[must_use]
    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
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

    /// Current role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Department label, or `None` when absent or empty.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        non_empty(self.department.as_deref())
    }

    /// Earned badges.
    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Identifiers of events the member registered for.
    #[must_use]
    pub fn registered_events(&self) -> &[String] {
        &self.registered_events
    }

    /// Avatar seed, or `None` when absent or empty.
    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        non_empty(self.avatar.as_deref())
    }
}

/// Treat an empty string like a missing value.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
