//! First sign-in profile completion.
//!
//! The identity provider only supplies a uid, a display name and an email.
//! Before a member can use the console they must provide a mobile number
//! and a batch year; this service validates that submission and creates the
//! profile exactly once.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::info;

use crate::domain::ports::{Collection, RecordStore, RecordStoreError, WriteOutcome};
use crate::domain::user::{UserId, UserRecord};

/// Avatar seed used when the member does not pick one.
pub const DEFAULT_AVATAR: &str = "eco1";

static BATCH_RE: OnceLock<Regex> = OnceLock::new();
static MOBILE_RE: OnceLock<Regex> = OnceLock::new();

fn batch_regex() -> &'static Regex {
    BATCH_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}$")
            .unwrap_or_else(|error| panic!("batch regex failed to compile: {error}"))
    })
}

fn mobile_regex() -> &'static Regex {
    MOBILE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{10}$")
            .unwrap_or_else(|error| panic!("mobile regex failed to compile: {error}"))
    })
}

/// Identity asserted by the provider at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInIdentity {
    /// Provider uid.
    pub uid: UserId,
    /// Name the provider reports, if any.
    pub display_name: Option<String>,
    /// Email the provider reports, if any.
    pub email: Option<String>,
}

/// Details collected from a member completing their profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSubmission {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Ten-digit mobile number.
    pub mobile: String,
    /// Four-digit batch year.
    pub batch: String,
    /// Avatar seed; the default seed is used when absent.
    pub avatar: Option<String>,
}

impl ProfileSubmission {
    /// Prefill name and email from the provider identity.
    #[must_use]
    pub fn prefilled(identity: &SignInIdentity) -> Self {
        Self {
            name: identity.display_name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Why a submission or profile creation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileCompletionError {
    /// Name is blank.
    #[error("name is required")]
    MissingName,
    /// Email is blank.
    #[error("email is required")]
    MissingEmail,
    /// Batch is not four digits.
    #[error("batch must be a 4-digit year (e.g., 2022)")]
    InvalidBatch,
    /// Mobile is not ten digits.
    #[error("mobile number must be 10 digits")]
    InvalidMobile,
    /// The profile could not be read or written.
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

impl ProfileSubmission {
    /// Trim and validate, producing the profile to store for `uid`.
    ///
    /// Batch is checked before mobile.
    ///
    /// # Errors
    ///
    /// The first failing field as a [`ProfileCompletionError`].
    pub fn validate(&self, uid: UserId) -> Result<UserRecord, ProfileCompletionError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let batch = self.batch.trim();
        let mobile = self.mobile.trim();

        if name.is_empty() {
            return Err(ProfileCompletionError::MissingName);
        }
        if email.is_empty() {
            return Err(ProfileCompletionError::MissingEmail);
        }
        if !batch_regex().is_match(batch) {
            return Err(ProfileCompletionError::InvalidBatch);
        }
        if !mobile_regex().is_match(mobile) {
            return Err(ProfileCompletionError::InvalidMobile);
        }

        let avatar = self
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|avatar| !avatar.is_empty())
            .unwrap_or(DEFAULT_AVATAR);
        Ok(UserRecord::new(uid, name, email)
            .with_mobile(mobile)
            .with_batch(batch)
            .with_avatar(avatar))
    }
}

/// Creates member profiles on first sign-in.
pub struct ProfileCompletionService {
    store: Arc<dyn RecordStore>,
}

impl ProfileCompletionService {
    /// Service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Whether `uid` still needs to complete a profile.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn needs_completion(&self, uid: &UserId) -> Result<bool, RecordStoreError> {
        Ok(self
            .store
            .get(Collection::Users, uid.as_ref())
            .await?
            .is_none())
    }

    /// Validate `submission` and create the profile if none exists yet.
    ///
    /// Returns the outcome of the create-if-absent write; an existing
    /// profile is never replaced.
    ///
    /// # Errors
    ///
    /// Validation failures are returned before any write is attempted.
    pub async fn complete(
        &self,
        uid: UserId,
        submission: &ProfileSubmission,
    ) -> Result<WriteOutcome, ProfileCompletionError> {
        let profile = submission.validate(uid)?;
        let outcome = self
            .store
            .put(
                Collection::Users,
                profile.uid().as_ref(),
                profile.to_document(),
            )
            .await?;
        info!(user = %profile.uid(), outcome = ?outcome, "profile completion recorded");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockRecordStore;
    use crate::domain::user::Role;
    use crate::outbound::document_store::InMemoryRecordStore;
    use rstest::rstest;

    fn submission() -> ProfileSubmission {
        ProfileSubmission {
            name: " Jane Doe ".to_owned(),
            email: "jane@x.org".to_owned(),
            mobile: "9876543210".to_owned(),
            batch: "2023".to_owned(),
            avatar: None,
        }
    }

    fn uid() -> UserId {
        UserId::new("u-1").expect("uid")
    }

    #[rstest]
    #[case::short_batch("23", "9876543210", ProfileCompletionError::InvalidBatch)]
    #[case::letters_in_batch("20x3", "9876543210", ProfileCompletionError::InvalidBatch)]
    #[case::short_mobile("2023", "98765", ProfileCompletionError::InvalidMobile)]
    #[case::long_mobile("2023", "98765432101", ProfileCompletionError::InvalidMobile)]
    #[case::batch_checked_first("x", "y", ProfileCompletionError::InvalidBatch)]
    fn malformed_fields_are_rejected(
        #[case] batch: &str,
        #[case] mobile: &str,
        #[case] expected: ProfileCompletionError,
    ) {
        let submission = ProfileSubmission {
            batch: batch.to_owned(),
            mobile: mobile.to_owned(),
            ..submission()
        };
        assert_eq!(submission.validate(uid()), Err(expected));
    }

    #[test]
    fn blank_name_is_rejected() {
        let submission = ProfileSubmission {
            name: "   ".to_owned(),
            ..submission()
        };
        assert_eq!(
            submission.validate(uid()),
            Err(ProfileCompletionError::MissingName)
        );
    }

    #[test]
    fn prefill_copies_provider_identity() {
        let identity = SignInIdentity {
            uid: uid(),
            display_name: Some("Jane".to_owned()),
            email: None,
        };
        let prefilled = ProfileSubmission::prefilled(&identity);
        assert_eq!(prefilled.name, "Jane");
        assert!(prefilled.email.is_empty());
    }

    #[tokio::test]
    async fn invalid_submission_never_writes() {
        let mut store = MockRecordStore::new();
        store.expect_put().never();
        let service = ProfileCompletionService::new(Arc::new(store));
        let submission = ProfileSubmission {
            mobile: "123".to_owned(),
            ..submission()
        };

        let err = service
            .complete(uid(), &submission)
            .await
            .expect_err("invalid");

        assert_eq!(err, ProfileCompletionError::InvalidMobile);
    }

    #[tokio::test]
    async fn completion_creates_a_student_once() {
        let store = Arc::new(InMemoryRecordStore::default());
        let service = ProfileCompletionService::new(store.clone());
        assert!(service.needs_completion(&uid()).await.expect("lookup"));

        let first = service.complete(uid(), &submission()).await.expect("create");
        let again = ProfileSubmission {
            name: "Someone Else".to_owned(),
            ..submission()
        };
        let second = service.complete(uid(), &again).await.expect("repeat");

        assert_eq!(first, WriteOutcome::Created);
        assert_eq!(second, WriteOutcome::AlreadyPresent);
        assert!(!service.needs_completion(&uid()).await.expect("lookup"));
        let stored = store
            .get(Collection::Users, "u-1")
            .await
            .expect("get")
            .expect("present");
        let user = UserRecord::from_document("u-1", stored).expect("decode");
        assert_eq!(user.name(), "Jane Doe");
        assert_eq!(user.role(), Role::Student);
        assert_eq!(user.avatar(), Some(DEFAULT_AVATAR));
        assert!(user.badges().is_empty());
    }
}
