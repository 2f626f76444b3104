//! Registration backfill job.
//!
//! The job scans every registration, looks up the referenced member, and
//! copies `mobile`/`batch` into registrations that lack them. It is safe to
//! re-run: complete registrations are never written and existing values are
//! never overwritten.
//!
//! Records are processed strictly one after another. There is no locking;
//! an administrator editing the same empty field while the job runs may see
//! their edit replaced by the backfilled value. That race is accepted.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::domain::ports::{Collection, Document, RecordStore, RecordStoreError};
use crate::domain::registration::{MemberContact, RegistrationPatch, RegistrationRecord};

mod outcome;

pub use outcome::{OutcomeClass, ReconciliationTally, RecordFailure, RecordOutcome};

/// Lifecycle of a job instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobState {
    /// Not started yet.
    #[default]
    Idle,
    /// A scan is in progress.
    Running,
    /// The last run finished; individual records may still have failed.
    Complete(ReconciliationTally),
    /// The last run could not scan registrations at all.
    Error(String),
}

/// Job-level failure. Per-record problems never surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconciliationError {
    /// The registrations collection could not be read.
    #[error("registrations could not be scanned: {0}")]
    StoreUnavailable(#[source] RecordStoreError),
}

/// What to do with one registration, decided without any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairDecision {
    /// Both fields are already populated.
    AlreadyComplete,
    /// The referenced member does not exist.
    Orphaned,
    /// The member has nothing to contribute.
    NothingToCopy,
    /// Apply this partial update.
    Apply(RegistrationPatch),
}

/// Decide how to handle `registration` given the member it references.
///
/// `member` is only consulted when the registration needs repair; callers
/// may pass `None` for complete registrations without a lookup.
///
/// # Examples
/// ```
/// use ecoclub_console::domain::{RegistrationRecord, RepairDecision, decide_repair};
///
/// let registration = RegistrationRecord::new("r1", Some("ghost".to_owned()), None, None);
/// assert_eq!(decide_repair(&registration, None), RepairDecision::Orphaned);
/// ```
#[must_use]
pub fn decide_repair(
    registration: &RegistrationRecord,
    member: Option<&MemberContact>,
) -> RepairDecision {
    if !registration.needs_repair() {
        return RepairDecision::AlreadyComplete;
    }
    let Some(member) = member else {
        return RepairDecision::Orphaned;
    };
    let patch = registration.backfill_from(member);
    if patch.is_empty() {
        RepairDecision::NothingToCopy
    } else {
        RepairDecision::Apply(patch)
    }
}

/// Sequential, best-effort registration backfill.
pub struct ReconciliationJob {
    store: Arc<dyn RecordStore>,
    state: Mutex<JobState>,
}

impl ReconciliationJob {
    /// Build a job over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            state: Mutex::new(JobState::Idle),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Scan and repair every registration, returning the outcome tally.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::StoreUnavailable`] only when the
    /// registrations collection cannot be scanned. Failures on individual
    /// records are counted in the tally instead.
    pub async fn run(&self) -> Result<ReconciliationTally, ReconciliationError> {
        self.set_state(JobState::Running);

        let scanned = match self.store.scan_all(Collection::Registrations).await {
            Ok(scanned) => scanned,
            Err(error) => {
                warn!(error = %error, "registration scan failed");
                self.set_state(JobState::Error(error.to_string()));
                return Err(ReconciliationError::StoreUnavailable(error));
            }
        };
        info!(registrations = scanned.len(), "registration backfill started");

        let tally = stream::iter(scanned)
            .fold(ReconciliationTally::default(), |tally, (id, document)| async move {
                let outcome = self.process(&id, document).await;
                log_outcome(&id, &outcome);
                tally.record(outcome.class())
            })
            .await;

        info!(
            succeeded = tally.succeeded,
            skipped = tally.skipped,
            failed = tally.failed,
            "registration backfill complete"
        );
        self.set_state(JobState::Complete(tally));
        Ok(tally)
    }

    async fn process(&self, id: &str, document: Document) -> RecordOutcome {
        let registration = match RegistrationRecord::from_document(id, document) {
            Ok(registration) => registration,
            Err(error) => return RecordOutcome::Failed(RecordFailure::Undecodable(error)),
        };
        if !registration.needs_repair() {
            return RecordOutcome::AlreadyComplete;
        }
        let Some(user_ref) = registration.user_ref() else {
            return RecordOutcome::Failed(RecordFailure::MissingUserReference);
        };

        let member = match self.fetch_member(user_ref).await {
            Ok(member) => member,
            Err(failure) => return RecordOutcome::Failed(failure),
        };

        match decide_repair(&registration, member.as_ref()) {
            RepairDecision::AlreadyComplete => RecordOutcome::AlreadyComplete,
            RepairDecision::NothingToCopy => RecordOutcome::NothingToCopy,
            RepairDecision::Orphaned => {
                RecordOutcome::Failed(RecordFailure::OrphanedReference {
                    user_id: user_ref.to_owned(),
                })
            }
            RepairDecision::Apply(patch) => self.apply(&registration, patch).await,
        }
    }

    async fn fetch_member(&self, user_ref: &str) -> Result<Option<MemberContact>, RecordFailure> {
        let document = self
            .store
            .get(Collection::Users, user_ref)
            .await
            .map_err(RecordFailure::Store)?;
        document
            .map(|document| {
                MemberContact::from_document(user_ref, document).map_err(|error| {
                    RecordFailure::UndecodableUser {
                        user_id: user_ref.to_owned(),
                        message: error.message,
                    }
                })
            })
            .transpose()
    }

    async fn apply(
        &self,
        registration: &RegistrationRecord,
        patch: RegistrationPatch,
    ) -> RecordOutcome {
        match self
            .store
            .update(
                Collection::Registrations,
                registration.id(),
                patch.to_document(),
            )
            .await
        {
            Ok(()) => RecordOutcome::Repaired(patch),
            Err(error) => RecordOutcome::Failed(RecordFailure::Store(error)),
        }
    }

    fn set_state(&self, state: JobState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

fn log_outcome(id: &str, outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Repaired(patch) => {
            info!(registration = id, fields = ?patch.field_names(), "registration backfilled");
        }
        RecordOutcome::AlreadyComplete | RecordOutcome::NothingToCopy => {}
        RecordOutcome::Failed(failure) => {
            warn!(registration = id, error = %failure, "registration backfill failed");
        }
    }
}

#[cfg(test)]
mod tests;
