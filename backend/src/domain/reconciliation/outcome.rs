//! Per-record outcomes and the three-way tally they fold into.

use crate::domain::ports::RecordStoreError;
use crate::domain::registration::{RegistrationDecodeError, RegistrationPatch};

/// Three-way classification of a processed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// A patch was written.
    Succeeded,
    /// Nothing needed or nothing to copy.
    Skipped,
    /// The record could not be processed.
    Failed,
}

/// Why a single registration could not be repaired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFailure {
    /// The registration references a member that does not exist.
    #[error("referenced user {user_id} does not exist")]
    OrphanedReference {
        /// The missing member's id.
        user_id: String,
    },
    /// The registration needs a lookup but carries no member reference.
    #[error("registration has no user reference")]
    MissingUserReference,
    /// The registration document itself is malformed.
    #[error(transparent)]
    Undecodable(RegistrationDecodeError),
    /// The contact fields of the referenced member are malformed.
    #[error("user {user_id} could not be decoded: {message}")]
    UndecodableUser {
        /// The member's id.
        user_id: String,
        /// Description of the decoding failure.
        message: String,
    },
    /// Reading the member or writing the patch failed.
    #[error(transparent)]
    Store(RecordStoreError),
}

/// Result of processing one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A patch was written.
    Repaired(RegistrationPatch),
    /// Both fields were already present; nothing was read or written.
    AlreadyComplete,
    /// The member lacks the missing fields too.
    NothingToCopy,
    /// Processing failed; the scan continues.
    Failed(RecordFailure),
}

impl RecordOutcome {
    /// Collapse the outcome into its tally bucket.
    #[must_use]
    pub fn class(&self) -> OutcomeClass {
        match self {
            Self::Repaired(_) => OutcomeClass::Succeeded,
            Self::AlreadyComplete | Self::NothingToCopy => OutcomeClass::Skipped,
            Self::Failed(_) => OutcomeClass::Failed,
        }
    }
}

/// Immutable succeeded/skipped/failed counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationTally {
    /// Registrations that received a patch.
    pub succeeded: usize,
    /// Registrations that needed nothing or had nothing to copy.
    pub skipped: usize,
    /// Registrations that could not be processed.
    pub failed: usize,
}

impl ReconciliationTally {
    /// Return a new tally with `class` counted once more.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::{OutcomeClass, ReconciliationTally};
    ///
    /// let tally = [OutcomeClass::Succeeded, OutcomeClass::Failed, OutcomeClass::Skipped]
    ///     .into_iter()
    ///     .fold(ReconciliationTally::default(), ReconciliationTally::record);
    /// assert_eq!(tally.total(), 3);
    /// assert_eq!(tally.failed, 1);
    /// ```
    #[must_use]
    pub const fn record(self, class: OutcomeClass) -> Self {
        match class {
            OutcomeClass::Succeeded => Self {
                succeeded: self.succeeded + 1,
                ..self
            },
            OutcomeClass::Skipped => Self {
                skipped: self.skipped + 1,
                ..self
            },
            OutcomeClass::Failed => Self {
                failed: self.failed + 1,
                ..self
            },
        }
    }

    /// Number of registrations processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}
