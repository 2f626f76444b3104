//! Domain primitives, services and ports.
//!
//! Purpose: model club members and event registrations, and implement the
//! console's core operations over the driven ports in [`ports`]. Nothing in
//! this module performs I/O directly.
//!
//! Public surface:
//! - `UserRecord`, `UserId`, `Role`, `Badge`: member profile model.
//! - `RegistrationRecord`: an event registration and its backfill patch.
//! - `ReconciliationJob`: registration backfill with a three-way tally.
//! - [`directory_query`]: search, filter, sort, statistics and CSV export.
//! - [`asset_upload`]: image validation, layered settings and upload.
//! - `ProfileCompletionService`, `UserDirectory`, `SiteContentService`.

pub mod asset_upload;
pub mod directory_query;
pub mod ports;
pub mod profile_completion;
pub mod reconciliation;
pub mod registration;
pub mod site_content;
pub mod user;
pub mod user_directory;

pub use self::profile_completion::{
    ProfileCompletionError, ProfileCompletionService, ProfileSubmission, SignInIdentity,
};
pub use self::reconciliation::{
    JobState, OutcomeClass, ReconciliationError, ReconciliationJob, ReconciliationTally,
    RecordFailure, RecordOutcome, RepairDecision, decide_repair,
};
pub use self::registration::{
    MemberContact, RegistrationDecodeError, RegistrationPatch, RegistrationRecord,
};
pub use self::site_content::{
    BootstrapReport, SiteBootstrap, SiteContent, SiteContentPatch, SiteContentService,
    SocialLinks,
};
pub use self::user::{Badge, ParseRoleError, Role, UserId, UserRecord, UserValidationError};
pub use self::user_directory::{AdminProfileEdit, UserDirectory};
