//! Adoption-application workflow engine.
//!
//! The state machine governing an adopter's application against a shelter's
//! announcement, the accept cascade, the verification gate, filtered
//! announcement search, and the pagination slicer. Storage and notification
//! delivery are collaborators behind traits; everything here is
//! request-scoped and commits through the store as one unit per operation.

pub mod announcements;
pub mod clock;
pub mod domain;
pub mod error;
pub mod memory;
pub mod notifications;
pub mod pagination;
pub mod reports;
pub mod repository;
pub mod retention;
pub mod router;
pub mod service;
pub mod verification;

#[cfg(test)]
mod tests;

pub use announcements::{
    AnnouncementCard, AnnouncementDirectory, AnnouncementFilter, AnnouncementPatch,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Adopter, AdopterId, AdopterStatus, Announcement, AnnouncementId, AnnouncementStatus,
    Application, ApplicationId, ApplicationState, EntityKind, Like, Pet, PetId, PetSex, PetStatus,
    PostalAddress, Report, ReportId, ReportState, ReportTarget, Shelter, ShelterId, Verification,
};
pub use error::WorkflowError;
pub use memory::{LogDispatcher, MemoryStore, RecordingDispatcher};
pub use notifications::{DispatchError, NotificationDispatcher, StatusNotification};
pub use pagination::{paginate, PageError, PageSlice};
pub use reports::{ReportDecision, ReportDesk};
pub use repository::{AcceptBatch, AdoptionStore, StoreError};
pub use retention::RetentionSweep;
pub use router::{adoption_router, AdoptionState};
pub use service::{AdoptionWorkflow, ApplicationDetails, ApplicationStatusView};
pub use verification::VerificationGate;
