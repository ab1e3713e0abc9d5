use chrono::{DateTime, Utc};

use super::domain::{
    Adopter, AdopterId, Announcement, AnnouncementId, Application, ApplicationId, Like, Pet, PetId,
    Report, ReportId, Shelter, ShelterId, Verification,
};

/// Everything the accept cascade writes, handed to the store as one unit so
/// either all of it commits or none of it does.
#[derive(Debug, Clone)]
pub struct AcceptBatch {
    pub accepted: Application,
    pub announcement: Announcement,
    pub rejected: Vec<Application>,
}

/// Transactional entity store backing the adoption workflow. Implementations
/// must provide at least read-committed isolation; `commit_accept` carries
/// the optimistic re-check that serializes competing cascades.
pub trait AdoptionStore: Send + Sync {
    fn adopter(&self, id: &AdopterId) -> Result<Option<Adopter>, StoreError>;
    fn shelter(&self, id: &ShelterId) -> Result<Option<Shelter>, StoreError>;
    fn pet(&self, id: &PetId) -> Result<Option<Pet>, StoreError>;

    fn announcement(&self, id: &AnnouncementId) -> Result<Option<Announcement>, StoreError>;
    fn announcements(&self) -> Result<Vec<Announcement>, StoreError>;
    fn update_announcement(&self, announcement: Announcement) -> Result<(), StoreError>;

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;
    fn applications_for_announcement(
        &self,
        id: &AnnouncementId,
    ) -> Result<Vec<Application>, StoreError>;
    fn insert_application(&self, application: Application) -> Result<(), StoreError>;
    fn update_application(&self, application: Application) -> Result<(), StoreError>;

    /// Apply the accept cascade atomically. Must fail with
    /// [`StoreError::Conflict`] when the announcement is no longer `Open`,
    /// so that only one of two racing accepts can commit.
    fn commit_accept(&self, batch: AcceptBatch) -> Result<(), StoreError>;

    fn is_verified(&self, adopter: &AdopterId, shelter: &ShelterId) -> Result<bool, StoreError>;
    /// Insert a verification fact; fails with [`StoreError::Conflict`] on a
    /// duplicate grant.
    fn insert_verification(&self, verification: Verification) -> Result<(), StoreError>;

    fn is_liked(&self, adopter: &AdopterId, announcement: &AnnouncementId)
        -> Result<bool, StoreError>;
    fn set_like(&self, like: Like) -> Result<(), StoreError>;
    fn clear_like(
        &self,
        adopter: &AdopterId,
        announcement: &AnnouncementId,
    ) -> Result<(), StoreError>;

    fn report(&self, id: &ReportId) -> Result<Option<Report>, StoreError>;
    fn insert_report(&self, report: Report) -> Result<(), StoreError>;
    fn update_report(&self, report: Report) -> Result<(), StoreError>;

    /// Purge adopters soft-deleted before the cutoff, as one transaction.
    /// Returns the ids that were removed; idempotent across repeated passes.
    fn purge_deleted_adopters(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<AdopterId>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists or was concurrently modified")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
