use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    Adopter, AdopterId, AdopterStatus, Announcement, AnnouncementId, AnnouncementStatus,
    Application, ApplicationId, Like, Pet, PetId, Report, ReportId, Shelter, ShelterId,
    Verification,
};
use super::notifications::{DispatchError, NotificationDispatcher, StatusNotification};
use super::repository::{AcceptBatch, AdoptionStore, StoreError};

#[derive(Default)]
struct MemoryInner {
    adopters: HashMap<AdopterId, Adopter>,
    shelters: HashMap<ShelterId, Shelter>,
    pets: HashMap<PetId, Pet>,
    announcements: HashMap<AnnouncementId, Announcement>,
    applications: HashMap<ApplicationId, Application>,
    verifications: HashSet<(AdopterId, ShelterId)>,
    likes: HashSet<Like>,
    reports: HashMap<ReportId, Report>,
}

/// In-memory entity store. A single mutex over all collections gives each
/// trait call (including the accept batch) transaction semantics; fine for
/// the demo binary and tests, swapped for a relational adapter in
/// deployment.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn insert_adopter(&self, adopter: Adopter) -> Result<(), StoreError> {
        self.lock()?.adopters.insert(adopter.id.clone(), adopter);
        Ok(())
    }

    pub fn insert_shelter(&self, shelter: Shelter) -> Result<(), StoreError> {
        self.lock()?.shelters.insert(shelter.id.clone(), shelter);
        Ok(())
    }

    pub fn insert_pet(&self, pet: Pet) -> Result<(), StoreError> {
        self.lock()?.pets.insert(pet.id.clone(), pet);
        Ok(())
    }

    pub fn insert_announcement(&self, announcement: Announcement) -> Result<(), StoreError> {
        self.lock()?
            .announcements
            .insert(announcement.id.clone(), announcement);
        Ok(())
    }

    pub fn adopter_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.adopters.len())
    }
}

impl AdoptionStore for MemoryStore {
    fn adopter(&self, id: &AdopterId) -> Result<Option<Adopter>, StoreError> {
        Ok(self.lock()?.adopters.get(id).cloned())
    }

    fn shelter(&self, id: &ShelterId) -> Result<Option<Shelter>, StoreError> {
        Ok(self.lock()?.shelters.get(id).cloned())
    }

    fn pet(&self, id: &PetId) -> Result<Option<Pet>, StoreError> {
        Ok(self.lock()?.pets.get(id).cloned())
    }

    fn announcement(&self, id: &AnnouncementId) -> Result<Option<Announcement>, StoreError> {
        Ok(self.lock()?.announcements.get(id).cloned())
    }

    fn announcements(&self) -> Result<Vec<Announcement>, StoreError> {
        let inner = self.lock()?;
        let mut all: Vec<Announcement> = inner.announcements.values().cloned().collect();
        // Stable order across repeated calls.
        all.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(all)
    }

    fn update_announcement(&self, announcement: Announcement) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.announcements.contains_key(&announcement.id) {
            return Err(StoreError::NotFound);
        }
        inner
            .announcements
            .insert(announcement.id.clone(), announcement);
        Ok(())
    }

    fn application(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.lock()?.applications.get(id).cloned())
    }

    fn applications_for_announcement(
        &self,
        id: &AnnouncementId,
    ) -> Result<Vec<Application>, StoreError> {
        let inner = self.lock()?;
        let mut matching: Vec<Application> = inner
            .applications
            .values()
            .filter(|application| &application.announcement_id == id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(matching)
    }

    fn insert_application(&self, application: Application) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.applications.contains_key(&application.id) {
            return Err(StoreError::Conflict);
        }
        inner
            .applications
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn update_application(&self, application: Application) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.applications.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        inner
            .applications
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn commit_accept(&self, batch: AcceptBatch) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        // Optimistic re-check under the lock: the losing racer of two
        // concurrent accepts observes the announcement already closed.
        match inner.announcements.get(&batch.announcement.id) {
            Some(current) if current.status == AnnouncementStatus::Open => {}
            Some(_) => return Err(StoreError::Conflict),
            None => return Err(StoreError::NotFound),
        }
        if !inner.applications.contains_key(&batch.accepted.id) {
            return Err(StoreError::NotFound);
        }

        inner
            .announcements
            .insert(batch.announcement.id.clone(), batch.announcement);
        inner
            .applications
            .insert(batch.accepted.id.clone(), batch.accepted);
        for rejected in batch.rejected {
            inner.applications.insert(rejected.id.clone(), rejected);
        }
        Ok(())
    }

    fn is_verified(&self, adopter: &AdopterId, shelter: &ShelterId) -> Result<bool, StoreError> {
        let key = (adopter.clone(), shelter.clone());
        Ok(self.lock()?.verifications.contains(&key))
    }

    fn insert_verification(&self, verification: Verification) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let inserted = inner
            .verifications
            .insert((verification.adopter_id, verification.shelter_id));
        if inserted {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    fn is_liked(
        &self,
        adopter: &AdopterId,
        announcement: &AnnouncementId,
    ) -> Result<bool, StoreError> {
        let like = Like {
            adopter_id: adopter.clone(),
            announcement_id: announcement.clone(),
        };
        Ok(self.lock()?.likes.contains(&like))
    }

    fn set_like(&self, like: Like) -> Result<(), StoreError> {
        self.lock()?.likes.insert(like);
        Ok(())
    }

    fn clear_like(
        &self,
        adopter: &AdopterId,
        announcement: &AnnouncementId,
    ) -> Result<(), StoreError> {
        let like = Like {
            adopter_id: adopter.clone(),
            announcement_id: announcement.clone(),
        };
        self.lock()?.likes.remove(&like);
        Ok(())
    }

    fn report(&self, id: &ReportId) -> Result<Option<Report>, StoreError> {
        Ok(self.lock()?.reports.get(id).cloned())
    }

    fn insert_report(&self, report: Report) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.reports.contains_key(&report.id) {
            return Err(StoreError::Conflict);
        }
        inner.reports.insert(report.id.clone(), report);
        Ok(())
    }

    fn update_report(&self, report: Report) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.reports.contains_key(&report.id) {
            return Err(StoreError::NotFound);
        }
        inner.reports.insert(report.id.clone(), report);
        Ok(())
    }

    fn purge_deleted_adopters(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<AdopterId>, StoreError> {
        let mut inner = self.lock()?;
        let expired: Vec<AdopterId> = inner
            .adopters
            .values()
            .filter(|adopter| {
                adopter.status == AdopterStatus::Deleted
                    && adopter.deletion_time.is_some_and(|deleted| deleted <= cutoff)
            })
            .map(|adopter| adopter.id.clone())
            .collect();
        for id in &expired {
            inner.adopters.remove(id);
        }
        Ok(expired)
    }
}

/// Dispatcher that records every notification; used by tests and the demo
/// transcript.
#[derive(Default, Clone)]
pub struct RecordingDispatcher {
    events: Arc<Mutex<Vec<StatusNotification>>>,
}

impl RecordingDispatcher {
    pub fn events(&self) -> Vec<StatusNotification> {
        self.events.lock().expect("dispatcher mutex poisoned").clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify_status_change(&self, notification: StatusNotification) -> Result<(), DispatchError> {
        self.events
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Dispatcher that only logs; stands in for the e-mail adapter when the
/// server runs without one configured.
#[derive(Default, Clone, Copy)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn notify_status_change(&self, notification: StatusNotification) -> Result<(), DispatchError> {
        info!(
            recipient = %notification.recipient_email,
            status = notification.status_label,
            "status-change notification"
        );
        Ok(())
    }
}
