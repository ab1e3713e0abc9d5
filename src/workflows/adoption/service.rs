use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::clock::Clock;
use super::domain::{
    Adopter, AdopterStatus, Announcement, AnnouncementStatus, Application, ApplicationId,
    ApplicationState, EntityKind, Pet, Shelter,
};
use super::error::WorkflowError;
use super::notifications::{NotificationDispatcher, StatusNotification};
use super::repository::{AcceptBatch, AdoptionStore, StoreError};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("apl-{id:06}"))
}

/// Application hydrated with the entities a response needs: the adopter plus
/// the announcement's pet and shelter.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetails {
    pub application: Application,
    pub adopter: Adopter,
    pub announcement: Announcement,
    pub pet: Pet,
    pub shelter: Shelter,
}

impl ApplicationDetails {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application.id.clone(),
            state: self.application.state.label(),
            announcement_id: self.announcement.id.clone(),
            announcement_status: self.announcement.status.label(),
            pet_name: self.pet.name.clone(),
            shelter_name: self.shelter.name.clone(),
        }
    }
}

/// Sanitized representation of an application's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub state: &'static str,
    pub announcement_id: super::domain::AnnouncementId,
    pub announcement_status: &'static str,
    pub pet_name: String,
    pub shelter_name: String,
}

/// The adoption-application state machine. Owns transitions of a single
/// application and the correlated announcement, including the accept
/// cascade. All preconditions are checked before any mutation; notifications
/// are queued during the transition and dispatched only after the store
/// commit succeeds.
pub struct AdoptionWorkflow<S, N> {
    store: Arc<S>,
    dispatcher: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<S, N> AdoptionWorkflow<S, N>
where
    S: AdoptionStore + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(store: Arc<S>, dispatcher: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            dispatcher,
            clock,
        }
    }

    /// Submit a new application for an announcement.
    ///
    /// A duplicate `(adopter, announcement)` pair is deliberately allowed so
    /// a withdrawn applicant can re-apply.
    pub fn create(
        &self,
        announcement_id: super::domain::AnnouncementId,
        adopter_id: super::domain::AdopterId,
    ) -> Result<ApplicationDetails, WorkflowError> {
        let adopter = self.load_adopter(&adopter_id)?;
        if adopter.status == AdopterStatus::Blocked {
            return Err(WorkflowError::invalid("Adopter is blocked"));
        }

        let announcement = self.load_announcement(&announcement_id)?;
        if announcement.status == AnnouncementStatus::Closed {
            return Err(WorkflowError::invalid("Announcement is closed"));
        }

        let now = self.clock.now();
        let application = Application {
            id: next_application_id(),
            announcement_id,
            adopter_id,
            state: ApplicationState::Created,
            creation_time: now,
            last_update_time: now,
        };

        self.store.insert_application(application.clone())?;
        self.hydrate(application)
    }

    /// Withdraw an application. Permitted from any state, including terminal
    /// ones; the calling layer owns the stricter rule if one is ever wanted.
    pub fn withdraw(&self, id: &ApplicationId) -> Result<ApplicationDetails, WorkflowError> {
        let mut application = self.load_application(id)?;
        application.state = ApplicationState::Withdrawn;
        application.last_update_time = self.clock.now();

        self.store.update_application(application.clone())?;

        let details = self.hydrate(application)?;
        self.dispatch_all(vec![status_notification(
            &details.adopter,
            ApplicationState::Withdrawn,
        )]);
        Ok(details)
    }

    /// Reject a pending application.
    pub fn reject(&self, id: &ApplicationId) -> Result<ApplicationDetails, WorkflowError> {
        let mut application = self.load_application(id)?;
        match application.state {
            ApplicationState::Withdrawn => {
                return Err(WorkflowError::invalid("Application was withdrawn"));
            }
            ApplicationState::Accepted => {
                return Err(WorkflowError::invalid("Application was accepted"));
            }
            ApplicationState::Created | ApplicationState::Rejected => {}
        }

        application.state = ApplicationState::Rejected;
        application.last_update_time = self.clock.now();

        self.store.update_application(application.clone())?;

        let details = self.hydrate(application)?;
        self.dispatch_all(vec![status_notification(
            &details.adopter,
            ApplicationState::Rejected,
        )]);
        Ok(details)
    }

    /// Accept an application: closes the announcement and rejects every
    /// other still-pending application on it, as one atomic unit. Requires
    /// the adopter to hold a verification grant from the announcement's
    /// shelter.
    pub fn accept(&self, id: &ApplicationId) -> Result<ApplicationDetails, WorkflowError> {
        let mut application = self.load_application(id)?;
        match application.state {
            ApplicationState::Withdrawn => {
                return Err(WorkflowError::invalid("Application was withdrawn"));
            }
            ApplicationState::Rejected => {
                return Err(WorkflowError::invalid("Application was rejected"));
            }
            ApplicationState::Created | ApplicationState::Accepted => {}
        }

        let mut announcement = self.load_announcement(&application.announcement_id)?;
        if announcement.status == AnnouncementStatus::Closed {
            return Err(WorkflowError::invalid("Announcement is closed"));
        }

        if !self
            .store
            .is_verified(&application.adopter_id, &announcement.shelter_id)?
        {
            return Err(WorkflowError::invalid("Adopter is not verified"));
        }

        let adopter = self
            .store
            .adopter(&application.adopter_id)?
            .ok_or_else(|| {
                WorkflowError::not_found(EntityKind::Adopter, &application.adopter_id)
            })?;

        let now = self.clock.now();
        application.state = ApplicationState::Accepted;
        application.last_update_time = now;

        announcement.status = AnnouncementStatus::Closed;
        announcement.closing_date = Some(now);
        announcement.last_update_date = now;

        let rejected: Vec<Application> = self
            .store
            .applications_for_announcement(&announcement.id)?
            .into_iter()
            .filter(|other| other.id != application.id && other.state == ApplicationState::Created)
            .map(|mut other| {
                other.state = ApplicationState::Rejected;
                other.last_update_time = now;
                other
            })
            .collect();

        let batch = AcceptBatch {
            accepted: application.clone(),
            announcement: announcement.clone(),
            rejected: rejected.clone(),
        };
        match self.store.commit_accept(batch) {
            Ok(()) => {}
            // A competing accept closed the announcement first.
            Err(StoreError::Conflict) => {
                return Err(WorkflowError::invalid("Announcement is closed"));
            }
            Err(other) => return Err(other.into()),
        }

        // Cascade committed; notifications use the pre-commit adopter read
        // and go out before hydration, which can still fail on its own.
        let mut notifications = Vec::with_capacity(rejected.len() + 1);
        notifications.push(status_notification(&adopter, ApplicationState::Accepted));
        for loser in &rejected {
            match self.store.adopter(&loser.adopter_id) {
                Ok(Some(adopter)) => {
                    notifications.push(status_notification(&adopter, ApplicationState::Rejected));
                }
                Ok(None) => {
                    warn!(adopter = %loser.adopter_id, "cascaded adopter missing, skipping notification");
                }
                Err(err) => {
                    warn!(error = %err, "adopter lookup failed, skipping notification");
                }
            }
        }
        self.dispatch_all(notifications);

        self.hydrate(application)
    }

    /// Fetch an application, hydrated, for read paths.
    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationDetails, WorkflowError> {
        let application = self.load_application(id)?;
        self.hydrate(application)
    }

    fn load_application(&self, id: &ApplicationId) -> Result<Application, WorkflowError> {
        self.store
            .application(id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Application, id))
    }

    fn load_adopter(
        &self,
        id: &super::domain::AdopterId,
    ) -> Result<Adopter, WorkflowError> {
        match self.store.adopter(id)? {
            Some(adopter) if adopter.status != AdopterStatus::Deleted => Ok(adopter),
            _ => Err(WorkflowError::not_found(EntityKind::Adopter, id)),
        }
    }

    fn load_announcement(
        &self,
        id: &super::domain::AnnouncementId,
    ) -> Result<Announcement, WorkflowError> {
        match self.store.announcement(id)? {
            Some(announcement) if announcement.status != AnnouncementStatus::Deleted => {
                Ok(announcement)
            }
            _ => Err(WorkflowError::not_found(EntityKind::Announcement, id)),
        }
    }

    fn hydrate(&self, application: Application) -> Result<ApplicationDetails, WorkflowError> {
        let adopter = self
            .store
            .adopter(&application.adopter_id)?
            .ok_or_else(|| {
                WorkflowError::not_found(EntityKind::Adopter, &application.adopter_id)
            })?;
        let announcement = self
            .store
            .announcement(&application.announcement_id)?
            .ok_or_else(|| {
                WorkflowError::not_found(EntityKind::Announcement, &application.announcement_id)
            })?;
        let pet = self
            .store
            .pet(&announcement.pet_id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Pet, &announcement.pet_id))?;
        let shelter = self
            .store
            .shelter(&announcement.shelter_id)?
            .ok_or_else(|| {
                WorkflowError::not_found(EntityKind::Shelter, &announcement.shelter_id)
            })?;

        Ok(ApplicationDetails {
            application,
            adopter,
            announcement,
            pet,
            shelter,
        })
    }

    /// Post-commit flush. Delivery failures never fail the transition that
    /// triggered them.
    fn dispatch_all(&self, notifications: Vec<StatusNotification>) {
        for notification in notifications {
            if let Err(err) = self.dispatcher.notify_status_change(notification) {
                warn!(error = %err, "status notification dropped");
            }
        }
    }
}

fn status_notification(adopter: &Adopter, state: ApplicationState) -> StatusNotification {
    StatusNotification {
        recipient_email: adopter.email.clone(),
        recipient_name: adopter.name.clone(),
        status_label: state.label(),
    }
}
