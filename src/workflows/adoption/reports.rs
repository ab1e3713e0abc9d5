use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use super::domain::{
    AnnouncementStatus, EntityKind, Report, ReportId, ReportState, ReportTarget,
};
use super::error::WorkflowError;
use super::repository::AdoptionStore;

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

/// Administrator decision on a filed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDecision {
    Accepted,
    Declined,
}

/// Intake and moderation of abuse reports. Reports target a shelter,
/// adopter, or announcement; the existence check dispatches over the target
/// variants explicitly.
pub struct ReportDesk<S> {
    store: Arc<S>,
}

impl<S> ReportDesk<S>
where
    S: AdoptionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// File a report against an existing, non-deleted target.
    pub fn file(&self, target: ReportTarget, message: String) -> Result<Report, WorkflowError> {
        let exists = match &target {
            ReportTarget::Shelter(id) => self.store.shelter(id)?.is_some(),
            ReportTarget::Adopter(id) => self
                .store
                .adopter(id)?
                .is_some_and(|a| a.status != super::domain::AdopterStatus::Deleted),
            ReportTarget::Announcement(id) => self
                .store
                .announcement(id)?
                .is_some_and(|a| a.status != AnnouncementStatus::Deleted),
        };
        if !exists {
            let id = match &target {
                ReportTarget::Shelter(id) => id.to_string(),
                ReportTarget::Adopter(id) => id.to_string(),
                ReportTarget::Announcement(id) => id.to_string(),
            };
            return Err(WorkflowError::NotFound {
                entity: target.entity_kind(),
                id,
            });
        }

        let report = Report {
            id: next_report_id(),
            target,
            message,
            state: ReportState::New,
        };
        self.store.insert_report(report.clone())?;
        Ok(report)
    }

    /// Advance a report out of `New`. Double resolution is rejected.
    pub fn resolve(
        &self,
        id: &ReportId,
        decision: ReportDecision,
    ) -> Result<Report, WorkflowError> {
        let mut report = self
            .store
            .report(id)?
            .ok_or_else(|| WorkflowError::not_found(EntityKind::Report, id))?;

        if report.state != ReportState::New {
            return Err(WorkflowError::invalid("Report was already resolved"));
        }

        report.state = match decision {
            ReportDecision::Accepted => ReportState::Accepted,
            ReportDecision::Declined => ReportState::Declined,
        };
        self.store.update_report(report.clone())?;
        Ok(report)
    }
}
