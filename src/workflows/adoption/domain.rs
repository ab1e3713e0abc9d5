use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered adopters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdopterId(pub String);

/// Identifier wrapper for shelters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShelterId(pub String);

/// Identifier wrapper for pets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(pub String);

/// Identifier wrapper for announcements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnouncementId(pub String);

/// Identifier wrapper for adoption applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for abuse reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl fmt::Display for AdopterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ShelterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity kinds referenced by not-found errors and report targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Adopter,
    Shelter,
    Pet,
    Announcement,
    Application,
    Report,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Adopter => "adopter",
            EntityKind::Shelter => "shelter",
            EntityKind::Pet => "pet",
            EntityKind::Announcement => "announcement",
            EntityKind::Application => "application",
            EntityKind::Report => "report",
        };
        f.write_str(label)
    }
}

/// Postal address shared by adopters and shelters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Lifecycle of an adopter account. Deletion is soft; the retention sweep
/// purges the record once the window expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdopterStatus {
    Active,
    Blocked,
    Deleted,
}

/// A registered adopter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adopter {
    pub id: AdopterId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: PostalAddress,
    pub status: AdopterStatus,
    pub deletion_time: Option<DateTime<Utc>>,
}

/// A registered shelter. `is_authorized` is `None` while the administrator
/// review is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: PostalAddress,
    pub is_authorized: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetSex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetStatus {
    Active,
    Deleted,
}

/// A pet owned by a shelter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub shelter_id: ShelterId,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub birthday: NaiveDate,
    pub sex: PetSex,
    pub status: PetStatus,
}

impl Pet {
    /// Whole-year age on the given date, birthday-aware: the year ticks on
    /// the anniversary of the birthday, not after 365 elapsed days.
    pub fn age_in_years(&self, on: NaiveDate) -> i32 {
        let mut age = on.year() - self.birthday.year();
        if (on.month(), on.day()) < (self.birthday.month(), self.birthday.day()) {
            age -= 1;
        }
        age
    }
}

/// Lifecycle of an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnouncementStatus {
    Open,
    Closed,
    DuringVerification,
    Deleted,
}

impl AnnouncementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AnnouncementStatus::Open => "open",
            AnnouncementStatus::Closed => "closed",
            AnnouncementStatus::DuringVerification => "during_verification",
            AnnouncementStatus::Deleted => "deleted",
        }
    }

    /// Statuses that carry a closing date. Invariant: `closing_date` is set
    /// iff the status is one of these.
    pub const fn is_closed_like(self) -> bool {
        matches!(
            self,
            AnnouncementStatus::Closed | AnnouncementStatus::Deleted
        )
    }
}

/// A shelter's listing advertising one pet for adoption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub shelter_id: ShelterId,
    pub pet_id: PetId,
    pub title: String,
    pub description: String,
    pub status: AnnouncementStatus,
    pub creation_date: DateTime<Utc>,
    pub closing_date: Option<DateTime<Utc>>,
    pub last_update_date: DateTime<Utc>,
}

/// State of an adoption application. `Created` is the only initial state;
/// the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationState {
    Created,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationState {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationState::Created => "created",
            ApplicationState::Accepted => "accepted",
            ApplicationState::Rejected => "rejected",
            ApplicationState::Withdrawn => "withdrawn",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationState::Created)
    }
}

/// An adopter's request to adopt the pet referenced by an announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub announcement_id: AnnouncementId,
    pub adopter_id: AdopterId,
    pub state: ApplicationState,
    pub creation_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
}

/// A one-way grant by a shelter clearing an adopter for acceptance.
/// Composite-keyed on `(adopter_id, shelter_id)`; never revoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub adopter_id: AdopterId,
    pub shelter_id: ShelterId,
    pub granted_at: DateTime<Utc>,
}

/// Existence-only interest marker toggled by an adopter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Like {
    pub adopter_id: AdopterId,
    pub announcement_id: AnnouncementId,
}

/// Target of an abuse report, dispatched with an explicit match rather than
/// reflection-style type lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReportTarget {
    Shelter(ShelterId),
    Adopter(AdopterId),
    Announcement(AnnouncementId),
}

impl ReportTarget {
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            ReportTarget::Shelter(_) => EntityKind::Shelter,
            ReportTarget::Adopter(_) => EntityKind::Adopter,
            ReportTarget::Announcement(_) => EntityKind::Announcement,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportState {
    New,
    Accepted,
    Declined,
}

/// A complaint filed against a shelter, adopter, or announcement. State is
/// advanced only by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub target: ReportTarget,
    pub message: String,
    pub state: ReportState,
}
