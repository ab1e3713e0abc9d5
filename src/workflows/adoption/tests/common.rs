use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::workflows::adoption::announcements::AnnouncementDirectory;
use crate::workflows::adoption::clock::FixedClock;
use crate::workflows::adoption::domain::{
    Adopter, AdopterId, AdopterStatus, Announcement, AnnouncementId, AnnouncementStatus, Pet,
    PetId, PetSex, PetStatus, PostalAddress, Shelter, ShelterId,
};
use crate::workflows::adoption::memory::{MemoryStore, RecordingDispatcher};
use crate::workflows::adoption::reports::ReportDesk;
use crate::workflows::adoption::service::AdoptionWorkflow;
use crate::workflows::adoption::verification::VerificationGate;

pub(super) fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid instant")
}

pub(super) struct Harness {
    pub(super) store: Arc<MemoryStore>,
    pub(super) dispatcher: Arc<RecordingDispatcher>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) workflow: AdoptionWorkflow<MemoryStore, RecordingDispatcher>,
    pub(super) directory: AnnouncementDirectory<MemoryStore>,
    pub(super) gate: VerificationGate<MemoryStore>,
    pub(super) reports: ReportDesk<MemoryStore>,
}

pub(super) fn harness() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let clock = Arc::new(FixedClock::new(frozen_now()));
    Harness {
        workflow: AdoptionWorkflow::new(store.clone(), dispatcher.clone(), clock.clone()),
        directory: AnnouncementDirectory::new(store.clone(), clock.clone()),
        gate: VerificationGate::new(store.clone(), clock.clone()),
        reports: ReportDesk::new(store.clone()),
        store,
        dispatcher,
        clock,
    }
}

pub(super) fn adopter(id: &str, name: &str) -> Adopter {
    Adopter {
        id: AdopterId(id.to_string()),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        phone: "555-0100".to_string(),
        address: PostalAddress {
            street: "8 Elm Street".to_string(),
            city: "Springfield".to_string(),
            postal_code: "62704".to_string(),
        },
        status: AdopterStatus::Active,
        deletion_time: None,
    }
}

pub(super) fn shelter(id: &str, name: &str, city: &str) -> Shelter {
    Shelter {
        id: ShelterId(id.to_string()),
        name: name.to_string(),
        email: format!("{}@example.org", id),
        phone: "555-0101".to_string(),
        address: PostalAddress {
            street: "14 Birch Lane".to_string(),
            city: city.to_string(),
            postal_code: "62701".to_string(),
        },
        is_authorized: Some(true),
    }
}

pub(super) fn pet(id: &str, shelter_id: &str, species: &str, breed: &str, birthday: NaiveDate) -> Pet {
    Pet {
        id: PetId(id.to_string()),
        shelter_id: ShelterId(shelter_id.to_string()),
        name: format!("pet {id}"),
        species: species.to_string(),
        breed: breed.to_string(),
        birthday,
        sex: PetSex::Female,
        status: PetStatus::Active,
    }
}

pub(super) fn announcement(
    id: &str,
    shelter_id: &str,
    pet_id: &str,
    status: AnnouncementStatus,
) -> Announcement {
    let now = frozen_now();
    Announcement {
        id: AnnouncementId(id.to_string()),
        shelter_id: ShelterId(shelter_id.to_string()),
        pet_id: PetId(pet_id.to_string()),
        title: format!("listing {id}"),
        description: "a pet looking for a home".to_string(),
        status,
        creation_date: now,
        closing_date: status.is_closed_like().then_some(now),
        last_update_date: now,
    }
}

pub(super) fn birthday(years_ago: i32) -> NaiveDate {
    let today = frozen_now().date_naive();
    NaiveDate::from_ymd_opt(today.year() - years_ago, today.month(), today.day())
        .expect("valid birthday")
}

/// Seed one shelter, one pet, one open announcement, and two active
/// adopters; the shape used by most state-machine tests.
pub(super) fn seed_open_listing(harness: &Harness) {
    harness
        .store
        .insert_shelter(shelter("shl-1", "Cedar Hollow Rescue", "Springfield"))
        .expect("seed shelter");
    harness
        .store
        .insert_pet(pet("pet-1", "shl-1", "Dog", "Labrador Retriever", birthday(3)))
        .expect("seed pet");
    harness
        .store
        .insert_announcement(announcement("ann-1", "shl-1", "pet-1", AnnouncementStatus::Open))
        .expect("seed announcement");
    harness
        .store
        .insert_adopter(adopter("adp-1", "Avery Quinn"))
        .expect("seed adopter");
    harness
        .store
        .insert_adopter(adopter("adp-2", "Morgan Lee"))
        .expect("seed adopter");
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn adp(id: &str) -> AdopterId {
    AdopterId(id.to_string())
}

pub(super) fn shl(id: &str) -> ShelterId {
    ShelterId(id.to_string())
}

pub(super) fn ann(id: &str) -> AnnouncementId {
    AnnouncementId(id.to_string())
}
