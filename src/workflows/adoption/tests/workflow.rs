use chrono::Duration;

use super::common::*;
use crate::workflows::adoption::clock::Clock;
use crate::workflows::adoption::domain::{
    AnnouncementStatus, ApplicationState, EntityKind,
};
use crate::workflows::adoption::error::WorkflowError;
use crate::workflows::adoption::repository::AdoptionStore;

#[test]
fn create_rejects_missing_adopter() {
    let h = harness();
    seed_open_listing(&h);

    match h.workflow.create(ann("ann-1"), adp("ghost")) {
        Err(WorkflowError::NotFound { entity, id }) => {
            assert_eq!(entity, EntityKind::Adopter);
            assert_eq!(id, "ghost");
        }
        other => panic!("expected adopter not found, got {other:?}"),
    }
}

#[test]
fn create_treats_deleted_adopter_as_missing() {
    let h = harness();
    seed_open_listing(&h);
    let mut deleted = adopter("adp-9", "Gone Person");
    deleted.status = crate::workflows::adoption::domain::AdopterStatus::Deleted;
    deleted.deletion_time = Some(frozen_now());
    h.store.insert_adopter(deleted).expect("seed adopter");

    match h.workflow.create(ann("ann-1"), adp("adp-9")) {
        Err(WorkflowError::NotFound { entity, .. }) => assert_eq!(entity, EntityKind::Adopter),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn create_rejects_blocked_adopter() {
    let h = harness();
    seed_open_listing(&h);
    let mut blocked = adopter("adp-9", "Blocked Person");
    blocked.status = crate::workflows::adoption::domain::AdopterStatus::Blocked;
    h.store.insert_adopter(blocked).expect("seed adopter");

    match h.workflow.create(ann("ann-1"), adp("adp-9")) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Adopter is blocked");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }
}

#[test]
fn create_rejects_closed_announcement() {
    let h = harness();
    seed_open_listing(&h);
    h.store
        .insert_announcement(announcement("ann-2", "shl-1", "pet-1", AnnouncementStatus::Closed))
        .expect("seed announcement");

    match h.workflow.create(ann("ann-2"), adp("adp-1")) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Announcement is closed");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }
}

#[test]
fn create_treats_deleted_announcement_as_missing() {
    let h = harness();
    seed_open_listing(&h);
    h.store
        .insert_announcement(announcement("ann-2", "shl-1", "pet-1", AnnouncementStatus::Deleted))
        .expect("seed announcement");

    match h.workflow.create(ann("ann-2"), adp("adp-1")) {
        Err(WorkflowError::NotFound { entity, .. }) => {
            assert_eq!(entity, EntityKind::Announcement);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn create_stamps_equal_timestamps_and_hydrates() {
    let h = harness();
    seed_open_listing(&h);

    let details = h
        .workflow
        .create(ann("ann-1"), adp("adp-1"))
        .expect("create succeeds");

    assert_eq!(details.application.state, ApplicationState::Created);
    assert_eq!(details.application.creation_time, frozen_now());
    assert_eq!(details.application.last_update_time, frozen_now());
    assert_eq!(details.adopter.id, adp("adp-1"));
    assert_eq!(details.pet.species, "Dog");
    assert_eq!(details.shelter.name, "Cedar Hollow Rescue");
}

#[test]
fn duplicate_applications_for_same_pair_are_allowed() {
    let h = harness();
    seed_open_listing(&h);

    let first = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("first");
    let second = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("second");
    assert_ne!(first.application.id, second.application.id);
}

#[test]
fn withdraw_unknown_application_is_not_found() {
    let h = harness();
    seed_open_listing(&h);

    match h.workflow.withdraw(&crate::workflows::adoption::domain::ApplicationId(
        "missing".to_string(),
    )) {
        Err(WorkflowError::NotFound { entity, .. }) => {
            assert_eq!(entity, EntityKind::Application);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn withdraw_updates_state_and_notifies_adopter() {
    let h = harness();
    seed_open_listing(&h);
    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");

    h.clock.advance(Duration::minutes(5));
    let withdrawn = h
        .workflow
        .withdraw(&created.application.id)
        .expect("withdraw succeeds");

    assert_eq!(withdrawn.application.state, ApplicationState::Withdrawn);
    assert!(withdrawn.application.last_update_time > withdrawn.application.creation_time);

    let events = h.dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status_label, "withdrawn");
    assert_eq!(events[0].recipient_email, "adp-1@example.com");
}

#[test]
fn withdraw_is_permitted_from_terminal_states() {
    // Current behavior is deliberately permissive; no guard exists.
    let h = harness();
    seed_open_listing(&h);
    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");
    h.workflow.reject(&created.application.id).expect("reject");

    let withdrawn = h
        .workflow
        .withdraw(&created.application.id)
        .expect("withdraw after reject succeeds");
    assert_eq!(withdrawn.application.state, ApplicationState::Withdrawn);
}

#[test]
fn reject_guards_terminal_states() {
    let h = harness();
    seed_open_listing(&h);

    let withdrawn = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");
    h.workflow.withdraw(&withdrawn.application.id).expect("withdraw");
    match h.workflow.reject(&withdrawn.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Application was withdrawn");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }

    let accepted = h.workflow.create(ann("ann-1"), adp("adp-2")).expect("create");
    h.gate.grant(&adp("adp-2"), &shl("shl-1")).expect("grant");
    h.workflow.accept(&accepted.application.id).expect("accept");
    match h.workflow.reject(&accepted.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Application was accepted");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }
}

#[test]
fn reject_notifies_adopter() {
    let h = harness();
    seed_open_listing(&h);
    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");

    let rejected = h.workflow.reject(&created.application.id).expect("reject");
    assert_eq!(rejected.application.state, ApplicationState::Rejected);

    let events = h.dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status_label, "rejected");
}

#[test]
fn accept_requires_verification_and_leaves_no_side_effects() {
    let h = harness();
    seed_open_listing(&h);
    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");

    match h.workflow.accept(&created.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Adopter is not verified");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }

    let stored = h
        .store
        .application(&created.application.id)
        .expect("fetch succeeds")
        .expect("application present");
    assert_eq!(stored.state, ApplicationState::Created);

    let listing = h
        .store
        .announcement(&ann("ann-1"))
        .expect("fetch succeeds")
        .expect("announcement present");
    assert_eq!(listing.status, AnnouncementStatus::Open);
    assert!(listing.closing_date.is_none());
    assert!(h.dispatcher.events().is_empty());
}

#[test]
fn accept_closes_announcement_and_notifies() {
    let h = harness();
    seed_open_listing(&h);
    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");
    h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("grant");

    h.clock.advance(Duration::hours(1));
    let accepted = h.workflow.accept(&created.application.id).expect("accept");

    assert_eq!(accepted.application.state, ApplicationState::Accepted);
    assert_eq!(accepted.announcement.status, AnnouncementStatus::Closed);
    assert_eq!(accepted.announcement.closing_date, Some(h.clock.now()));
    assert_eq!(accepted.announcement.last_update_date, h.clock.now());
    assert!(accepted.application.last_update_time > accepted.application.creation_time);

    let events = h.dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status_label, "accepted");
    assert_eq!(events[0].recipient_name, "Avery Quinn");
}

#[test]
fn accept_cascade_rejects_all_competing_applications() {
    let h = harness();
    seed_open_listing(&h);
    h.store
        .insert_adopter(adopter("adp-3", "Riley Chen"))
        .expect("seed adopter");

    let winner = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("first");
    let second = h.workflow.create(ann("ann-1"), adp("adp-2")).expect("second");
    let third = h.workflow.create(ann("ann-1"), adp("adp-3")).expect("third");

    h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("grant");
    h.workflow.accept(&winner.application.id).expect("accept");

    let second_after = h.workflow.get(&second.application.id).expect("second visible");
    let third_after = h.workflow.get(&third.application.id).expect("third visible");
    assert_eq!(second_after.application.state, ApplicationState::Rejected);
    assert_eq!(third_after.application.state, ApplicationState::Rejected);

    let events = h.dispatcher.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].status_label, "accepted");
    let rejected_recipients: Vec<&str> = events[1..]
        .iter()
        .map(|event| event.recipient_email.as_str())
        .collect();
    assert!(rejected_recipients.contains(&"adp-2@example.com"));
    assert!(rejected_recipients.contains(&"adp-3@example.com"));
}

#[test]
fn cascade_spares_applications_already_terminal() {
    let h = harness();
    seed_open_listing(&h);

    let winner = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("first");
    let withdrawn = h.workflow.create(ann("ann-1"), adp("adp-2")).expect("second");
    h.workflow.withdraw(&withdrawn.application.id).expect("withdraw");

    h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("grant");
    h.workflow.accept(&winner.application.id).expect("accept");

    let after = h.workflow.get(&withdrawn.application.id).expect("visible");
    assert_eq!(after.application.state, ApplicationState::Withdrawn);
}

#[test]
fn accept_on_closed_announcement_fails_without_state_changes() {
    let h = harness();
    seed_open_listing(&h);

    let winner = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("first");
    let late = h.workflow.create(ann("ann-1"), adp("adp-2")).expect("second");

    h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("grant");
    h.gate.grant(&adp("adp-2"), &shl("shl-1")).expect("grant");
    h.workflow.accept(&winner.application.id).expect("accept");

    // The cascade already rejected the late application; accepting it (or
    // anything else on the closed announcement) must fail cleanly.
    match h.workflow.accept(&late.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Application was rejected");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }

    match h.workflow.accept(&winner.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Announcement is closed");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }

    let listing = h
        .store
        .announcement(&ann("ann-1"))
        .expect("fetch succeeds")
        .expect("announcement present");
    assert_eq!(listing.status, AnnouncementStatus::Closed);
}

#[test]
fn accept_guards_withdrawn_and_rejected_applications() {
    let h = harness();
    seed_open_listing(&h);

    let withdrawn = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");
    h.workflow.withdraw(&withdrawn.application.id).expect("withdraw");
    match h.workflow.accept(&withdrawn.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Application was withdrawn");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }

    let rejected = h.workflow.create(ann("ann-1"), adp("adp-2")).expect("create");
    h.workflow.reject(&rejected.application.id).expect("reject");
    match h.workflow.accept(&rejected.application.id) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Application was rejected");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }
}

#[test]
fn last_update_never_precedes_creation() {
    let h = harness();
    seed_open_listing(&h);

    let created = h.workflow.create(ann("ann-1"), adp("adp-1")).expect("create");
    assert_eq!(
        created.application.creation_time,
        created.application.last_update_time
    );

    h.clock.advance(Duration::seconds(30));
    let rejected = h.workflow.reject(&created.application.id).expect("reject");
    assert!(rejected.application.last_update_time >= rejected.application.creation_time);
}
