use super::common::*;
use crate::workflows::adoption::domain::EntityKind;
use crate::workflows::adoption::error::WorkflowError;

#[test]
fn is_verified_requires_known_adopter() {
    let h = harness();
    seed_open_listing(&h);

    match h.gate.is_verified(&adp("ghost"), &shl("shl-1")) {
        Err(WorkflowError::NotFound { entity, .. }) => assert_eq!(entity, EntityKind::Adopter),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn unknown_shelter_reads_as_unverified() {
    let h = harness();
    seed_open_listing(&h);

    let verified = h
        .gate
        .is_verified(&adp("adp-1"), &shl("nowhere"))
        .expect("check succeeds");
    assert!(!verified);
}

#[test]
fn grant_flips_the_check() {
    let h = harness();
    seed_open_listing(&h);

    assert!(!h
        .gate
        .is_verified(&adp("adp-1"), &shl("shl-1"))
        .expect("check succeeds"));

    let verification = h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("grant");
    assert_eq!(verification.granted_at, frozen_now());

    assert!(h
        .gate
        .is_verified(&adp("adp-1"), &shl("shl-1"))
        .expect("check succeeds"));
}

#[test]
fn grant_requires_both_parties() {
    let h = harness();
    seed_open_listing(&h);

    match h.gate.grant(&adp("ghost"), &shl("shl-1")) {
        Err(WorkflowError::NotFound { entity, .. }) => assert_eq!(entity, EntityKind::Adopter),
        other => panic!("expected not found, got {other:?}"),
    }

    match h.gate.grant(&adp("adp-1"), &shl("nowhere")) {
        Err(WorkflowError::NotFound { entity, .. }) => assert_eq!(entity, EntityKind::Shelter),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn duplicate_grant_is_rejected() {
    let h = harness();
    seed_open_listing(&h);

    h.gate.grant(&adp("adp-1"), &shl("shl-1")).expect("first grant");
    match h.gate.grant(&adp("adp-1"), &shl("shl-1")) {
        Err(WorkflowError::InvalidOperation(message)) => {
            assert_eq!(message, "Adopter is already verified for this shelter");
        }
        other => panic!("expected invalid operation, got {other:?}"),
    }
}
