use chrono::Duration;

use super::common::*;
use crate::workflows::adoption::domain::AdopterStatus;
use crate::workflows::adoption::retention::RetentionSweep;

fn sweep(h: &Harness, days: i64) -> RetentionSweep<crate::workflows::adoption::memory::MemoryStore> {
    RetentionSweep::new(h.store.clone(), h.clock.clone(), Duration::days(days))
}

#[test]
fn purges_only_adopters_past_the_window() {
    let h = harness();

    let mut expired = adopter("adp-1", "Long Gone");
    expired.status = AdopterStatus::Deleted;
    expired.deletion_time = Some(frozen_now() - Duration::days(45));
    h.store.insert_adopter(expired).expect("seed adopter");

    let mut recent = adopter("adp-2", "Just Deleted");
    recent.status = AdopterStatus::Deleted;
    recent.deletion_time = Some(frozen_now() - Duration::days(2));
    h.store.insert_adopter(recent).expect("seed adopter");

    h.store
        .insert_adopter(adopter("adp-3", "Still Around"))
        .expect("seed adopter");

    let purged = sweep(&h, 30).run().expect("sweep runs");
    assert_eq!(purged, 1);
    assert_eq!(h.store.adopter_count().expect("count"), 2);
}

#[test]
fn repeated_passes_are_idempotent() {
    let h = harness();

    let mut expired = adopter("adp-1", "Long Gone");
    expired.status = AdopterStatus::Deleted;
    expired.deletion_time = Some(frozen_now() - Duration::days(90));
    h.store.insert_adopter(expired).expect("seed adopter");

    let sweep = sweep(&h, 30);
    assert_eq!(sweep.run().expect("first pass"), 1);
    assert_eq!(sweep.run().expect("second pass"), 0);
    assert_eq!(h.store.adopter_count().expect("count"), 0);
}

#[test]
fn active_adopters_are_never_touched() {
    let h = harness();
    h.store
        .insert_adopter(adopter("adp-1", "Avery Quinn"))
        .expect("seed adopter");
    h.store
        .insert_adopter(adopter("adp-2", "Morgan Lee"))
        .expect("seed adopter");

    assert_eq!(sweep(&h, 0).run().expect("sweep runs"), 0);
    assert_eq!(h.store.adopter_count().expect("count"), 2);
}
