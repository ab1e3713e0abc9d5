use std::sync::Arc;

use super::clock::Clock;
use super::domain::{AdopterId, EntityKind, ShelterId, Verification};
use super::error::WorkflowError;
use super::repository::{AdoptionStore, StoreError};

/// Answers whether an adopter is cleared to transact with a shelter, and
/// records new grants. Grants are monotonic; there is no revoke.
pub struct VerificationGate<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> VerificationGate<S>
where
    S: AdoptionStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Check for a verification fact. Fails with `NotFound` when the adopter
    /// does not exist; an unknown shelter simply yields `false`.
    pub fn is_verified(
        &self,
        adopter_id: &AdopterId,
        shelter_id: &ShelterId,
    ) -> Result<bool, WorkflowError> {
        if self.store.adopter(adopter_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Adopter, adopter_id));
        }
        Ok(self.store.is_verified(adopter_id, shelter_id)?)
    }

    /// Record a grant for `(adopter, shelter)`.
    pub fn grant(
        &self,
        adopter_id: &AdopterId,
        shelter_id: &ShelterId,
    ) -> Result<Verification, WorkflowError> {
        if self.store.adopter(adopter_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Adopter, adopter_id));
        }
        if self.store.shelter(shelter_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Shelter, shelter_id));
        }
        if self.store.is_verified(adopter_id, shelter_id)? {
            return Err(WorkflowError::invalid(
                "Adopter is already verified for this shelter",
            ));
        }

        let verification = Verification {
            adopter_id: adopter_id.clone(),
            shelter_id: shelter_id.clone(),
            granted_at: self.clock.now(),
        };
        match self.store.insert_verification(verification.clone()) {
            Ok(()) => Ok(verification),
            // Lost a race with an identical grant; same outcome as the
            // duplicate check above.
            Err(StoreError::Conflict) => Err(WorkflowError::invalid(
                "Adopter is already verified for this shelter",
            )),
            Err(other) => Err(other.into()),
        }
    }
}
