use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::clock::Clock;
use super::domain::{
    AdopterId, Announcement, AnnouncementId, AnnouncementStatus, EntityKind, Like, ShelterId,
};
use super::error::WorkflowError;
use super::repository::AdoptionStore;

/// Composable filter predicate set for announcement search. Every field is
/// optional and conjunctive with the others; the base predicate
/// (`status = Open`) always applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementFilter {
    pub species: Option<Vec<String>>,
    pub breeds: Option<Vec<String>>,
    pub cities: Option<Vec<String>>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub shelter_names: Option<Vec<String>>,
    /// When present, each result row is annotated with that adopter's like.
    pub mark_liked_by: Option<AdopterId>,
    /// Restrict results to liked rows. Without `mark_liked_by` every row is
    /// unliked, so this filters everything out.
    #[serde(default)]
    pub include_only_liked: bool,
}

/// One search result: the announcement and its per-adopter liked flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnouncementCard {
    pub announcement: Announcement,
    pub is_liked: bool,
}

/// Partial patch applied by `update`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<AnnouncementStatus>,
}

/// Read/update surface over announcements: filtered search with liked
/// annotation, lookups that exclude soft-deleted rows, partial patching,
/// and like toggling.
pub struct AnnouncementDirectory<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> AnnouncementDirectory<S>
where
    S: AdoptionStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Evaluate the filter set over open announcements. Result order is
    /// stable across repeated calls but otherwise unspecified.
    pub fn query(
        &self,
        filter: &AnnouncementFilter,
    ) -> Result<Vec<AnnouncementCard>, WorkflowError> {
        let today = self.clock.now().date_naive();
        let mut cards = Vec::new();

        for announcement in self.store.announcements()? {
            if announcement.status != AnnouncementStatus::Open {
                continue;
            }

            let Some(pet) = self.store.pet(&announcement.pet_id)? else {
                warn!(announcement = %announcement.id, pet = %announcement.pet_id, "announcement references missing pet, skipping");
                continue;
            };
            let Some(shelter) = self.store.shelter(&announcement.shelter_id)? else {
                warn!(announcement = %announcement.id, shelter = %announcement.shelter_id, "announcement references missing shelter, skipping");
                continue;
            };

            if let Some(species) = &filter.species {
                if !species.iter().any(|s| s == &pet.species) {
                    continue;
                }
            }
            if let Some(breeds) = &filter.breeds {
                if !breeds.iter().any(|b| b == &pet.breed) {
                    continue;
                }
            }
            if let Some(cities) = &filter.cities {
                if !cities.iter().any(|c| c == &shelter.address.city) {
                    continue;
                }
            }
            if filter.min_age.is_some() || filter.max_age.is_some() {
                let age = pet.age_in_years(today);
                if filter.min_age.is_some_and(|min| age < min) {
                    continue;
                }
                if filter.max_age.is_some_and(|max| age > max) {
                    continue;
                }
            }
            if let Some(names) = &filter.shelter_names {
                if !names.iter().any(|n| n == &shelter.name) {
                    continue;
                }
            }

            let is_liked = match &filter.mark_liked_by {
                Some(adopter_id) => self.store.is_liked(adopter_id, &announcement.id)?,
                None => false,
            };
            if filter.include_only_liked && !is_liked {
                continue;
            }

            cards.push(AnnouncementCard {
                announcement,
                is_liked,
            });
        }

        Ok(cards)
    }

    /// Fetch a single announcement; soft-deleted rows read as absent.
    pub fn get_by_id(
        &self,
        id: &AnnouncementId,
    ) -> Result<Option<Announcement>, WorkflowError> {
        let announcement = self
            .store
            .announcement(id)?
            .filter(|a| a.status != AnnouncementStatus::Deleted);
        Ok(announcement)
    }

    /// All of a shelter's announcements regardless of status, except deleted.
    pub fn list_for_shelter(
        &self,
        shelter_id: &ShelterId,
    ) -> Result<Vec<Announcement>, WorkflowError> {
        let listed = self
            .store
            .announcements()?
            .into_iter()
            .filter(|a| &a.shelter_id == shelter_id && a.status != AnnouncementStatus::Deleted)
            .collect();
        Ok(listed)
    }

    /// Apply a partial patch. Returns `Ok(None)` when the announcement is
    /// missing or already deleted. Moving into a closed-like status stamps
    /// the closing date; moving out clears it, keeping the
    /// closing-date-iff-closed invariant intact.
    pub fn update(
        &self,
        id: &AnnouncementId,
        patch: AnnouncementPatch,
    ) -> Result<Option<Announcement>, WorkflowError> {
        let Some(mut announcement) = self.get_by_id(id)? else {
            return Ok(None);
        };

        let now = self.clock.now();
        if let Some(title) = patch.title {
            announcement.title = title;
        }
        if let Some(description) = patch.description {
            announcement.description = description;
        }
        if let Some(status) = patch.status {
            announcement.status = status;
            announcement.closing_date = status.is_closed_like().then_some(now);
        }
        announcement.last_update_date = now;

        self.store.update_announcement(announcement.clone())?;
        Ok(Some(announcement))
    }

    /// Record an adopter's interest. Idempotent.
    pub fn set_like(
        &self,
        adopter_id: &AdopterId,
        announcement_id: &AnnouncementId,
    ) -> Result<(), WorkflowError> {
        if self.store.adopter(adopter_id)?.is_none() {
            return Err(WorkflowError::not_found(EntityKind::Adopter, adopter_id));
        }
        if self.get_by_id(announcement_id)?.is_none() {
            return Err(WorkflowError::not_found(
                EntityKind::Announcement,
                announcement_id,
            ));
        }

        self.store.set_like(Like {
            adopter_id: adopter_id.clone(),
            announcement_id: announcement_id.clone(),
        })?;
        Ok(())
    }

    /// Remove an adopter's interest marker. Idempotent.
    pub fn clear_like(
        &self,
        adopter_id: &AdopterId,
        announcement_id: &AnnouncementId,
    ) -> Result<(), WorkflowError> {
        self.store.clear_like(adopter_id, announcement_id)?;
        Ok(())
    }
}
