use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use super::clock::Clock;
use super::error::WorkflowError;
use super::repository::AdoptionStore;

/// Periodic purge of soft-deleted adopters whose retention window has
/// expired. Each pass is a single store transaction and is idempotent, so a
/// cancelled or repeated run leaves no partial purge.
pub struct RetentionSweep<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl<S> RetentionSweep<S>
where
    S: AdoptionStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Run one pass. Returns how many adopters were purged.
    pub fn run(&self) -> Result<usize, WorkflowError> {
        let cutoff = self.clock.now() - self.window;
        let purged = self.store.purge_deleted_adopters(cutoff)?;
        info!(purged = purged.len(), "retention sweep complete");
        Ok(purged.len())
    }
}
