//! Item processor
//!
//! Per-task logic: wait out the processing delay, load the item, mark it
//! processed and persist it. Every path ends in a [`TaskOutcome`]; nothing is
//! propagated to sibling tasks or the batch.

use std::sync::Arc;
use std::time::Duration;

use itemflow_core::{ItemId, ItemStore};
use tracing::{debug, instrument, warn};

use super::outcome::{TaskError, TaskOutcome};
use crate::worker::ShutdownSignal;

/// Processes one item per call
pub struct ItemProcessor {
    store: Arc<dyn ItemStore>,
    delay: Duration,
}

impl ItemProcessor {
    pub fn new(store: Arc<dyn ItemStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Process a single item
    ///
    /// A shutdown raised before or during the delay resolves the task as
    /// [`TaskError::Interrupted`]; the signal stays raised for everyone else.
    ///
    /// Load and save are separate store calls. A record deleted between them
    /// is written back by the save (stores upsert) and reported as processed;
    /// only deletions that land before the load yield [`TaskOutcome::NotFound`].
    #[instrument(skip(self, shutdown), fields(item_id = %id))]
    pub async fn process(&self, id: ItemId, mut shutdown: ShutdownSignal) -> TaskOutcome {
        if shutdown.is_raised() {
            warn!("Shutdown already requested, skipping item");
            return TaskOutcome::Failed(TaskError::Interrupted);
        }

        if !self.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                _ = shutdown.raised() => {
                    warn!("Interrupted while waiting");
                    return TaskOutcome::Failed(TaskError::Interrupted);
                }
            }
        }

        let mut item = match self.store.find_by_id(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!("Item not found, skipping");
                return TaskOutcome::NotFound;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load item");
                return TaskOutcome::Failed(TaskError::Load(e));
            }
        };

        item.mark_processed();

        match self.store.save(item).await {
            Ok(saved) => {
                debug!("Item processed");
                TaskOutcome::Processed(saved)
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist item");
                TaskOutcome::Failed(TaskError::Persist(e))
            }
        }
    }
}
