//! Task dispatcher
//!
//! Snapshots the pending IDs and fans them out to the worker pool, one task
//! per ID, in ID order.

use std::sync::Arc;

use itemflow_core::{ItemId, ItemStore, StoreError};
use tracing::{debug, warn};

use super::outcome::{TaskError, TaskOutcome, TaskRecord};
use super::processor::ItemProcessor;
use crate::worker::{TaskHandle, WorkerPool};

/// A dispatched task that has not been joined yet
#[derive(Debug)]
pub struct PendingTask {
    item_id: ItemId,
    state: PendingState,
}

#[derive(Debug)]
enum PendingState {
    Submitted(TaskHandle<TaskOutcome>),
    /// Never reached a worker; the outcome is already known
    Resolved(TaskOutcome),
}

impl PendingTask {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Wait for the task's terminal outcome
    pub async fn resolve(self) -> TaskRecord {
        let outcome = match self.state {
            PendingState::Submitted(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(item_id = %self.item_id, error = %e, "Task ended without an outcome");
                    TaskOutcome::Failed(e.into())
                }
            },
            PendingState::Resolved(outcome) => outcome,
        };

        TaskRecord {
            item_id: self.item_id,
            outcome,
        }
    }
}

/// Fans item IDs out to the worker pool
pub struct Dispatcher {
    store: Arc<dyn ItemStore>,
    pool: Arc<WorkerPool>,
    processor: Arc<ItemProcessor>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ItemStore>, pool: Arc<WorkerPool>, processor: ItemProcessor) -> Self {
        Self {
            store,
            pool,
            processor: Arc::new(processor),
        }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Snapshot of the IDs to process
    pub async fn enumerate(&self) -> Result<Vec<ItemId>, StoreError> {
        self.store.find_all_ids().await
    }

    /// Submit one task per ID
    ///
    /// Never fails: a submission the pool refuses becomes an already
    /// resolved task carrying [`TaskError::Rejected`].
    pub fn dispatch(&self, ids: &[ItemId]) -> Vec<PendingTask> {
        ids.iter()
            .map(|&item_id| {
                let processor = Arc::clone(&self.processor);
                let signal = self.pool.shutdown_signal();

                let state = match self
                    .pool
                    .submit(async move { processor.process(item_id, signal).await })
                {
                    Ok(handle) => {
                        debug!(%item_id, "Task submitted");
                        PendingState::Submitted(handle)
                    }
                    Err(e) => {
                        warn!(%item_id, error = %e, "Task rejected by worker pool");
                        PendingState::Resolved(TaskOutcome::Failed(TaskError::Rejected(e)))
                    }
                };

                PendingTask { item_id, state }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use itemflow_core::{InMemoryItemStore, Item};

    use crate::worker::{WorkerPoolConfig, WorkerPoolError};

    async fn store_with(n: u64) -> Arc<InMemoryItemStore> {
        let store = Arc::new(InMemoryItemStore::new());
        for _ in 0..n {
            store.save(Item::new("x", "x@example.com")).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_enumerate_snapshots_ids() {
        let store = store_with(3).await;
        let pool = Arc::new(WorkerPool::new(WorkerPoolConfig::default()));
        let dispatcher = Dispatcher::new(
            store.clone(),
            pool,
            ItemProcessor::new(store, Duration::ZERO),
        );

        let ids = dispatcher.enumerate().await.unwrap();
        assert_eq!(ids, vec![ItemId::new(1), ItemId::new(2), ItemId::new(3)]);
    }

    #[tokio::test]
    async fn test_dispatch_one_task_per_id_in_order() {
        let store = store_with(4).await;
        let pool = Arc::new(WorkerPool::new(WorkerPoolConfig::default()));
        let dispatcher = Dispatcher::new(
            store.clone(),
            pool,
            ItemProcessor::new(store, Duration::ZERO),
        );

        let ids = dispatcher.enumerate().await.unwrap();
        let pending = dispatcher.dispatch(&ids);
        assert_eq!(
            pending.iter().map(PendingTask::item_id).collect::<Vec<_>>(),
            ids
        );

        for task in pending {
            let record = task.resolve().await;
            assert!(record.outcome.is_success());
        }
    }

    #[tokio::test]
    async fn test_rejected_submission_becomes_failed_task() {
        let store = store_with(3).await;
        let pool = Arc::new(WorkerPool::new(
            WorkerPoolConfig::new()
                .with_max_concurrency(1)
                .with_queue_capacity(0),
        ));
        let dispatcher = Dispatcher::new(
            store.clone(),
            pool,
            ItemProcessor::new(store, Duration::from_millis(20)),
        );

        let ids = dispatcher.enumerate().await.unwrap();
        let pending = dispatcher.dispatch(&ids);
        assert_eq!(pending.len(), 3);

        let mut outcomes = Vec::new();
        for task in pending {
            outcomes.push(task.resolve().await.outcome);
        }

        assert!(outcomes[0].is_success());
        for outcome in &outcomes[1..] {
            assert_eq!(
                *outcome,
                TaskOutcome::Failed(TaskError::Rejected(WorkerPoolError::Saturated {
                    capacity: 1
                }))
            );
        }
    }
}
