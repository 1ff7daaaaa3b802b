//! Batch entry point
//!
//! [`BatchEngine::process_all`] returns a [`BatchHandle`] immediately. A
//! coordinator task enumerates, dispatches and joins in the background; the
//! handle resolves exactly once, after every dispatched task is terminal.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use itemflow_core::{Item, ItemStore, StoreError};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::dispatcher::Dispatcher;
use super::processor::ItemProcessor;
use super::report::{join_all, BatchReport};
use crate::duration_millis;
use crate::worker::{panic_message, WorkerPool};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Simulated work per item, spent before the item is loaded
    #[serde(with = "duration_millis")]
    pub processing_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(100),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }
}

/// Errors that abort a batch before any task is dispatched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("failed to enumerate pending items: {0}")]
    Enumeration(#[from] StoreError),
}

/// Completion handle for one batch
///
/// Resolves to the batch report, or to [`BatchError`] if the pending IDs
/// could not be read. If the coordinator itself dies, it still resolves, to
/// [`BatchReport::faulted`].
#[derive(Debug)]
pub struct BatchHandle {
    batch_id: Uuid,
    started_at: DateTime<Utc>,
    coordinator: JoinHandle<Result<BatchReport, BatchError>>,
}

impl BatchHandle {
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Whether the batch has resolved
    pub fn is_finished(&self) -> bool {
        self.coordinator.is_finished()
    }

    /// Resolve to just the processed items
    ///
    /// Empty when enumeration failed or the batch faulted.
    pub async fn items(self) -> Vec<Item> {
        match self.await {
            Ok(report) => report.items,
            Err(_) => Vec::new(),
        }
    }
}

impl Future for BatchHandle {
    type Output = Result<BatchReport, BatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let batch_id = self.batch_id;
        let started_at = self.started_at;

        Pin::new(&mut self.coordinator).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| {
                let reason = if e.is_panic() {
                    format!("batch coordinator panicked: {}", panic_message(e))
                } else {
                    "batch coordinator was cancelled".to_string()
                };
                error!(%batch_id, %reason, "Batch orchestration fault");
                Ok(BatchReport::faulted(batch_id, started_at, reason))
            })
        })
    }
}

/// Concurrent batch processor
///
/// Cheap to clone; clones share the same worker pool. Concurrent calls to
/// [`process_all`](Self::process_all) are independent batches.
///
/// # Example
///
/// ```ignore
/// use itemflow_engine::prelude::*;
///
/// let pool = Arc::new(WorkerPool::new(WorkerPoolConfig::default()));
/// let engine = BatchEngine::new(store, pool, EngineConfig::default());
///
/// let report = engine.process_all().await?;
/// println!("{} of {} processed", report.succeeded, report.total);
/// ```
#[derive(Clone)]
pub struct BatchEngine {
    dispatcher: Arc<Dispatcher>,
    config: EngineConfig,
}

impl BatchEngine {
    pub fn new(store: Arc<dyn ItemStore>, pool: Arc<WorkerPool>, config: EngineConfig) -> Self {
        let processor = ItemProcessor::new(Arc::clone(&store), config.processing_delay);

        Self {
            dispatcher: Arc::new(Dispatcher::new(store, pool, processor)),
            config,
        }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        self.dispatcher.pool()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process every stored item
    ///
    /// Returns without waiting. Must be called from within a Tokio runtime.
    pub fn process_all(&self) -> BatchHandle {
        let batch_id = Uuid::now_v7();
        let started_at = Utc::now();
        let dispatcher = Arc::clone(&self.dispatcher);

        let coordinator = tokio::spawn(
            run_batch(dispatcher, batch_id, started_at).instrument(info_span!("batch", %batch_id)),
        );

        BatchHandle {
            batch_id,
            started_at,
            coordinator,
        }
    }
}

async fn run_batch(
    dispatcher: Arc<Dispatcher>,
    batch_id: Uuid,
    started_at: DateTime<Utc>,
) -> Result<BatchReport, BatchError> {
    let ids = dispatcher.enumerate().await.map_err(|e| {
        error!(error = %e, "Failed to enumerate items, batch aborted");
        BatchError::Enumeration(e)
    })?;

    info!(total = ids.len(), "Dispatching batch");

    let pending = dispatcher.dispatch(&ids);
    let records = join_all(pending).await;
    let report = BatchReport::from_records(batch_id, started_at, records);

    info!(
        total = report.total,
        succeeded = report.succeeded,
        not_found = report.not_found,
        failed = report.failed,
        elapsed_ms = report.elapsed().num_milliseconds(),
        "Batch finished"
    );

    Ok(report)
}
