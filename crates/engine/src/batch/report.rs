//! Fan-in join and batch report
//!
//! [`join_all`] is the barrier: it returns only after every dispatched task
//! has a terminal outcome. The report is then built from those owned
//! outcomes, so no collection is ever shared between running tasks.

use chrono::{DateTime, Utc};
use itemflow_core::{Item, ItemId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dispatcher::PendingTask;
use super::outcome::{FailureKind, TaskOutcome, TaskRecord};

/// Wait for every task, returning records in submission order
pub async fn join_all(tasks: Vec<PendingTask>) -> Vec<TaskRecord> {
    futures::future::join_all(tasks.into_iter().map(PendingTask::resolve)).await
}

/// One item that did not make it into the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub item_id: ItemId,
    pub kind: FailureKind,
    pub error: String,
}

/// Result of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Tasks dispatched
    pub total: usize,
    pub succeeded: usize,
    /// Items that disappeared before their task ran (not failures)
    pub not_found: usize,
    pub failed: usize,
    /// Processed items, in submission order
    pub items: Vec<Item>,
    pub failures: Vec<TaskFailure>,
    /// Set when the batch itself broke down; `items` is then empty
    pub orchestration_fault: Option<String>,
}

impl BatchReport {
    /// Build a report from joined task records
    pub fn from_records(
        batch_id: Uuid,
        started_at: DateTime<Utc>,
        records: Vec<TaskRecord>,
    ) -> Self {
        let total = records.len();
        let mut items = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut not_found = 0;

        for record in records {
            match record.outcome {
                TaskOutcome::Processed(item) => items.push(item),
                TaskOutcome::NotFound => not_found += 1,
                TaskOutcome::Failed(error) => failures.push(TaskFailure {
                    item_id: record.item_id,
                    kind: error.kind(),
                    error: error.to_string(),
                }),
            }
        }

        Self {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            total,
            succeeded: items.len(),
            not_found,
            failed: failures.len(),
            items,
            failures,
            orchestration_fault: None,
        }
    }

    /// The defined failure value for a batch whose coordination broke down
    pub fn faulted(batch_id: Uuid, started_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            total: 0,
            succeeded: 0,
            not_found: 0,
            failed: 0,
            items: Vec::new(),
            failures: Vec::new(),
            orchestration_fault: Some(reason.into()),
        }
    }

    /// Every dispatched task either succeeded or found its item gone
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.orchestration_fault.is_none()
    }

    pub fn is_faulted(&self) -> bool {
        self.orchestration_fault.is_some()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().filter_map(|item| item.id).collect()
    }

    /// Wall-clock duration of the batch
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
