//! Per-task terminal values

use itemflow_core::{Item, ItemId, StoreError};
use serde::{Deserialize, Serialize};

use crate::worker::{TaskJoinError, WorkerPoolError};

/// Why a task produced no item
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// Reading the item failed
    #[error("failed to load item: {0}")]
    Load(StoreError),

    /// Writing the processed item failed
    #[error("failed to persist item: {0}")]
    Persist(StoreError),

    /// The processing delay was cut short by a pool shutdown
    #[error("interrupted while waiting: worker pool is shutting down")]
    Interrupted,

    /// The pool refused the submission
    #[error("dispatch rejected: {0}")]
    Rejected(WorkerPoolError),

    /// The task panicked
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was aborted before finishing
    #[error("task was aborted")]
    Aborted,
}

impl TaskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Load(_) => FailureKind::Load,
            Self::Persist(_) => FailureKind::Persist,
            Self::Interrupted => FailureKind::Interrupted,
            Self::Rejected(_) => FailureKind::Rejected,
            Self::Panicked(_) => FailureKind::Panicked,
            Self::Aborted => FailureKind::Aborted,
        }
    }
}

impl From<TaskJoinError> for TaskError {
    fn from(err: TaskJoinError) -> Self {
        match err {
            TaskJoinError::Panicked(message) => Self::Panicked(message),
            TaskJoinError::Aborted => Self::Aborted,
        }
    }
}

/// Coarse failure category, stable for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Load,
    Persist,
    Interrupted,
    Rejected,
    Panicked,
    Aborted,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Persist => write!(f, "persist"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Panicked => write!(f, "panicked"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Terminal outcome of processing one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Item was processed and persisted
    Processed(Item),
    /// Item no longer existed when the task ran
    NotFound,
    /// Processing failed; the item is left as it was
    Failed(TaskError),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed(_))
    }

    pub fn into_item(self) -> Option<Item> {
        match self {
            Self::Processed(item) => Some(item),
            _ => None,
        }
    }
}

/// A task's ID paired with its terminal outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub item_id: ItemId,
    pub outcome: TaskOutcome,
}
