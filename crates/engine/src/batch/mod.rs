//! Batch processing: fan-out, per-item processing, fan-in
//!
//! This module provides:
//! - [`BatchEngine`] - Entry point; `process_all` returns a [`BatchHandle`]
//! - [`Dispatcher`] - Snapshots IDs and submits one task per ID
//! - [`ItemProcessor`] - Per-task load, mark processed, persist
//! - [`BatchReport`] - Joined outcomes with counts and per-item failures

mod dispatcher;
mod engine;
mod outcome;
mod processor;
mod report;

pub use dispatcher::{Dispatcher, PendingTask};
pub use engine::{BatchEngine, BatchError, BatchHandle, EngineConfig};
pub use outcome::{FailureKind, TaskError, TaskOutcome, TaskRecord};
pub use processor::ItemProcessor;
pub use report::{join_all, BatchReport, TaskFailure};
