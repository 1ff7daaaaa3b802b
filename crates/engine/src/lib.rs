//! # Itemflow Batch Engine
//!
//! An in-process fan-out/fan-in engine that processes every stored item
//! concurrently on a fixed-size worker pool.
//!
//! ## Features
//!
//! - **Fixed-capacity worker pool**: At most `max_concurrency` tasks run at once, the rest wait
//! - **Contained failures**: A failing item never fails its siblings or the batch
//! - **Join barrier**: A batch handle resolves once, after every task is terminal
//! - **Structured reports**: Counts plus per-item failures, serializable as JSON
//! - **Graceful shutdown**: Waiting tasks are interrupted, running ones drain
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BatchEngine                            │
//! │  (process_all: returns a BatchHandle immediately)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dispatcher                             │
//! │  (snapshots pending IDs, submits one task per ID)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WorkerPool                             │
//! │  (W permits, admission control, shutdown signal)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ItemProcessor  →  join_all  →  BatchReport      │
//! │  (delay, load, mark processed, save; then the barrier)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use itemflow_core::InMemoryItemStore;
//! use itemflow_engine::prelude::*;
//!
//! let store = Arc::new(InMemoryItemStore::new());
//! let config = ItemflowConfig::from_env();
//! let pool = Arc::new(WorkerPool::new(config.pool));
//! let engine = BatchEngine::new(store, pool, config.engine);
//!
//! let report = engine.process_all().await?;
//! for failure in &report.failures {
//!     eprintln!("item {} failed: {}", failure.item_id, failure.error);
//! }
//! ```

pub mod batch;
pub mod config;
pub mod worker;

mod duration_millis;

/// Prelude for common imports
pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::batch::{
        BatchEngine, BatchError, BatchHandle, BatchReport, EngineConfig, FailureKind, TaskError,
        TaskFailure, TaskOutcome,
    };
    pub use crate::config::ItemflowConfig;
    pub use crate::worker::{WorkerPool, WorkerPoolConfig, WorkerPoolError, WorkerPoolStatus};
}

// Re-export key types at crate root
pub use batch::{
    BatchEngine, BatchError, BatchHandle, BatchReport, EngineConfig, FailureKind, TaskError,
    TaskFailure, TaskOutcome,
};
pub use config::ItemflowConfig;
pub use worker::{WorkerPool, WorkerPoolConfig, WorkerPoolError, WorkerPoolStatus};
