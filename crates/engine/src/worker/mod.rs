//! Worker pool for task execution
//!
//! This module provides:
//! - [`WorkerPool`] - Fixed-capacity pool with concurrent task execution
//! - [`AdmissionState`] - Queue-capacity aware task acceptance
//! - [`ShutdownSignal`] - Lets running tasks notice a pool shutdown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WorkerPool                             │
//! │         │ submit()                                           │
//! │         ▼                                                    │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │              AdmissionState                          │    │
//! │  │  (queued + running vs. workers + queue capacity)    │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │         │ admitted                                           │
//! │         ▼                                                    │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │         Task Executor (Semaphore-limited)           │    │
//! │  │  [Task 1] [Task 2] [Task 3] ... [Task W]            │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │         │                                                    │
//! │         ▼                                                    │
//! │     TaskHandle (resolves once per task)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod admission;
mod pool;

pub use admission::AdmissionState;
pub use pool::{
    ShutdownSignal, TaskHandle, TaskJoinError, WorkerPool, WorkerPoolConfig, WorkerPoolError,
    WorkerPoolStatus,
};

pub(crate) use pool::panic_message;
