//! Worker pool for task execution
//!
//! Runs submitted work with bounded concurrency, optional queue limits and
//! graceful shutdown.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

use super::admission::{AdmissionSlot, AdmissionState};
use crate::duration_millis;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Maximum concurrent task executions
    pub max_concurrency: usize,

    /// Submissions allowed to wait for a worker (None = unbounded)
    pub queue_capacity: Option<usize>,

    /// Graceful shutdown timeout
    #[serde(with = "duration_millis")]
    pub shutdown_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            queue_capacity: None,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a new worker pool configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum concurrency
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Bound the number of submissions waiting for a worker
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Let any number of submissions wait for a worker
    pub fn with_unbounded_queue(mut self) -> Self {
        self.queue_capacity = None;
        self
    }

    /// Set shutdown timeout
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Worker pool status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPoolStatus {
    /// Accepting and running tasks
    Running,
    /// Shutdown requested; finishing admitted work, rejecting new work
    Draining,
    /// All admitted work has finished
    Stopped,
}

/// Worker pool errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerPoolError {
    /// Pool is draining or stopped
    #[error("worker pool is not running")]
    NotRunning,

    /// Workers and queue are full
    #[error("worker pool saturated (capacity {capacity})")]
    Saturated { capacity: usize },

    /// Shutdown timeout
    #[error("graceful shutdown timed out with {remaining} task(s) outstanding")]
    ShutdownTimeout { remaining: usize },
}

/// Failure to obtain a task's result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskJoinError {
    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("task was aborted")]
    Aborted,
}

impl From<JoinError> for TaskJoinError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            Self::Panicked(panic_message(err))
        } else {
            Self::Aborted
        }
    }
}

pub(crate) fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "non-string panic payload".to_string()
            }
        }
        Err(err) => err.to_string(),
    }
}

/// Completion handle for one submitted task
///
/// Resolves exactly once, to the task's output or to why it produced none.
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskJoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|result| result.map_err(TaskJoinError::from))
    }
}

/// Observes the pool's shutdown flag from inside a task
///
/// The flag only ever goes from lowered to raised; observing it does not
/// reset it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has been requested
    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested
    ///
    /// Never completes if the pool is dropped without shutting down.
    pub async fn raised(&mut self) {
        let closed = self.rx.wait_for(|raised| *raised).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Fixed-capacity worker pool
///
/// Created once at service start and shared by reference (`Arc`). At most
/// `max_concurrency` submissions run at a time; the rest wait in submission
/// order for a worker, up to `queue_capacity`.
///
/// # Example
///
/// ```ignore
/// use itemflow_engine::worker::{WorkerPool, WorkerPoolConfig};
///
/// let pool = WorkerPool::new(WorkerPoolConfig::new().with_max_concurrency(4));
///
/// let handle = pool.submit(async { 40 + 2 })?;
/// assert_eq!(handle.await?, 42);
///
/// // ... later, graceful shutdown
/// pool.shutdown().await?;
/// ```
pub struct WorkerPool {
    config: WorkerPoolConfig,
    admission: Arc<AdmissionState>,
    workers: Arc<Semaphore>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    status: RwLock<WorkerPoolStatus>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("running", &self.running())
            .field("queued", &self.queued())
            .finish()
    }
}

impl WorkerPool {
    /// Create a running worker pool
    pub fn new(config: WorkerPoolConfig) -> Self {
        let config = WorkerPoolConfig {
            max_concurrency: config.max_concurrency.max(1),
            ..config
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            max_concurrency = config.max_concurrency,
            queue_capacity = ?config.queue_capacity,
            "Starting worker pool"
        );

        Self {
            admission: Arc::new(AdmissionState::new(
                config.max_concurrency,
                config.queue_capacity,
            )),
            workers: Arc::new(Semaphore::new(config.max_concurrency)),
            shutdown_tx,
            shutdown_rx,
            status: RwLock::new(WorkerPoolStatus::Running),
            config,
        }
    }

    /// Submit work to the pool
    ///
    /// Returns immediately. The work starts once a worker is free. Must be
    /// called from within a Tokio runtime.
    pub fn submit<F>(&self, work: F) -> Result<TaskHandle<F::Output>, WorkerPoolError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        // Held until the slot is counted, so shutdown never drains past it
        let status = self.status.read();
        if *status != WorkerPoolStatus::Running {
            return Err(WorkerPoolError::NotRunning);
        }

        self.admission.try_admit().map_err(|capacity| {
            debug!(capacity, "Rejecting submission: pool saturated");
            WorkerPoolError::Saturated { capacity }
        })?;

        let mut slot = AdmissionSlot::admitted(Arc::clone(&self.admission));
        drop(status);

        let workers = Arc::clone(&self.workers);

        let inner = tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only waits
            let _permit = workers.acquire_owned().await.ok();
            slot.start();
            let output = work.await;
            drop(slot);
            output
        });

        Ok(TaskHandle { inner })
    }

    /// A signal tasks can use to notice shutdown
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.shutdown_rx.clone(),
        }
    }

    /// Shutdown the worker pool gracefully
    ///
    /// Rejects new submissions, raises the shutdown signal and waits for
    /// admitted work to finish. Calling it again after it completed is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), WorkerPoolError> {
        {
            let mut status = self.status.write();
            if *status == WorkerPoolStatus::Stopped {
                return Ok(());
            }
            *status = WorkerPoolStatus::Draining;
        }

        info!(
            running = self.running(),
            queued = self.queued(),
            "Initiating graceful shutdown"
        );
        self.shutdown_tx.send_replace(true);

        let deadline = tokio::time::Instant::now() + self.config.shutdown_timeout;

        loop {
            let remaining = self.admission.in_flight();
            if remaining == 0 {
                debug!("All tasks completed");
                break;
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(remaining, "Shutdown timeout reached");
                return Err(WorkerPoolError::ShutdownTimeout { remaining });
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        *self.status.write() = WorkerPoolStatus::Stopped;

        info!("Worker pool stopped");
        Ok(())
    }

    /// Get current status
    pub fn status(&self) -> WorkerPoolStatus {
        *self.status.read()
    }

    /// Tasks currently holding a worker
    pub fn running(&self) -> usize {
        self.admission.running()
    }

    /// Tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.admission.queued()
    }

    pub fn max_concurrency(&self) -> usize {
        self.config.max_concurrency
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_config() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.queue_capacity, None);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = WorkerPoolConfig::new()
            .with_max_concurrency(0)
            .with_queue_capacity(5)
            .with_shutdown_timeout(Duration::from_millis(250));

        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.queue_capacity, Some(5));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(250));

        let config = config.with_unbounded_queue();
        assert_eq!(config.queue_capacity, None);
    }

    #[test]
    fn test_config_serde_uses_millis() {
        let config = WorkerPoolConfig::new().with_shutdown_timeout(Duration::from_millis(1500));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["shutdown_timeout"], 1500);

        let back: WorkerPoolConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[tokio::test]
    async fn test_submit_returns_output() {
        let pool = WorkerPool::new(WorkerPoolConfig::default());
        let handle = pool.submit(async { 40 + 2 }).unwrap();
        assert_eq!(handle.await, Ok(42));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_max() {
        let pool = WorkerPool::new(WorkerPoolConfig::new().with_max_concurrency(3));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                pool.submit(async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap()
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(pool.running(), 0);
        assert_eq!(pool.queued(), 0);
    }

    #[tokio::test]
    async fn test_saturated_pool_rejects() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::new()
                .with_max_concurrency(1)
                .with_queue_capacity(1),
        );

        let first = pool
            .submit(tokio::time::sleep(Duration::from_millis(50)))
            .unwrap();
        let second = pool
            .submit(tokio::time::sleep(Duration::from_millis(50)))
            .unwrap();
        let third = pool.submit(async {});

        assert_eq!(
            third.unwrap_err(),
            WorkerPoolError::Saturated { capacity: 2 }
        );

        first.await.unwrap();
        second.await.unwrap();

        // Capacity is given back once work finishes
        assert!(pool.submit(async {}).unwrap().await.is_ok());
    }

    #[tokio::test]
    async fn test_panicking_task_reports_and_frees_worker() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::new()
                .with_max_concurrency(1)
                .with_queue_capacity(0),
        );

        let handle = pool.submit(async { panic!("boom") }).unwrap();
        let result: Result<(), _> = handle.await;
        assert_eq!(result, Err(TaskJoinError::Panicked("boom".to_string())));

        assert!(pool.submit(async { 1 }).unwrap().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_work() {
        let pool = WorkerPool::new(WorkerPoolConfig::default());
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown().await.unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(pool.status(), WorkerPoolStatus::Stopped);

        // Idempotent
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(WorkerPoolConfig::default());
        pool.shutdown().await.unwrap();

        let err = tokio_test::assert_err!(pool.submit(async {}));
        assert_eq!(err, WorkerPoolError::NotRunning);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stopped_pool_has_no_work_left_under_concurrent_submits() {
        let pool = Arc::new(WorkerPool::new(WorkerPoolConfig::default()));

        let submitters: Vec<_> = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    let mut accepted = Vec::new();
                    loop {
                        match pool.submit(tokio::time::sleep(Duration::from_millis(1))) {
                            Ok(handle) => accepted.push(handle),
                            Err(WorkerPoolError::NotRunning) => break,
                            Err(e) => panic!("unexpected rejection: {e}"),
                        }
                        tokio::task::yield_now().await;
                    }
                    accepted
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.shutdown().await.unwrap();

        assert_eq!(pool.status(), WorkerPoolStatus::Stopped);
        assert_eq!(pool.running(), 0);
        assert_eq!(pool.queued(), 0);

        for submitter in submitters {
            for handle in submitter.await.unwrap() {
                handle.await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_shutdown_raises_signal_and_keeps_it_raised() {
        let pool = WorkerPool::new(WorkerPoolConfig::default());
        let mut signal = pool.shutdown_signal();
        assert!(!signal.is_raised());

        let waiter = pool
            .submit(async move {
                signal.raised().await;
                signal.is_raised()
            })
            .unwrap();

        pool.shutdown().await.unwrap();
        assert_eq!(waiter.await, Ok(true));
        assert!(pool.shutdown_signal().is_raised());
    }

    #[tokio::test]
    async fn test_shutdown_timeout() {
        let pool = WorkerPool::new(
            WorkerPoolConfig::new().with_shutdown_timeout(Duration::from_millis(20)),
        );
        let _handle = pool
            .submit(tokio::time::sleep(Duration::from_secs(5)))
            .unwrap();

        let err = pool.shutdown().await.unwrap_err();
        assert_eq!(err, WorkerPoolError::ShutdownTimeout { remaining: 1 });
        assert_eq!(pool.status(), WorkerPoolStatus::Draining);
    }

    #[test]
    fn test_worker_pool_status() {
        assert_ne!(WorkerPoolStatus::Running, WorkerPoolStatus::Stopped);
        assert_ne!(WorkerPoolStatus::Draining, WorkerPoolStatus::Running);
    }
}
