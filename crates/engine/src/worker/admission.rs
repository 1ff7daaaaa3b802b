//! Admission control for the worker pool
//!
//! Tracks queued and running work and decides whether a new submission fits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Admission state for a worker pool
///
/// A submission is admitted while `queued + running` is below
/// `max_concurrency + queue_capacity`. With no queue capacity every
/// submission is admitted and excess work simply waits for a worker.
/// Uses atomic operations for thread-safe access without locks.
#[derive(Debug)]
pub struct AdmissionState {
    max_concurrency: usize,
    queue_capacity: Option<usize>,
    in_flight: AtomicUsize,
    running: AtomicUsize,
}

impl AdmissionState {
    /// Create a new admission state
    pub fn new(max_concurrency: usize, queue_capacity: Option<usize>) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            queue_capacity,
            in_flight: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
        }
    }

    /// Total admitted work the pool will hold, or `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.queue_capacity
            .map(|queue| self.max_concurrency.saturating_add(queue))
    }

    /// Try to admit one submission
    ///
    /// Returns the pool capacity on rejection. Compare-and-swap keeps
    /// concurrent submitters from overshooting the limit.
    pub fn try_admit(&self) -> Result<(), usize> {
        let Some(capacity) = self.capacity() else {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            return Ok(());
        };

        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < capacity).then_some(current + 1)
            })
            .map(|_| ())
            .map_err(|_| capacity)
    }

    /// Admitted work that has not finished (queued plus running)
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Work currently holding a worker
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Work admitted but still waiting for a worker
    pub fn queued(&self) -> usize {
        self.in_flight().saturating_sub(self.running())
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn started(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
    }

    fn finished(&self, was_running: bool) {
        if was_running {
            self.running.fetch_sub(1, Ordering::AcqRel);
        }
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Accounting for one admitted submission
///
/// Releases its slot on drop, so a task that panics or is dropped before it
/// ever ran still gives its capacity back.
#[derive(Debug)]
pub(crate) struct AdmissionSlot {
    state: Arc<AdmissionState>,
    running: bool,
}

impl AdmissionSlot {
    /// Take ownership of a slot already admitted via [`AdmissionState::try_admit`]
    pub(crate) fn admitted(state: Arc<AdmissionState>) -> Self {
        Self {
            state,
            running: false,
        }
    }

    /// Record that the work acquired a worker
    pub(crate) fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.state.started();
        }
    }
}

impl Drop for AdmissionSlot {
    fn drop(&mut self) {
        self.state.finished(self.running);
    }
}
