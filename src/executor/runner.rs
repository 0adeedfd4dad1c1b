//! Per-thread task execution loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use std::time::Instant;

use crate::executor::queue::ConcurrentQueue;
use crate::executor::task::BoxedTask;
use crate::util::Backoff;

#[cfg(feature = "telemetry")]
use crate::telemetry::Metrics;

/// The loop bound to one worker thread: drain the input queue, execute
/// tasks, and route unfinished tasks to the shared return queue.
///
/// The runner owns no task state between passes. The shared running flag
/// flipping to false is its only exit condition; an in-flight pass is
/// allowed to finish, after which no further pop occurs.
pub(crate) struct TaskRunner {
    running: Arc<AtomicBool>,
    input: Arc<ConcurrentQueue<BoxedTask>>,
    returns: Arc<ConcurrentQueue<BoxedTask>>,
    idle_wait: Duration,
    #[cfg(feature = "telemetry")]
    metrics: Option<Arc<Metrics>>,
}

impl TaskRunner {
    pub fn new(
        running: Arc<AtomicBool>,
        input: Arc<ConcurrentQueue<BoxedTask>>,
        returns: Arc<ConcurrentQueue<BoxedTask>>,
        idle_wait: Duration,
    ) -> Self {
        Self {
            running,
            input,
            returns,
            idle_wait,
            #[cfg(feature = "telemetry")]
            metrics: None,
        }
    }

    #[cfg(feature = "telemetry")]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn run(&self) {
        let mut backoff = Backoff::new();

        while self.running.load(Ordering::Acquire) {
            match self.input.try_pop() {
                Some(task) => {
                    backoff.reset();
                    self.run_one(task);
                }
                None => {
                    if backoff.is_saturated() {
                        // Park on the queue's condvar; the timeout bounds
                        // how long a shutdown signal can go unobserved.
                        if let Some(task) = self.input.wait_pop(self.idle_wait) {
                            backoff.reset();
                            self.run_one(task);
                        }
                    } else {
                        backoff.wait();
                    }
                }
            }
        }
    }

    /// Execute one pass, then consume the task or send it back for
    /// recirculation. Panics are contained to the pass: a task that
    /// unwound without marking itself complete is recirculated.
    fn run_one(&self, mut task: BoxedTask) {
        #[cfg(feature = "telemetry")]
        let start = Instant::now();

        let pass = catch_unwind(AssertUnwindSafe(|| task.execute()));

        if pass.is_err() {
            tracing::warn!(
                worker = std::thread::current().name().unwrap_or("<unnamed>"),
                "task panicked during execution pass"
            );
            #[cfg(feature = "telemetry")]
            if let Some(ref metrics) = self.metrics {
                metrics.record_panic();
            }
        }

        #[cfg(feature = "telemetry")]
        if let Some(ref metrics) = self.metrics {
            metrics.record_pass(start.elapsed().as_nanos() as u64);
        }

        if task.is_complete() {
            #[cfg(feature = "telemetry")]
            if let Some(ref metrics) = self.metrics {
                metrics.record_completed();
            }
        } else {
            self.returns.push(task);
            #[cfg(feature = "telemetry")]
            if let Some(ref metrics) = self.metrics {
                metrics.record_recirculated();
            }
        }
    }
}
