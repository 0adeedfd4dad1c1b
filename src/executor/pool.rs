//! Worker pool lifecycle, round-robin admission, and return-queue
//! recirculation.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::queue::ConcurrentQueue;
use crate::executor::runner::TaskRunner;
use crate::executor::task::BoxedTask;

#[cfg(feature = "telemetry")]
use crate::telemetry::Metrics;

/// Lifecycle of a pool. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolState {
    Uninitialized = 0,
    Running = 1,
    ShuttingDown = 2,
    Terminated = 3,
}

fn state_from_u8(value: u8) -> PoolState {
    match value {
        0 => PoolState::Uninitialized,
        1 => PoolState::Running,
        2 => PoolState::ShuttingDown,
        _ => PoolState::Terminated,
    }
}

/// One worker: its join handle paired with the queue that feeds it.
struct WorkerSlot {
    id: usize,
    queue: Arc<ConcurrentQueue<BoxedTask>>,
    thread: Option<JoinHandle<()>>,
}

/// Fixed-capacity pool of long-lived worker threads, each fed from its own
/// queue.
///
/// Tasks are admitted round-robin across the per-worker queues; a task
/// whose pass ends without completion lands on a shared return queue and
/// re-enters rotation on the next [`process_returns`] tick, so it cannot
/// stay pinned to a worker that cannot finish it alone.
///
/// [`process_returns`]: ThreadPool::process_returns
pub struct ThreadPool {
    workers: Vec<WorkerSlot>,
    returns: Arc<ConcurrentQueue<BoxedTask>>,
    cursor: AtomicUsize,
    running: Arc<AtomicBool>,
    state: AtomicU8,
    num_threads: usize,
    thread_name_prefix: String,
    stack_size: Option<usize>,
    idle_wait: Duration,
    #[cfg(feature = "telemetry")]
    metrics: Arc<Metrics>,
}

impl ThreadPool {
    /// Build the queues and admission state without spawning any threads.
    /// Tasks may already be queued in this state; they sit untouched until
    /// [`initialize`](ThreadPool::initialize) starts the workers.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let num_threads = config.worker_threads();
        let workers = (0..num_threads)
            .map(|id| WorkerSlot {
                id,
                queue: Arc::new(ConcurrentQueue::new()),
                thread: None,
            })
            .collect();

        Ok(Self {
            workers,
            returns: Arc::new(ConcurrentQueue::new()),
            cursor: AtomicUsize::new(0),
            running: Arc::new(AtomicBool::new(true)),
            state: AtomicU8::new(PoolState::Uninitialized as u8),
            num_threads,
            thread_name_prefix: config.thread_name_prefix.clone(),
            stack_size: config.stack_size,
            idle_wait: config.idle_wait,
            #[cfg(feature = "telemetry")]
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Spawn one worker thread per queue and transition to `Running`.
    ///
    /// A spawn failure is fatal: already-spawned workers are torn down and
    /// the error is propagated; the pool ends up `Terminated`.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state() != PoolState::Uninitialized {
            return Err(Error::executor("pool already initialized"));
        }

        tracing::info!(workers = self.num_threads, "starting thread pool");

        for i in 0..self.workers.len() {
            let slot = &self.workers[i];
            let runner = TaskRunner::new(
                self.running.clone(),
                slot.queue.clone(),
                self.returns.clone(),
                self.idle_wait,
            );
            #[cfg(feature = "telemetry")]
            let runner = runner.with_metrics(self.metrics.clone());

            let mut builder =
                thread::Builder::new().name(format!("{}-{}", self.thread_name_prefix, slot.id));
            if let Some(size) = self.stack_size {
                builder = builder.stack_size(size);
            }

            match builder.spawn(move || runner.run()) {
                Ok(handle) => self.workers[i].thread = Some(handle),
                Err(e) => {
                    self.shutdown_inner();
                    return Err(Error::executor(format!(
                        "failed to spawn worker {}: {}",
                        i, e
                    )));
                }
            }
        }

        self.set_state(PoolState::Running);
        Ok(())
    }

    /// Admit a task, assigning it to the next work queue in round-robin
    /// order. This is the sole admission path; there is no direct-to-worker
    /// targeting, and a slow worker still receives its share.
    ///
    /// Never blocks the caller beyond lock contention and never rejects for
    /// capacity. Fails only once shutdown has begun.
    pub fn queue_task(&self, task: BoxedTask) -> Result<()> {
        match self.state() {
            PoolState::Uninitialized | PoolState::Running => {}
            _ => return Err(Error::NotRunning),
        }

        // Pre-incremented cursor: the first submission lands on queue 1 and
        // rotation wraps back to queue 0. The atomic increment keeps
        // concurrent producers from colliding on one target index.
        let idx = self
            .cursor
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
            % self.num_threads;
        self.workers[idx].queue.push(task);
        Ok(())
    }

    /// Drain the return queue and re-admit every task through the
    /// round-robin path. Invoked once per scheduling tick by the owning
    /// supervisor; this is the retry mechanism for tasks that yield after
    /// partial progress.
    pub fn process_returns(&self) {
        while let Some(task) = self.returns.try_pop() {
            if self.queue_task(task).is_err() {
                break;
            }
        }
    }

    /// Best-effort check that every work queue and the return queue is
    /// empty. A true result says nothing about tasks currently executing,
    /// and the answer may be stale by the time the caller acts on it.
    pub fn is_drained(&self) -> bool {
        self.workers.iter().all(|slot| slot.queue.is_empty()) && self.returns.is_empty()
    }

    /// Snapshot of per-queue occupancy, in worker order.
    pub fn queue_depths(&self) -> Vec<usize> {
        self.workers.iter().map(|slot| slot.queue.len()).collect()
    }

    /// Total tasks currently queued, including the return queue.
    pub fn pending_tasks(&self) -> usize {
        self.workers
            .iter()
            .map(|slot| slot.queue.len())
            .sum::<usize>()
            + self.returns.len()
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn state(&self) -> PoolState {
        state_from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[cfg(feature = "telemetry")]
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Stop every worker and discard whatever is still queued.
    ///
    /// Flips the shared running flag, wakes parked workers, joins each
    /// thread in turn, then clears all queues. Tasks still queued at this
    /// point are dropped without execution; a worker that cannot be joined
    /// cleanly is logged, not escalated. Idempotent.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state() == PoolState::Terminated {
            return Ok(());
        }
        self.set_state(PoolState::ShuttingDown);
        self.shutdown_inner();
        Ok(())
    }

    fn shutdown_inner(&mut self) {
        // The single memory-visible write every runner polls for.
        self.running.store(false, Ordering::Release);

        for slot in &self.workers {
            slot.queue.notify_all();
        }

        for slot in &mut self.workers {
            if let Some(handle) = slot.thread.take() {
                if handle.join().is_err() {
                    tracing::error!(worker = slot.id, "worker thread was not joinable cleanly");
                }
            }
        }

        let mut discarded = 0;
        for slot in &self.workers {
            discarded += slot.queue.clear();
        }
        discarded += self.returns.clear();
        if discarded > 0 {
            tracing::debug!(discarded, "discarded queued tasks at shutdown");
            #[cfg(feature = "telemetry")]
            self.metrics.record_discarded(discarded as u64);
        }

        self.set_state(PoolState::Terminated);
        tracing::info!("thread pool stopped");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
