//! rondo: a fixed-capacity worker-thread task scheduler.
//!
//! A pool of long-lived worker threads, each fed from its own queue, with
//! round-robin task distribution, graceful shutdown, and a return-queue
//! recovery path for tasks that could not finish in a single pass.
//!
//! # Quick Start
//!
//! ```no_run
//! use rondo_rs::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! // Start the global pool, one worker per hardware thread.
//! rondo_rs::init().unwrap();
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = counter.clone();
//! rondo_rs::submit(OnceTask::boxed(move || {
//!     c.fetch_add(1, Ordering::SeqCst);
//! }))
//! .unwrap();
//!
//! // Once per frame: put partially-finished tasks back into rotation.
//! rondo_rs::tick().unwrap();
//!
//! rondo_rs::shutdown().unwrap();
//! ```
//!
//! # Design
//!
//! - **Per-worker queues**: each worker drains its own FIFO rather than
//!   contending on one global lock; admission is round-robin, not
//!   load-aware.
//! - **Recirculation**: a task reporting "not complete" after a pass moves
//!   to a shared return queue and re-enters rotation on the next
//!   [`tick`](runtime::tick), possibly on a different worker.
//! - **Single shutdown signal**: one shared flag flip stops every worker;
//!   tasks still queued at that point are discarded by policy.

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod runtime;
pub mod util;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{BoxedTask, ConcurrentQueue, OnceTask, PoolState, Task, TaskFn, ThreadPool};
pub use runtime::{init, init_with_config, is_drained, shutdown, submit, tick};
