//! Task execution infrastructure.
//!
//! This module provides the scheduler core: the task contract, the
//! thread-safe FIFO queues, the per-thread runner loop, and the worker
//! pool that ties them together.

pub mod pool;
pub mod queue;
pub mod runner;
pub mod task;

pub use pool::{PoolState, ThreadPool};
pub use queue::ConcurrentQueue;
pub use task::{BoxedTask, OnceTask, Task, TaskFn};
