//! Process-wide supervisor around a single [`ThreadPool`].
//!
//! Engine subsystems that do not want to thread a pool handle around can
//! initialize the global runtime once at startup, submit tasks from any
//! thread, call [`tick`] once per scheduling tick, and shut down once at
//! exit.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{BoxedTask, ThreadPool};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct Runtime {
    pub(crate) pool: ThreadPool,
    config: Config,
}

impl Runtime {
    /// Build and start a pool from the given config.
    pub fn new(config: Config) -> Result<Self> {
        let mut pool = ThreadPool::new(&config)?;
        pool.initialize()?;

        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }
}

// Global runtime for the simple API
static GLOBAL_RUNTIME: RwLock<Option<Arc<Runtime>>> = RwLock::new(None);

pub fn init() -> Result<()> {
    init_with_config(Config::default())
}

pub fn init_with_config(config: Config) -> Result<()> {
    let mut slot = GLOBAL_RUNTIME.write();

    if slot.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    *slot = Some(Arc::new(Runtime::new(config)?));
    Ok(())
}

fn current_runtime() -> Result<Arc<Runtime>> {
    GLOBAL_RUNTIME
        .read()
        .as_ref()
        .cloned()
        .ok_or(Error::NotInitialized)
}

/// Submit a task to the global pool.
pub fn submit(task: BoxedTask) -> Result<()> {
    current_runtime()?.pool.queue_task(task)
}

/// Re-admit tasks that did not finish their last pass. Call once per
/// scheduling tick (e.g. once per frame).
pub fn tick() -> Result<()> {
    current_runtime()?.pool.process_returns();
    Ok(())
}

/// Best-effort check that the global pool's queues are empty.
pub fn is_drained() -> Result<bool> {
    Ok(current_runtime()?.pool.is_drained())
}

/// Tear down the global runtime, joining all workers.
///
/// If another handle to the runtime is still alive the teardown is
/// deferred to that handle's drop.
pub fn shutdown() -> Result<()> {
    let taken = GLOBAL_RUNTIME.write().take();

    match taken {
        None => Ok(()),
        Some(runtime) => match Arc::try_unwrap(runtime) {
            Ok(mut runtime) => runtime.pool.shutdown(),
            Err(_still_shared) => {
                tracing::debug!("runtime still referenced, deferring pool teardown to drop");
                Ok(())
            }
        },
    }
}
