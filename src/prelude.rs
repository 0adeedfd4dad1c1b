pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{BoxedTask, ConcurrentQueue, OnceTask, PoolState, Task, TaskFn, ThreadPool};
pub use crate::runtime::Runtime;
pub use crate::{init, init_with_config, shutdown, submit, tick};

#[cfg(feature = "telemetry")]
pub use crate::telemetry::{Metrics, MetricsSnapshot};
