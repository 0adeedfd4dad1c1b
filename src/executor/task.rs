//! Task representation and execution.

use std::fmt;

/// A unit of work the pool can run.
///
/// `execute` performs one pass; the runner queries `is_complete` afterward
/// and either drops the task or routes it to the return queue for another
/// pass on a later scheduling tick. Multi-pass tasks carry all of their
/// progress state themselves, since the next pass may run on a different
/// worker.
///
/// A task that panics without having marked itself complete is treated as
/// not complete and recirculated like any other unfinished task.
pub trait Task: Send {
    /// Run one execution pass.
    fn execute(&mut self);

    /// Whether the task finished during a previous pass.
    fn is_complete(&self) -> bool;
}

/// Owned task handle moved through the pool's queues. Single-owner by
/// construction: the box lives in exactly one queue or one worker's hands
/// at any instant.
pub type BoxedTask = Box<dyn Task>;

/// Adapter running a closure once per pass until it reports completion.
pub struct TaskFn<F> {
    f: F,
    complete: bool,
}

impl<F> TaskFn<F>
where
    F: FnMut() -> bool + Send,
{
    /// Wrap a closure; each pass calls it and records the returned
    /// completion flag.
    pub fn new(f: F) -> Self {
        Self { f, complete: false }
    }

    pub fn boxed(f: F) -> BoxedTask
    where
        F: 'static,
    {
        Box::new(Self::new(f))
    }
}

impl<F> Task for TaskFn<F>
where
    F: FnMut() -> bool + Send,
{
    fn execute(&mut self) {
        self.complete = (self.f)();
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

impl<F> fmt::Debug for TaskFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("complete", &self.complete)
            .finish()
    }
}

/// Adapter for work that finishes in a single pass.
pub struct OnceTask<F> {
    f: Option<F>,
}

impl<F> OnceTask<F>
where
    F: FnOnce() + Send,
{
    pub fn new(f: F) -> Self {
        Self { f: Some(f) }
    }

    pub fn boxed(f: F) -> BoxedTask
    where
        F: 'static,
    {
        Box::new(Self::new(f))
    }
}

impl<F> Task for OnceTask<F>
where
    F: FnOnce() + Send,
{
    fn execute(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }

    fn is_complete(&self) -> bool {
        self.f.is_none()
    }
}

impl<F> fmt::Debug for OnceTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceTask")
            .field("complete", &self.f.is_none())
            .finish()
    }
}
