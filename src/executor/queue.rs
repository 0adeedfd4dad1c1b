//! Mutex-protected FIFO queue shared between producers and one or more
//! consumers.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Thread-safe FIFO container with non-blocking pop.
///
/// Emptiness checks are snapshots: a queue observed empty may be non-empty
/// by the time the caller acts on the answer, and vice versa. Callers that
/// need the item must pop, not check.
pub struct ConcurrentQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Append an item and wake one parked consumer. Never rejects.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Remove and return the front item, or `None` immediately if empty.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Pop the front item, parking on the queue's condvar for up to
    /// `timeout` if it is empty. Returns `None` on timeout or spurious
    /// wakeup with the queue still empty.
    pub fn wait_pop(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if let Some(item) = items.pop_front() {
            return Some(item);
        }
        self.not_empty.wait_for(&mut items, timeout);
        items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Wake every parked consumer without pushing. Used at shutdown so
    /// waiters re-check their exit condition promptly.
    pub fn notify_all(&self) {
        self.not_empty.notify_all();
    }

    /// Drop all queued items, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let count = items.len();
        items.clear();
        count
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("len", &self.len())
            .finish()
    }
}
