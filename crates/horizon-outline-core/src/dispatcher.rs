//! Render-thread task queue.
//!
//! The outline runs on a single logical thread of control. Work that finishes
//! elsewhere (a background fetch of children, a signal emitted from a worker)
//! is posted here and executed, in posting order, when the render loop calls
//! [`Dispatcher::process_pending`] or [`Dispatcher::process_all`].
//!
//! # Example
//!
//! ```
//! use horizon_outline_core::Dispatcher;
//!
//! let dispatcher = Dispatcher::new();
//! let handle = dispatcher.handle();
//!
//! std::thread::spawn(move || {
//!     handle.post(|| println!("runs on the render thread")).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(dispatcher.process_all(), 1);
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ThreadId;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::error::{DispatchError, OutlineError, Result};
use crate::logging::targets;

/// A unique identifier for a posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// Dispatchers installed per thread, used by queued signal connections.
fn registry() -> &'static Mutex<HashMap<ThreadId, DispatchHandle>> {
    static REGISTRY: OnceLock<Mutex<HashMap<ThreadId, DispatchHandle>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns a handle to the dispatcher installed on `thread`, if any.
pub(crate) fn handle_for_thread(thread: ThreadId) -> Option<DispatchHandle> {
    registry().lock().get(&thread).cloned()
}

/// The render thread's task queue.
///
/// Create it on the thread that drives rendering. Handles obtained through
/// [`handle`](Self::handle) can be sent to any thread.
pub struct Dispatcher {
    sender: Sender<TaskData>,
    receiver: Receiver<TaskData>,
    thread: ThreadId,
    batch_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher owned by the current thread.
    pub fn new() -> Self {
        Self::with_batch_size(64)
    }

    /// Create a dispatcher that runs at most `batch_size` tasks per
    /// [`process_pending`](Self::process_pending) call.
    pub fn with_batch_size(batch_size: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            thread: std::thread::current().id(),
            batch_size: batch_size.max(1),
        }
    }

    /// Register this dispatcher as the queued-signal target of its thread.
    ///
    /// Signals emitted on other threads whose slots were connected on this
    /// thread are then delivered through this queue.
    pub fn install(&self) -> Result<()> {
        let mut registry = registry().lock();
        if registry.contains_key(&self.thread) {
            return Err(OutlineError::Dispatch(DispatchError::AlreadyInstalled {
                thread: format!("{:?}", self.thread),
            }));
        }
        registry.insert(self.thread, self.handle());
        tracing::debug!(target: targets::DISPATCH, thread = ?self.thread, "dispatcher installed");
        Ok(())
    }

    /// Returns a cloneable, `Send` handle for posting tasks.
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            sender: self.sender.clone(),
            thread: self.thread,
        }
    }

    /// Post a task from the render thread itself.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.sender.send(TaskData {
            id,
            task: Box::new(task),
        });
        id
    }

    /// Returns true if any task is waiting.
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Process up to `batch_size` tasks. Returns the number processed.
    pub fn process_pending(&self) -> usize {
        self.drain(self.batch_size)
    }

    /// Process tasks until the queue is empty, including tasks posted by the
    /// tasks themselves. Returns the number processed.
    pub fn process_all(&self) -> usize {
        self.drain(usize::MAX)
    }

    fn drain(&self, limit: usize) -> usize {
        let mut processed = 0;
        while processed < limit {
            match self.receiver.try_recv() {
                Ok(task_data) => {
                    crate::outline_trace!(task = task_data.id.as_u64(), "running task");
                    (task_data.task)();
                    processed += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        processed
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let mut registry = registry().lock();
        let ours = registry
            .get(&self.thread)
            .is_some_and(|handle| handle.sender.same_channel(&self.sender));
        if ours {
            registry.remove(&self.thread);
            crate::outline_debug!(thread = ?self.thread, "dispatcher uninstalled");
        }
    }
}

/// A `Send` handle that posts tasks onto a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatchHandle {
    sender: Sender<TaskData>,
    thread: ThreadId,
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("thread", &self.thread)
            .field("pending", &self.sender.len())
            .finish()
    }
}

impl DispatchHandle {
    /// Post a task to run on the render thread.
    ///
    /// Fails with [`DispatchError::Closed`] once the dispatcher is dropped.
    pub fn post<F>(&self, task: F) -> std::result::Result<TaskId, DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.sender
            .send(TaskData {
                id,
                task: Box::new(task),
            })
            .map_err(|_| DispatchError::Closed)?;
        Ok(id)
    }
}

static_assertions::assert_impl_all!(DispatchHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_posting_order() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let order = order.clone();
            dispatcher.post(move || order.lock().push(i));
        }

        assert!(dispatcher.has_pending());
        assert_eq!(dispatcher.process_all(), 5);
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
        assert!(!dispatcher.has_pending());
    }

    #[test]
    fn test_process_pending_respects_batch_size() {
        let dispatcher = Dispatcher::with_batch_size(2);
        for _ in 0..5 {
            dispatcher.post(|| {});
        }

        assert_eq!(dispatcher.process_pending(), 2);
        assert_eq!(dispatcher.process_pending(), 2);
        assert_eq!(dispatcher.process_pending(), 1);
        assert!(!dispatcher.has_pending());
    }

    #[test]
    fn test_handle_posts_from_other_thread() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let ran_on = Arc::new(Mutex::new(None));

        let ran_on_clone = ran_on.clone();
        std::thread::spawn(move || {
            handle
                .post(move || *ran_on_clone.lock() = Some(std::thread::current().id()))
                .unwrap();
        })
        .join()
        .unwrap();

        dispatcher.process_all();
        assert_eq!(*ran_on.lock(), Some(std::thread::current().id()));
    }

    #[test]
    fn test_post_after_drop_fails() {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        drop(dispatcher);

        assert_eq!(handle.post(|| {}), Err(DispatchError::Closed));
    }

    #[test]
    fn test_install_twice_on_same_thread_fails() {
        let first = Dispatcher::new();
        first.install().unwrap();
        let second = Dispatcher::new();
        assert!(second.install().is_err());

        drop(first);
        assert!(handle_for_thread(std::thread::current().id()).is_none());
        second.install().unwrap();
        assert!(handle_for_thread(std::thread::current().id()).is_some());
    }
}
