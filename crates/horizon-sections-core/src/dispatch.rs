//! Serial dispatch queue bound to a single thread.
//!
//! A [`SerialQueue`] is the serialization context for everything that touches
//! a view: producers on any thread submit closures, and the owning thread
//! runs them one at a time in submission order.
//!
//! - [`SerialQueue::invoke`] runs the closure immediately when called on the
//!   owning thread with nothing older pending, and enqueues it otherwise.
//! - [`SerialQueue::post`] always enqueues.
//! - [`SerialQueue::process_pending`] drains the queue. It is called by the
//!   owning thread's event loop.
//!
//! Work submitted while the queue is draining (for example, a task that
//! mutates a collection whose observers invoke more work) is appended to the
//! queue and picked up by the running drain loop. Tasks never nest.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sections_core::SerialQueue;
//! use parking_lot::Mutex;
//!
//! let queue = Arc::new(SerialQueue::new("view"));
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let (q, l) = (queue.clone(), log.clone());
//! std::thread::spawn(move || {
//!     let l2 = l.clone();
//!     q.invoke(move || l2.lock().push("from worker")).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! let l3 = log.clone();
//! queue.invoke(move || l3.lock().push("from owner")).unwrap();
//! assert_eq!(*log.lock(), vec!["from worker", "from owner"]);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::{DispatchError, Result};
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// Queue depth at which a warning is logged unless configured otherwise.
pub const DEFAULT_WARN_THRESHOLD: usize = 1024;

/// A unique identifier for a queued task.
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

struct QueuedTask {
    id: TaskId,
    task: BoxedTask,
}

/// How a submission was handled by [`SerialQueue::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The task ran before `invoke` returned.
    Inline,
    /// The task was queued for the owning thread.
    Queued(TaskId),
}

/// Single-consumer FIFO queue owned by one thread.
pub struct SerialQueue {
    name: String,
    affinity: ThreadAffinity,
    sender: Sender<QueuedTask>,
    receiver: Receiver<QueuedTask>,
    draining: AtomicBool,
    closed: AtomicBool,
    warn_threshold: AtomicUsize,
}

/// Clears the draining flag even if a task panics.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SerialQueue {
    /// Create a queue owned by the calling thread.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_affinity(name, ThreadAffinity::current())
    }

    /// Create a queue owned by the thread recorded in `affinity`.
    pub fn with_affinity(name: impl Into<String>, affinity: ThreadAffinity) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            name: name.into(),
            affinity,
            sender,
            receiver,
            draining: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            warn_threshold: AtomicUsize::new(DEFAULT_WARN_THRESHOLD),
        }
    }

    /// The queue's name, used in log output.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The thread this queue belongs to.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Returns `true` when called on the owning thread.
    pub fn is_on_context(&self) -> bool {
        self.affinity.is_same_thread()
    }

    /// Returns `true` while the owning thread is running queued work.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Set the queue depth at which a warning is logged.
    pub fn set_warn_threshold(&self, threshold: usize) {
        self.warn_threshold.store(threshold.max(1), Ordering::Relaxed);
    }

    /// Run `task` on the owning thread, inline if possible.
    ///
    /// On the owning thread with an idle, empty queue the task runs before
    /// this returns. On the owning thread with older work pending, the task
    /// is queued behind it and the queue is drained. From any other thread,
    /// or while the queue is already draining, the task is queued.
    pub fn invoke<F>(&self, task: F) -> Result<Dispatched>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_closed() {
            return Err(DispatchError::QueueClosed);
        }

        if !self.is_on_context() || self.is_draining() {
            return self.post(task).map(Dispatched::Queued);
        }

        if self.receiver.is_empty() {
            let _guard = self.begin_drain();
            task();
            self.drain_locked();
            Ok(Dispatched::Inline)
        } else {
            let id = self.post(task)?;
            self.process_pending();
            Ok(Dispatched::Queued(id))
        }
    }

    /// Queue `task` to run on the owning thread.
    pub fn post<F>(&self, task: F) -> Result<TaskId>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_closed() {
            return Err(DispatchError::QueueClosed);
        }

        let id = next_task_id();
        self.sender
            .send(QueuedTask {
                id,
                task: Box::new(task),
            })
            .map_err(|_| DispatchError::QueueClosed)?;

        let depth = self.receiver.len();
        if depth >= self.warn_threshold.load(Ordering::Relaxed) {
            crate::sections_warn!(queue = %self.name, depth, "dispatch queue is backing up");
        } else {
            tracing::trace!(target: targets::DISPATCH, queue = %self.name, task = id.as_u64(), depth, "task queued");
        }
        Ok(id)
    }

    /// Run every pending task in submission order.
    ///
    /// Returns the number of tasks run. A nested call from inside a running
    /// task returns `0`; the outer drain loop picks up anything new.
    ///
    /// # Panics
    ///
    /// Panics if called from a thread other than the owning thread.
    pub fn process_pending(&self) -> usize {
        self.affinity
            .assert_same_thread_with_msg("SerialQueue::process_pending called off its thread");

        if self.is_draining() {
            return 0;
        }

        let _guard = self.begin_drain();
        self.drain_locked()
    }

    /// Wait up to `timeout` for work, then drain everything pending.
    ///
    /// Intended for a dedicated context thread that has no other event loop.
    pub fn process_blocking(&self, timeout: Duration) -> Result<usize> {
        if !self.is_on_context() {
            return Err(DispatchError::WrongThread);
        }
        if self.is_draining() {
            return Ok(0);
        }

        let _guard = self.begin_drain();
        match self.receiver.recv_timeout(timeout) {
            Ok(first) => {
                self.run(first);
                Ok(1 + self.drain_locked())
            }
            Err(RecvTimeoutError::Timeout) => Ok(0),
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::QueueClosed),
        }
    }

    /// Stop accepting work and discard anything still queued.
    ///
    /// Returns the number of discarded tasks. Closing twice is a no-op.
    pub fn close(&self) -> usize {
        if self.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let discarded = self.receiver.try_iter().count();
        crate::sections_debug!(queue = %self.name, discarded, "dispatch queue closed");
        discarded
    }

    fn begin_drain(&self) -> DrainGuard<'_> {
        self.draining.store(true, Ordering::Release);
        DrainGuard(&self.draining)
    }

    fn drain_locked(&self) -> usize {
        let mut count = 0;
        while let Ok(queued) = self.receiver.try_recv() {
            self.run(queued);
            count += 1;
        }
        count
    }

    fn run(&self, queued: QueuedTask) {
        tracing::trace!(target: targets::DISPATCH, queue = %self.name, task = queued.id.as_u64(), "running task");
        (queued.task)();
    }
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialQueue")
            .field("name", &self.name)
            .field("affinity", &self.affinity)
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

static_assertions::assert_impl_all!(SerialQueue: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> BoxedTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |n: u32| -> BoxedTask {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(n))
        };
        (log, make)
    }

    #[test]
    fn test_invoke_inline_on_context() {
        let queue = SerialQueue::new("test");
        let (log, task) = recorder();

        assert_eq!(queue.invoke(task(1)).unwrap(), Dispatched::Inline);
        assert_eq!(*log.lock(), vec![1]);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_post_defers_until_processed() {
        let queue = SerialQueue::new("test");
        let (log, task) = recorder();

        queue.post(task(1)).unwrap();
        queue.post(task(2)).unwrap();
        assert!(log.lock().is_empty());
        assert_eq!(queue.pending_count(), 2);

        assert_eq!(queue.process_pending(), 2);
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn test_invoke_preserves_fifo_behind_pending() {
        let queue = SerialQueue::new("test");
        let (log, task) = recorder();

        queue.post(task(1)).unwrap();
        let dispatched = queue.invoke(task(2)).unwrap();

        assert!(matches!(dispatched, Dispatched::Queued(_)));
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn test_invoke_from_other_thread_is_queued() {
        let queue = Arc::new(SerialQueue::new("test"));
        let (log, task) = recorder();

        let queue_clone = queue.clone();
        let first = task(1);
        let second = task(2);
        std::thread::spawn(move || {
            assert!(!queue_clone.is_on_context());
            queue_clone.invoke(first).unwrap();
            queue_clone.invoke(second).unwrap();
        })
        .join()
        .unwrap();

        assert!(log.lock().is_empty());
        queue.process_pending();
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn test_reentrant_invoke_does_not_nest() {
        let queue = Arc::new(SerialQueue::new("test"));
        let log = Arc::new(Mutex::new(Vec::new()));

        let (q, l) = (queue.clone(), log.clone());
        queue
            .invoke(move || {
                l.lock().push("outer-start");
                let l2 = l.clone();
                q.invoke(move || l2.lock().push("inner")).unwrap();
                l.lock().push("outer-end");
            })
            .unwrap();

        assert_eq!(*log.lock(), vec!["outer-start", "outer-end", "inner"]);
    }

    #[test]
    fn test_close_rejects_and_discards() {
        let queue = SerialQueue::new("test");
        let (log, task) = recorder();

        queue.post(task(1)).unwrap();
        assert_eq!(queue.close(), 1);
        assert_eq!(queue.close(), 0);
        assert_eq!(queue.post(task(2)), Err(DispatchError::QueueClosed));
        assert_eq!(queue.invoke(task(3)), Err(DispatchError::QueueClosed));
        assert_eq!(queue.process_pending(), 0);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_drain_flag_reset_after_panic() {
        let queue = Arc::new(SerialQueue::new("test"));
        let (log, task) = recorder();

        let queue_clone = queue.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            queue_clone.invoke(|| panic!("task failure")).unwrap();
        }));
        assert!(result.is_err());
        assert!(!queue.is_draining());

        queue.invoke(task(7)).unwrap();
        assert_eq!(*log.lock(), vec![7]);
    }

    #[test]
    fn test_process_pending_off_thread_panics() {
        let queue = Arc::new(SerialQueue::new("test"));
        let queue_clone = queue.clone();
        let result = std::thread::spawn(move || {
            queue_clone.process_pending();
        })
        .join();
        assert!(result.is_err());
    }

    #[test]
    fn test_process_blocking_on_dedicated_thread() {
        let (tx, rx) = crossbeam_channel::bounded::<Arc<SerialQueue>>(1);
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_clone = log.clone();
        let context = std::thread::spawn(move || {
            let queue = Arc::new(SerialQueue::new("context"));
            tx.send(queue.clone()).unwrap();
            let mut seen = 0;
            while seen < 3 {
                seen += queue.process_blocking(Duration::from_millis(50)).unwrap();
            }
            log_clone.lock().push(seen as u32 * 100);
        });

        let queue = rx.recv().unwrap();
        for n in 0..3 {
            let log = log.clone();
            queue.invoke(move || log.lock().push(n)).unwrap();
        }
        context.join().unwrap();

        assert_eq!(*log.lock(), vec![0, 1, 2, 300]);
        assert_eq!(
            queue.process_blocking(Duration::from_millis(1)),
            Err(DispatchError::WrongThread)
        );
    }
}
