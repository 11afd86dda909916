//! Fire-and-forget dispatch onto the UI thread.
//!
//! Platform callbacks and background work never touch a view tree directly.
//! They post a closure through a [`UiHandle`]; the UI thread later drains the
//! owning [`UiQueue`] and runs each closure with exclusive access to the
//! context (usually the view tree).
//!
//! ```
//! use horizon_trellis_core::dispatch::UiQueue;
//!
//! let queue: UiQueue<Vec<&'static str>> = UiQueue::new();
//! let handle = queue.handle();
//!
//! std::thread::spawn(move || {
//!     handle.post(|log| log.push("from worker")).unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! let mut log = Vec::new();
//! for task in queue.take_pending() {
//!     task.run(&mut log);
//! }
//! assert_eq!(log, ["from worker"]);
//! ```
//!
//! Draining takes a snapshot of the queue length first, so a task that posts
//! another task does not starve the caller; the follow-up runs on the next
//! drain.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::TrellisError;

/// A closure waiting to run on the UI thread.
pub struct UiTask<C> {
    run: Box<dyn FnOnce(&mut C) + Send>,
    label: &'static str,
}

impl<C> UiTask<C> {
    /// Wrap a closure.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        Self {
            run: Box::new(run),
            label: "task",
        }
    }

    /// Wrap a closure with a label that shows up in trace logs.
    pub fn labeled<F>(label: &'static str, run: F) -> Self
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        Self {
            run: Box::new(run),
            label,
        }
    }

    /// The label given at construction.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Run the closure.
    pub fn run(self, context: &mut C) {
        tracing::trace!(target: crate::logging::targets::DISPATCH, label = self.label, "running posted task");
        (self.run)(context);
    }
}

impl<C> std::fmt::Debug for UiTask<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiTask").field("label", &self.label).finish()
    }
}

/// The receiving end, owned by whatever lives on the UI thread.
pub struct UiQueue<C> {
    sender: Sender<UiTask<C>>,
    receiver: Receiver<UiTask<C>>,
}

impl<C> Default for UiQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> UiQueue<C> {
    /// Create an empty, unbounded queue.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// A cloneable, thread-safe handle for posting into this queue.
    pub fn handle(&self) -> UiHandle<C> {
        UiHandle {
            sender: self.sender.clone(),
        }
    }

    /// Post a task from the owning side.
    pub fn post(&self, task: UiTask<C>) {
        // The queue holds its own receiver, so the channel cannot be disconnected here.
        let _ = self.sender.send(task);
    }

    /// Number of tasks waiting.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no tasks are waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Remove the tasks queued at the time of the call.
    pub fn take_pending(&self) -> Vec<UiTask<C>> {
        let count = self.receiver.len();
        let mut tasks = Vec::with_capacity(count);
        for _ in 0..count {
            match self.receiver.try_recv() {
                Ok(task) => tasks.push(task),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if !tasks.is_empty() {
            crate::trellis_trace!(count = tasks.len(), "took pending ui tasks");
        }
        tasks
    }
}

impl<C> std::fmt::Debug for UiQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Sending end of a [`UiQueue`]. Cheap to clone and safe to move across threads.
pub struct UiHandle<C> {
    sender: Sender<UiTask<C>>,
}

impl<C> Clone for UiHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> std::fmt::Debug for UiHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle").finish_non_exhaustive()
    }
}

impl<C> UiHandle<C> {
    /// Post a closure to run on the UI thread.
    ///
    /// Fails only when the queue has been dropped.
    pub fn post<F>(&self, run: F) -> Result<(), TrellisError>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.post_task(UiTask::new(run))
    }

    /// Post an already wrapped task.
    pub fn post_task(&self, task: UiTask<C>) -> Result<(), TrellisError> {
        let label = task.label;
        self.sender.send(task).map_err(|_| {
            crate::trellis_warn!(label, "ui queue dropped, task discarded");
            TrellisError::QueueDisconnected
        })
    }
}

static_assertions::assert_impl_all!(UiHandle<()>: Send, Sync, Clone);
static_assertions::assert_impl_all!(UiTask<()>: Send);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_drain_in_order() {
        let queue: UiQueue<Vec<u32>> = UiQueue::new();
        let handle = queue.handle();
        handle.post(|v| v.push(1)).unwrap();
        handle.post(|v| v.push(2)).unwrap();
        assert_eq!(queue.pending(), 2);

        let mut values = Vec::new();
        for task in queue.take_pending() {
            task.run(&mut values);
        }
        assert_eq!(values, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_is_a_snapshot() {
        let queue: UiQueue<Vec<u32>> = UiQueue::new();
        let inner = queue.handle();
        queue.post(UiTask::labeled("outer", move |v: &mut Vec<u32>| {
            v.push(1);
            inner.post(|v| v.push(2)).unwrap();
        }));

        let mut values = Vec::new();
        for task in queue.take_pending() {
            task.run(&mut values);
        }
        assert_eq!(values, vec![1]);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_post_from_worker_thread() {
        let queue: UiQueue<u32> = UiQueue::new();
        let handle = queue.handle();
        std::thread::spawn(move || {
            handle.post(|n| *n += 5).unwrap();
        })
        .join()
        .unwrap();

        let mut n = 1;
        for task in queue.take_pending() {
            task.run(&mut n);
        }
        assert_eq!(n, 6);
    }

    #[test]
    fn test_post_after_queue_dropped() {
        let queue: UiQueue<u32> = UiQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert!(matches!(handle.post(|_| {}), Err(TrellisError::QueueDisconnected)));
    }

    #[test]
    fn test_task_label() {
        let task: UiTask<()> = UiTask::labeled("attach", |_| {});
        assert_eq!(task.label(), "attach");
        assert!(format!("{task:?}").contains("attach"));
    }
}
