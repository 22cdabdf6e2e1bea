use std::sync::Arc;

use crate::sync::{Event, INFINITE_TIMEOUT};
use crate::worker::WorkerShared;

use super::priority::TaskPriority;
use super::state::TaskState;
use super::{CancellationResult, TaskId};

/// A cheap, movable handle to a previously scheduled task.
///
/// Every operation first checks [`Task::is_registered`], then locates the
/// live [`super::QueuedTask`] in the worker's queue. Holds a reference-
/// counted pointer to the worker's shared state rather than a borrowed
/// reference (see `DESIGN.md`'s resolution of the source's "handle must not
/// outlive worker" design note) — a handle can safely outlive the
/// [`crate::Worker`] it came from, though by the time the worker has been
/// torn down, every one of its tasks has necessarily reached a terminal
/// state or been cleared.
///
/// The completion event is captured once, at construction time, rather than
/// re-derived by looking the task back up in the queue: by the time a
/// caller gets around to calling `wait_until_done`, the task may already
/// have been stolen out of the queue for execution, so a fresh lookup can no
/// longer find it — see `DESIGN.md`'s resolution of the source's dangling-
/// node design note.
pub struct Task {
    id: TaskId,
    worker: Option<Arc<WorkerShared>>,
    completion: Option<Arc<Event>>,
}

impl Task {
    pub(crate) fn new(id: TaskId, worker: Arc<WorkerShared>, completion: Arc<Event>) -> Self {
        Task {
            id,
            worker: Some(worker),
            completion: Some(completion),
        }
    }

    /// An unregistered handle: not associated with any task. Returned when
    /// scheduling was rejected (see `Worker::schedule_task`,
    /// `ThreadPool::schedule_task`).
    pub fn unregistered() -> Self {
        Task {
            id: TaskId::INVALID,
            worker: None,
            completion: None,
        }
    }

    /// A handle is registered iff it carries both a valid id and a worker
    /// reference.
    pub fn is_registered(&self) -> bool {
        self.id.is_valid() && self.worker.is_some()
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `TaskState::None` if the task is no longer in the queue
    /// (already executed and removed, or cleared) or the handle was never
    /// registered.
    pub fn state(&self) -> TaskState {
        match &self.worker {
            Some(worker) => worker
                .queue
                .with_task(self.id, |t| t.state.load_relaxed())
                .unwrap_or(TaskState::None),
            None => TaskState::None,
        }
    }

    /// Returns `TaskPriority::None` under the same conditions as
    /// [`Task::state`].
    pub fn priority(&self) -> TaskPriority {
        match &self.worker {
            Some(worker) => worker
                .queue
                .with_task(self.id, |t| t.priority)
                .unwrap_or(TaskPriority::None),
            None => TaskPriority::None,
        }
    }

    /// Cancels the task: sets its state to `Canceled` if not already so.
    /// Has no effect on a task that is no longer in the queue (already
    /// running or completed) beyond reporting `TaskNotRegistered` — the
    /// task runs to completion and settles into `Done` or `Interrupted`.
    pub fn cancel(&self) -> CancellationResult {
        let worker = match &self.worker {
            Some(worker) => worker,
            None => return CancellationResult::TaskNotRegistered,
        };

        let cancelled = worker.queue.with_task(self.id, |t| t.state.cancel_if_not_canceled());
        match cancelled {
            Some(true) => {
                log::trace!("task {:?} canceled", self.id);
                CancellationResult::Success
            }
            Some(false) => CancellationResult::AlreadyCanceled,
            None => CancellationResult::TaskNotRegistered,
        }
    }

    /// Blocks until the task's completion event fires. The event is
    /// captured at scheduling time, so this works regardless of whether the
    /// task is still queued, has already been stolen for execution, or has
    /// already finished by the time this is called — a manual-reset event
    /// that already fired satisfies `wait` immediately. A no-op for an
    /// unregistered handle.
    ///
    /// Uses the non-consuming `wait` rather than `wait_and_reset`: the
    /// completion event is exclusively owned by this task (never reused
    /// across tasks), so nothing needs its signal cleared, and a second
    /// call to `wait_until_done` — or a concurrent one from another thread
    /// holding a clone of this handle — must also return immediately
    /// instead of blocking forever on a signal the first call already
    /// consumed.
    pub fn wait_until_done(&self) {
        if let Some(event) = &self.completion {
            event.wait(INFINITE_TIMEOUT);
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Task::unregistered()
    }
}
