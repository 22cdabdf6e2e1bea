use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::sync::Event;

use super::priority::TaskPriority;
use super::state::{AtomicTaskState, TaskState};
use super::TaskId;

/// A raw, type-erased callable: function pointer plus an opaque argument
/// pointer. This is the internal worker's entire contract — kept this
/// narrow so it stays cheap and object-safe; [`crate::spawn`] is the layer
/// that boxes arbitrary closures down to this shape.
pub type Callable = unsafe fn(*mut u8);

/// A task resident in a [`crate::queue::TaskQueue`].
///
/// Constructed on enqueue, destroyed when removed from the queue (either by
/// being stolen for execution, or by [`crate::queue::TaskQueue::clear`]).
/// Exclusively owned by its queue node; a [`crate::Task`] handle only ever
/// borrows into it while holding (or briefly having held) the queue's lock.
pub struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) state: AtomicTaskState,
    pub(crate) priority: TaskPriority,
    /// Reference-counted independently of this node: `Worker::schedule_task`
    /// clones this handle into the returned [`crate::Task`] before the node
    /// is ever enqueued, so `Task::wait_until_done` never needs to look the
    /// node back up — which would fail once the node has been stolen off
    /// the queue for execution (see `DESIGN.md`'s resolution of the
    /// source's dangling-node design note, §9/§4.3 of `SPEC_FULL.md`).
    pub(crate) completion: Arc<Event>,
    callable: Callable,
    arg: *mut u8,
}

// Safety: `arg` originates from a `Box<F>` with `F: Send + 'static` (see
// `crate::spawn`), type-erased into a raw pointer. Exactly one thread — the
// worker that steals this task — ever dereferences `arg`, and it does so at
// most once, so moving the pointer to that thread is equivalent to moving
// the original `Box<F>` there.
unsafe impl Send for QueuedTask {}

impl QueuedTask {
    pub fn new(id: TaskId, callable: Callable, arg: *mut u8, priority: TaskPriority) -> Self {
        QueuedTask {
            id,
            state: AtomicTaskState::new(TaskState::Enqueued),
            priority,
            completion: Arc::new(Event::new()),
            callable,
            arg,
        }
    }

    /// The sentinel task returned by [`crate::queue::TaskQueue::steal`] on
    /// an empty queue: `id == 0`, state `Canceled`, priority `Idle`,
    /// callable absent.
    pub fn sentinel() -> Self {
        QueuedTask {
            id: TaskId::INVALID,
            state: AtomicTaskState::new(TaskState::Canceled),
            priority: TaskPriority::Idle,
            completion: Arc::new(Event::new()),
            callable: |_| {},
            arg: std::ptr::null_mut(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == TaskId::INVALID
    }

    /// Acquire-load gate: only a task still observed as `Enqueued` at this
    /// point may be executed. Closes the race between an external
    /// cancellation (a release store to `Canceled`) and the worker picking
    /// the task up.
    pub fn should_execute(&self) -> bool {
        self.state.load_acquire() == TaskState::Enqueued
    }

    /// Clones the reference-counted completion event, so a caller can wait
    /// on it after releasing the queue lock.
    pub fn completion_handle(&self) -> Arc<Event> {
        self.completion.clone()
    }

    /// Runs the callable, catching any panic and mapping it to
    /// `Interrupted` the way the source maps a thrown exception — the
    /// panic never propagates across the worker boundary. Notifies the
    /// completion event unconditionally, regardless of outcome.
    pub fn execute(&self) {
        self.state.store_release(TaskState::Running);

        let callable = self.callable;
        let arg = self.arg;
        let result = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
            callable(arg);
        }));

        match result {
            Ok(()) => self.state.store_release(TaskState::Done),
            Err(_) => self.state.store_release(TaskState::Interrupted),
        }

        self.completion.notify();
    }
}

/// Guarantees the completion event always eventually fires, even on a path
/// that never calls [`QueuedTask::execute`]: a cancel-race skip in the
/// worker routine (`should_execute()` returning `false`), or
/// [`crate::queue::TaskQueue::clear`] dropping every still-queued node. A
/// waiter blocked in `Task::wait_until_done` must never be stranded.
impl Drop for QueuedTask {
    fn drop(&mut self) {
        self.completion.notify();
    }
}
