//! Task descriptors and the public task handle.

mod counter;
mod handle;
mod priority;
mod queued;
mod state;

pub use counter::TaskCounter;
pub use handle::Task;
pub use priority::TaskPriority;
pub use queued::{Callable, QueuedTask};
pub use state::TaskState;

/// Unique, per-worker task id. `0` ([`TaskId::INVALID`]) is reserved and
/// never assigned to a real task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    pub const INVALID: TaskId = TaskId(0);

    pub fn is_valid(self) -> bool {
        self != TaskId::INVALID
    }
}

/// Outcome of [`Task::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationResult {
    Success,
    AlreadyCanceled,
    TaskNotRegistered,
}
