use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a queued task.
///
/// `None` means "no task referenced" (returned once a task handle can no
/// longer find its task in the queue). `Canceled`, `Interrupted`, and `Done`
/// are terminal: once entered, the state never changes again. Legal
/// transitions: `Enqueued -> Running` (a worker picks the task up) or
/// `Enqueued -> Canceled` (external cancellation); `Running -> Done` (the
/// callable returned) or `Running -> Interrupted` (the callable panicked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    None = 0,
    Canceled = 1,
    Enqueued = 2,
    Running = 3,
    Interrupted = 4,
    Done = 5,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::None,
            1 => TaskState::Canceled,
            2 => TaskState::Enqueued,
            3 => TaskState::Running,
            4 => TaskState::Interrupted,
            5 => TaskState::Done,
            _ => unreachable!("invalid task state byte"),
        }
    }

    /// Terminal states never transition again: `Canceled`, `Interrupted`,
    /// `Done`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Canceled | TaskState::Interrupted | TaskState::Done
        )
    }
}

/// Atomic storage for a [`TaskState`].
///
/// Writer transitions use release stores; the worker's `should_execute`
/// gate uses an acquire load, establishing happens-before between an
/// external cancellation and the worker's decision whether to run the
/// callable (spec invariant: a task canceled before that load is never
/// executed).
pub struct AtomicTaskState {
    value: AtomicU8,
}

impl AtomicTaskState {
    pub fn new(initial: TaskState) -> Self {
        AtomicTaskState {
            value: AtomicU8::new(initial as u8),
        }
    }

    /// Relaxed load, for observers exposed to callers (`Task::state`).
    pub fn load_relaxed(&self) -> TaskState {
        TaskState::from_u8(self.value.load(Ordering::Relaxed))
    }

    /// Acquire load, used by the worker's `should_execute` gate.
    pub fn load_acquire(&self) -> TaskState {
        TaskState::from_u8(self.value.load(Ordering::Acquire))
    }

    /// Release store, used for every writer-side transition.
    pub fn store_release(&self, state: TaskState) {
        self.value.store(state as u8, Ordering::Release);
    }

    /// Stores `Canceled` iff the current state is not already `Canceled`.
    /// Returns `true` if this call performed the transition.
    pub fn cancel_if_not_canceled(&self) -> bool {
        // Relaxed load/store: mirrors the source, which accesses the
        // cancellation path with relaxed ordering; the happens-before edge
        // that matters (cancel-before-should_execute) is carried by the
        // acquire load in `load_acquire`, not by this store's ordering.
        loop {
            let current = self.value.load(Ordering::Relaxed);
            if TaskState::from_u8(current) == TaskState::Canceled {
                return false;
            }

            if self
                .value
                .compare_exchange(
                    current,
                    TaskState::Canceled as u8,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                return true;
            }
        }
    }
}
