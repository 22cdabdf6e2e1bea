use std::sync::atomic::{AtomicU64, Ordering};

use super::TaskId;

/// Monotonically increasing, per-worker unique task id generator.
///
/// Mirrors the source's `_Task_counter`: starts at 1, skips `0`
/// ([`TaskId::INVALID`]) on wraparound by drawing one more value instead of
/// ever handing out the reserved sentinel.
pub struct TaskCounter {
    next: AtomicU64,
}

impl TaskCounter {
    pub fn new() -> Self {
        TaskCounter {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> TaskId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        if id != TaskId::INVALID.0 {
            TaskId(id)
        } else {
            // Wrapped around onto the reserved sentinel; draw one more.
            TaskId(self.next.fetch_add(1, Ordering::Relaxed))
        }
    }
}

impl Default for TaskCounter {
    fn default() -> Self {
        Self::new()
    }
}
