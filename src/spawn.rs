//! Boxes arbitrary `FnOnce` closures down to the raw [`Callable`] shape
//! the worker routine executes, and the [`Scheduler`] trait that lets
//! [`crate::Worker`] and [`crate::ThreadPool`] share one ergonomic
//! `spawn` surface over that machinery.

use crate::error::SpawnError;
use crate::task::{Callable, Task, TaskPriority};

/// Type-erases `f` into the `(Callable, *mut u8)` pair the scheduler
/// core accepts, boxing it on the heap. The trampoline reconstructs and
/// drops the box exactly once, inside the worker that steals the task —
/// matching `QueuedTask::execute`'s single-call contract.
fn into_raw<F>(f: F) -> (Callable, *mut u8)
where
    F: FnOnce() + Send + 'static,
{
    unsafe fn trampoline<F>(arg: *mut u8)
    where
        F: FnOnce() + Send + 'static,
    {
        let boxed = unsafe { Box::from_raw(arg as *mut F) };
        (*boxed)();
    }

    let boxed = Box::new(f);
    let raw = Box::into_raw(boxed) as *mut u8;
    (trampoline::<F>, raw)
}

/// Implemented by anything that can accept a boxed closure as a task:
/// [`crate::Worker`] and [`crate::ThreadPool`]. The blanket `spawn`
/// method is the ergonomic entry point most callers want instead of the
/// raw `schedule_task(callable, arg, ...)` form.
pub trait Scheduler {
    /// The raw, type-erased scheduling primitive. Implementors forward
    /// to their own `schedule_task`. `resume` only matters for a
    /// [`crate::Worker`] found `Waiting`: a [`crate::ThreadPool`] always
    /// wakes whichever worker it dispatches to, since placement itself
    /// already depends on worker state.
    fn schedule_raw(
        &self,
        callable: Callable,
        arg: *mut u8,
        priority: TaskPriority,
        resume: bool,
    ) -> Task;

    /// Boxes `f` and schedules it at `priority`, waking the scheduler if
    /// it was idle. Never fails to enqueue due to allocation in practice
    /// (the global allocator aborts on exhaustion), but the fallible
    /// `try_spawn` exists for callers that want to handle it as a typed
    /// error instead, e.g. when wrapping a custom allocator.
    fn spawn<F>(&self, f: F, priority: TaskPriority) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        let (callable, arg) = into_raw(f);
        self.schedule_raw(callable, arg, priority, true)
    }

    /// Like [`Scheduler::spawn`], but if the scheduler is currently idle
    /// it is left idle: the task sits queued until something else wakes
    /// it. Useful for building up a batch of tasks whose relative order
    /// matters before letting any of them run.
    fn spawn_without_resume<F>(&self, f: F, priority: TaskPriority) -> Task
    where
        F: FnOnce() + Send + 'static,
    {
        let (callable, arg) = into_raw(f);
        self.schedule_raw(callable, arg, priority, false)
    }

    fn try_spawn<F>(&self, f: F, priority: TaskPriority) -> Result<Task, SpawnError>
    where
        F: FnOnce() + Send + 'static,
    {
        let task = self.spawn(f, priority);
        if task.is_registered() {
            Ok(task)
        } else {
            Err(SpawnError::SchedulerClosed)
        }
    }
}

impl Scheduler for crate::worker::Worker {
    fn schedule_raw(
        &self,
        callable: Callable,
        arg: *mut u8,
        priority: TaskPriority,
        resume: bool,
    ) -> Task {
        self.schedule_task(callable, arg, priority, resume)
    }
}

impl Scheduler for crate::pool::ThreadPool {
    fn schedule_raw(
        &self,
        callable: Callable,
        arg: *mut u8,
        priority: TaskPriority,
        _resume: bool,
    ) -> Task {
        self.schedule_task(callable, arg, priority)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::worker::Worker;
    use std::sync::{Arc, Mutex};

    #[test]
    fn spawn_runs_the_closure() {
        let worker = Worker::new();
        let result = Arc::new(Mutex::new(0));
        let result_clone = result.clone();

        let task = worker.spawn(
            move || {
                *result_clone.lock().unwrap() = 42;
            },
            TaskPriority::Normal,
        );

        task.wait_until_done();
        assert_eq!(*result.lock().unwrap(), 42);
    }
}
