//! The managed worker thread.
//!
//! Owns an OS thread, a private [`TaskQueue`], an atomic [`ThreadState`],
//! and the two waitable events the state machine needs: one to wake the
//! worker from `Waiting`, one to let `terminate()` block until the worker
//! routine has actually returned.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{Builder, JoinHandle, ThreadId};

use crate::queue::TaskQueue;
use crate::sync::{Event, INFINITE_TIMEOUT};
use crate::task::{Callable, QueuedTask, Task, TaskCounter, TaskPriority};

/// Observed state of a [`Worker`]. `Terminated` is absorbing: once entered,
/// it is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadState {
    Terminated = 0,
    Waiting = 1,
    Working = 2,
}

impl ThreadState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ThreadState::Terminated,
            1 => ThreadState::Waiting,
            2 => ThreadState::Working,
            _ => unreachable!("invalid thread state byte"),
        }
    }
}

struct AtomicThreadState {
    value: AtomicU8,
}

impl AtomicThreadState {
    fn new(initial: ThreadState) -> Self {
        AtomicThreadState {
            value: AtomicU8::new(initial as u8),
        }
    }

    /// Relaxed load: used by the observers exposed to callers (`state()`),
    /// which are informational only.
    fn load_relaxed(&self) -> ThreadState {
        ThreadState::from_u8(self.value.load(Ordering::Relaxed))
    }

    /// Acquire load: used inside the worker routine itself, establishing
    /// happens-before with the release stores mutators perform (an
    /// enqueue+resume, or a termination request).
    fn load_acquire(&self) -> ThreadState {
        ThreadState::from_u8(self.value.load(Ordering::Acquire))
    }

    fn store_release(&self, state: ThreadState) {
        self.value.store(state as u8, Ordering::Release);
    }
}

/// Construction-time knobs for a [`Worker`] (see `SPEC_FULL.md` §9).
#[derive(Debug, Clone, Default)]
pub struct WorkerConfig {
    pub name: Option<String>,
    pub stack_size: Option<usize>,
}

/// The state shared between a [`Worker`] and every [`Task`] handle it has
/// issued. Reference-counted so a handle can safely outlive the `Worker`
/// value itself (see `task::handle`'s doc comment and `DESIGN.md`).
pub struct WorkerShared {
    state: AtomicThreadState,
    pub(crate) queue: TaskQueue,
    counter: TaskCounter,
    state_event: Event,
    termination_event: Event,
    os_id: OnceLock<ThreadId>,
}

impl WorkerShared {
    fn get_state(&self) -> ThreadState {
        self.state.load_relaxed()
    }
}

/// A managed OS thread owning a private, priority-ordered task queue.
pub struct Worker {
    shared: Arc<WorkerShared>,
    join_handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a new worker, initially `Waiting`. If the OS refuses to spawn
    /// the thread, returns a worker that is already `Terminated` instead of
    /// panicking (mirrors the source's `_Attach()`, which reports a failed
    /// `CreateThread` as a stopped thread rather than aborting the
    /// process — see `SPEC_FULL.md` §7).
    pub fn new() -> Self {
        Self::with_config(WorkerConfig::default())
    }

    pub fn with_config(config: WorkerConfig) -> Self {
        let shared = Arc::new(WorkerShared {
            state: AtomicThreadState::new(ThreadState::Waiting),
            queue: TaskQueue::new(),
            counter: TaskCounter::new(),
            state_event: Event::new(),
            termination_event: Event::new(),
            os_id: OnceLock::new(),
        });

        let routine_shared = shared.clone();
        let mut builder = Builder::new();
        if let Some(name) = &config.name {
            builder = builder.name(name.clone());
        }
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        match builder.spawn(move || worker_routine(routine_shared)) {
            Ok(join_handle) => Worker {
                shared,
                join_handle: Some(join_handle),
            },
            Err(err) => {
                log::warn!("failed to spawn worker thread: {err}");
                // No routine will ever run to observe `Terminated` or
                // signal `termination_event`, so settle both here — a
                // later `terminate()` call must not block forever waiting
                // on a routine that never existed.
                shared.state.store_release(ThreadState::Terminated);
                shared.termination_event.notify();
                Worker {
                    shared,
                    join_handle: None,
                }
            }
        }
    }

    /// Spawns a new worker with one task already scheduled, leaving it
    /// `Working` from the start instead of `Waiting`.
    pub fn with_task(callable: Callable, arg: *mut u8, priority: TaskPriority) -> (Self, Task) {
        let worker = Self::new();
        let task = worker.schedule_task(callable, arg, priority, true);
        (worker, task)
    }

    /// Schedules a new task. Rejected (returns an unregistered handle) if
    /// the worker is `Terminated`. If the worker is currently `Waiting`
    /// and `resume` is `true`, transitions it to `Working` and wakes it.
    pub fn schedule_task(
        &self,
        callable: Callable,
        arg: *mut u8,
        priority: TaskPriority,
        resume: bool,
    ) -> Task {
        let state = self.shared.get_state();
        if state == ThreadState::Terminated {
            log::warn!("schedule_task rejected: worker is terminated");
            return Task::unregistered();
        }

        let id = self.shared.counter.next_id();
        log::trace!("enqueueing task {:?} at priority {:?}", id, priority);
        let queued = QueuedTask::new(id, callable, arg, priority);
        let completion = queued.completion_handle();
        self.shared.queue.enqueue(queued);

        if state == ThreadState::Waiting && resume {
            self.resume();
        }

        Task::new(id, self.shared.clone(), completion)
    }

    /// Only valid from `Working`. Sets the state to `Waiting`; the
    /// worker's own loop observes this on its next iteration and blocks —
    /// an in-progress task always runs to completion first. Returns
    /// `false` if the worker was not `Working`.
    pub fn suspend(&self) -> bool {
        if self.shared.get_state() != ThreadState::Working {
            return false;
        }

        log::debug!("suspending worker");
        self.shared.state.store_release(ThreadState::Waiting);
        true
    }

    /// Only valid from `Waiting`. Sets the state to `Working` and wakes
    /// the worker. Returns `false` if the worker was not `Waiting`.
    pub fn resume(&self) -> bool {
        if self.shared.get_state() != ThreadState::Waiting {
            return false;
        }

        log::debug!("resuming worker");
        self.shared.state.store_release(ThreadState::Working);
        self.shared.state_event.notify();
        true
    }

    /// Requests termination and blocks until the worker routine has
    /// returned. Idempotent: calling it again on an already-terminated
    /// worker is a no-op that returns immediately.
    pub fn terminate(&mut self) {
        self.shared.state.store_release(ThreadState::Terminated);

        // Notify unconditionally: if the worker was blocked `Waiting` this
        // wakes it so it observes `Terminated` instead of sleeping
        // forever; if it was `Working` and about to re-enter the
        // idle-debounce path and store `Waiting` itself, notifying
        // regardless closes that race without needing a second check.
        self.shared.state_event.notify();

        log::debug!("terminating worker, waiting for routine to exit");
        self.shared
            .termination_event
            .wait(INFINITE_TIMEOUT);

        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }

    /// Drops every pending task without executing it. Already-running
    /// tasks are unaffected. Handles of cleared tasks observe
    /// `TaskState::None` once the clear happens, not `Canceled` (see
    /// `DESIGN.md`'s resolution of the source's open question).
    pub fn cancel_all_pending_tasks(&self) {
        self.shared.queue.clear();
    }

    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.size()
    }

    pub fn state(&self) -> ThreadState {
        self.shared.get_state()
    }

    pub fn get_id(&self) -> Option<ThreadId> {
        self.shared.os_id.get().copied()
    }

    pub fn native_handle(&self) -> Option<&JoinHandle<()>> {
        self.join_handle.as_ref()
    }

    pub(crate) fn shared(&self) -> Arc<WorkerShared> {
        self.shared.clone()
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.shared.get_state() != ThreadState::Terminated || self.join_handle.is_some() {
            self.terminate();
        }
    }
}

fn worker_routine(shared: Arc<WorkerShared>) {
    let _ = shared.os_id.set(std::thread::current().id());

    let mut was_idle = false;

    loop {
        match shared.state.load_acquire() {
            ThreadState::Terminated => {
                log::trace!("worker routine observed Terminated, exiting");
                shared.termination_event.notify();
                return;
            }
            ThreadState::Waiting => {
                // Manual-reset: consume the signal here so a later,
                // unrelated wake doesn't immediately fire on a stale
                // notification left over from this one.
                shared.state_event.wait_and_reset(INFINITE_TIMEOUT);
            }
            ThreadState::Working => {
                if !shared.queue.empty() {
                    let task = shared.queue.steal();
                    was_idle = false;
                    if task.should_execute() {
                        task.execute();
                    }
                } else if was_idle {
                    // Second consecutive empty observation: go back to
                    // sleep. Not a direct transition — the idle-debounce
                    // rule exists precisely so a termination request that
                    // arrived between the first and second observation is
                    // not erased by this store (see SPEC_FULL.md §4.2).
                    shared.state.store_release(ThreadState::Waiting);
                    was_idle = false;
                } else {
                    was_idle = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::sync::Completion;
    use std::sync::atomic::AtomicUsize;

    unsafe fn increment(arg: *mut u8) {
        let counter = unsafe { &*(arg as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn fresh_worker_starts_waiting() {
        let worker = Worker::new();
        assert_eq!(worker.state(), ThreadState::Waiting);
    }

    #[test]
    fn schedule_task_resumes_a_waiting_worker() {
        let worker = Worker::new();
        let counter = AtomicUsize::new(0);

        let callable: Callable = increment;
        let task = worker.schedule_task(callable, &counter as *const _ as *mut u8, TaskPriority::Normal, true);
        task.wait_until_done();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn suspend_is_cooperative_and_does_not_interrupt_a_running_task() {
        // `suspend()` stores `Waiting` immediately regardless of an
        // in-flight task (see `SPEC_FULL.md` §4.2); the worker's own loop
        // only observes it once that task's callable has returned. So the
        // callable we schedule here is guaranteed to run to completion
        // even though `suspend()` is called, and returns `true`, while it
        // is still blocked inside the callable.
        let worker = Worker::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Completion::new());
        let release = Arc::new(Completion::new());

        let task = worker.schedule_task(
            blocking_increment,
            Box::into_raw(Box::new(BlockingArgs {
                counter: counter.clone(),
                started: started.clone(),
                release: release.clone(),
            })) as *mut u8,
            TaskPriority::Normal,
            true,
        );

        started.wait();
        assert!(worker.suspend());
        release.set_completed();
        task.wait_until_done();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(worker.state(), ThreadState::Waiting);

        assert!(worker.resume());
        assert_eq!(worker.state(), ThreadState::Working);
    }

    struct BlockingArgs {
        counter: Arc<AtomicUsize>,
        started: Arc<Completion>,
        release: Arc<Completion>,
    }

    unsafe fn blocking_increment(arg: *mut u8) {
        let args = unsafe { Box::from_raw(arg as *mut BlockingArgs) };
        args.started.set_completed();
        args.release.wait();
        args.counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn terminate_blocks_until_the_routine_exits() {
        let mut worker = Worker::new();
        worker.terminate();
        assert_eq!(worker.state(), ThreadState::Terminated);
        assert!(worker.native_handle().is_none());
    }

    #[test]
    fn terminate_drops_pending_tasks_without_executing_them() {
        let mut worker = Worker::new();
        let counter = AtomicUsize::new(0);
        let callable: Callable = increment;
        worker.schedule_task(callable, &counter as *const _ as *mut u8, TaskPriority::Normal, false);
        worker.schedule_task(callable, &counter as *const _ as *mut u8, TaskPriority::Normal, false);

        worker.terminate();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
