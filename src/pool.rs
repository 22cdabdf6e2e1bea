//! The thread pool: a set of [`Worker`]s distributing tasks by a
//! load-aware placement policy.

use crate::task::{Callable, Task, TaskPriority};
use crate::worker::{ThreadState, Worker, WorkerConfig};

/// Aggregate state of a [`ThreadPool`], tracked explicitly rather than
/// derived from its workers' individual states: `Closed` (no workers,
/// absorbing once reached — transitioning back requires building a new
/// pool), `Working` (the pool accepts scheduling; set at construction for
/// any nonempty pool, regardless of whether a given worker happens to be
/// idle), `Waiting` (the pool has been explicitly [`ThreadPool::suspend`]ed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Closed,
    Waiting,
    Working,
}

/// Construction-time knobs for a [`ThreadPool`] (see `SPEC_FULL.md` §9).
/// Each worker in the pool is built from `worker`, with `name_prefix`
/// (if set) combined with the worker's index to produce a per-thread name.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    pub worker: WorkerConfig,
    pub name_prefix: Option<String>,
}

/// Snapshot of the pool's load, returned by [`ThreadPool::collect_statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStatistics {
    pub waiting_threads: usize,
    pub working_threads: usize,
    pub pending_tasks: usize,
}

/// A fixed- or variable-size collection of [`Worker`]s sharing task
/// placement. Each worker still owns its own private queue — the pool
/// only decides *which* worker a new task lands on.
pub struct ThreadPool {
    workers: Vec<Worker>,
    config: PoolConfig,
    state: PoolState,
}

impl ThreadPool {
    /// Builds a pool of `count` workers, each initially `Waiting`. `count
    /// == 0` produces a pool that is already `Closed`; a nonempty pool
    /// starts `Working`, not `Waiting` — `Waiting` is reserved for a pool
    /// that has been explicitly [`ThreadPool::suspend`]ed.
    pub fn new(count: usize) -> Self {
        Self::with_config(count, PoolConfig::default())
    }

    pub fn with_config(count: usize, config: PoolConfig) -> Self {
        let mut pool = ThreadPool {
            workers: Vec::with_capacity(count),
            config,
            state: if count == 0 {
                PoolState::Closed
            } else {
                PoolState::Working
            },
        };
        for _ in 0..count {
            pool.push_worker();
        }
        pool
    }

    fn push_worker(&mut self) {
        let index = self.workers.len();
        let mut worker_config = self.config.worker.clone();
        if worker_config.name.is_none() {
            if let Some(prefix) = &self.config.name_prefix {
                worker_config.name = Some(format!("{prefix}-{index}"));
            }
        }
        self.workers.push(Worker::with_config(worker_config));
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Places a new task on the "ideal" worker. If the pool state is
    /// `Waiting` (explicitly suspended), picks the worker with the fewest
    /// pending tasks, since no worker is awake to drain a wake-up anyway.
    /// If `Working`, prefers any currently `Waiting` worker (wakes it,
    /// giving the task a dedicated thread instead of queuing behind other
    /// work); falls back to fewest-pending if none is waiting. Returns an
    /// unregistered handle if the pool is `Closed` or has no workers.
    pub fn schedule_task(
        &self,
        callable: Callable,
        arg: *mut u8,
        priority: TaskPriority,
    ) -> Task {
        if self.state == PoolState::Closed {
            log::warn!("schedule_task rejected: pool is closed");
            return Task::unregistered();
        }

        match self.select_ideal_worker() {
            Some(worker) => worker.schedule_task(callable, arg, priority, true),
            None => {
                log::warn!("schedule_task rejected: pool has no workers");
                Task::unregistered()
            }
        }
    }

    fn select_ideal_worker(&self) -> Option<&Worker> {
        if self.workers.is_empty() {
            return None;
        }

        if self.state == PoolState::Waiting {
            return self.workers.iter().min_by_key(|w| w.pending_tasks());
        }

        if let Some(waiting) = self
            .workers
            .iter()
            .find(|w| w.state() == ThreadState::Waiting)
        {
            return Some(waiting);
        }

        self.workers.iter().min_by_key(|w| w.pending_tasks())
    }

    /// Appends `n` new `Waiting` workers. A no-op on a `Closed` pool —
    /// transitioning back from `Closed` requires building a new
    /// `ThreadPool`.
    pub fn increase_thread_count(&mut self, n: usize) {
        if self.state == PoolState::Closed {
            log::warn!("increase_thread_count rejected: pool is closed");
            return;
        }
        for _ in 0..n {
            self.push_worker();
        }
    }

    /// Removes up to `n` workers, terminating each as it is removed. Two
    /// passes: first strip `Waiting` workers from the head of the list
    /// (they have no in-flight work to disturb), then — if still short —
    /// scan the remainder for any further `Waiting` worker, and finally,
    /// if still short, force-drop workers from the head regardless of
    /// state. This minimizes how many `Working` workers get force-
    /// terminated (see `SPEC_FULL.md` §11). Removing a worker cancels its
    /// pending tasks and blocks until its thread exits.
    pub fn decrease_thread_count(&mut self, n: usize) {
        if self.state == PoolState::Closed {
            log::warn!("decrease_thread_count rejected: pool is closed");
            return;
        }

        let mut remaining = n.min(self.workers.len());
        if remaining == 0 {
            return;
        }

        // Pass 1: waiting workers from the head.
        let mut i = 0;
        while i < self.workers.len() && remaining > 0 {
            if self.workers[i].state() == ThreadState::Waiting {
                self.remove_worker_at(i);
                remaining -= 1;
            } else {
                i += 1;
            }
        }

        // Pass 2: any further waiting worker, scanning what's left.
        if remaining > 0 {
            let mut i = 0;
            while i < self.workers.len() && remaining > 0 {
                if self.workers[i].state() == ThreadState::Waiting {
                    self.remove_worker_at(i);
                    remaining -= 1;
                } else {
                    i += 1;
                }
            }
        }

        // Pass 3: force-drop from the head regardless of state.
        while remaining > 0 && !self.workers.is_empty() {
            self.remove_worker_at(0);
            remaining -= 1;
        }

        if self.workers.is_empty() {
            self.state = PoolState::Closed;
        }
    }

    fn remove_worker_at(&mut self, index: usize) {
        let mut worker = self.workers.remove(index);
        worker.cancel_all_pending_tasks();
        worker.terminate();
    }

    /// Sets the worker count to exactly `new_count`, growing or shrinking
    /// as needed.
    pub fn thread_count(&mut self, new_count: usize) {
        if self.state == PoolState::Closed {
            log::warn!("thread_count rejected: pool is closed");
            return;
        }

        let current = self.workers.len();
        if new_count > current {
            self.increase_thread_count(new_count - current);
        } else if new_count < current {
            self.decrease_thread_count(current - new_count);
        }
    }

    /// Only valid from `Working`. Sets the pool state to `Waiting`, then
    /// suspends every worker, reporting whether every one of them was
    /// successfully suspended. Returns `false` without suspending anything
    /// if the pool was not `Working`.
    pub fn suspend(&mut self) -> bool {
        if self.state != PoolState::Working {
            return false;
        }

        self.state = PoolState::Waiting;
        self.workers.iter().fold(true, |success, worker| worker.suspend() && success)
    }

    /// Only valid from `Waiting`. Sets the pool state to `Working`, then
    /// resumes every worker, reporting whether every one of them was
    /// successfully resumed. Returns `false` without resuming anything if
    /// the pool was not `Waiting`.
    pub fn resume(&mut self) -> bool {
        if self.state != PoolState::Waiting {
            return false;
        }

        self.state = PoolState::Working;
        self.workers.iter().fold(true, |success, worker| worker.resume() && success)
    }

    pub fn cancel_all_pending_tasks(&self) {
        for worker in &self.workers {
            worker.cancel_all_pending_tasks();
        }
    }

    /// Terminates and removes every worker, leaving the pool permanently
    /// `Closed`.
    pub fn close(&mut self) {
        while !self.workers.is_empty() {
            self.remove_worker_at(0);
        }
        self.state = PoolState::Closed;
    }

    pub fn collect_statistics(&self) -> PoolStatistics {
        let mut stats = PoolStatistics::default();
        for worker in &self.workers {
            match worker.state() {
                ThreadState::Waiting => stats.waiting_threads += 1,
                ThreadState::Working => stats.working_threads += 1,
                ThreadState::Terminated => {}
            }
            stats.pending_tasks += worker.pending_tasks();
        }
        stats
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_pool_is_closed() {
        let pool = ThreadPool::new(0);
        assert_eq!(pool.state(), PoolState::Closed);
    }

    #[test]
    fn nonempty_pool_starts_working() {
        // `Waiting` is reserved for a pool that has been explicitly
        // suspended; a freshly built nonempty pool is `Working` even
        // though every individual worker inside it starts out `Waiting`.
        let pool = ThreadPool::new(3);
        assert_eq!(pool.state(), PoolState::Working);
        assert_eq!(pool.worker_count(), 3);
    }

    #[test]
    fn suspend_and_resume_round_trip_pool_state() {
        let mut pool = ThreadPool::new(2);
        assert_eq!(pool.state(), PoolState::Working);

        // The pool-level transition happens unconditionally, but each
        // freshly built worker is individually idle (`Waiting`) already,
        // so `Worker::suspend()` — which requires `Working` — rejects
        // every one of them; the aggregate result reflects that.
        assert!(!pool.suspend());
        assert_eq!(pool.state(), PoolState::Waiting);
        // Already waiting: rejected outright by the precondition check.
        assert!(!pool.suspend());

        // The workers are still individually `Waiting`, so resuming them
        // now succeeds on all of them.
        assert!(pool.resume());
        assert_eq!(pool.state(), PoolState::Working);
        assert!(!pool.resume());
    }

    #[test]
    fn decreasing_to_zero_workers_closes_the_pool() {
        let mut pool = ThreadPool::new(2);
        pool.decrease_thread_count(2);
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.state(), PoolState::Closed);
    }

    #[test]
    fn increase_thread_count_is_a_no_op_on_a_closed_pool() {
        let mut pool = ThreadPool::new(0);
        pool.increase_thread_count(3);
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.state(), PoolState::Closed);
    }

    #[test]
    fn thread_count_grows_and_shrinks() {
        let mut pool = ThreadPool::new(2);
        pool.thread_count(5);
        assert_eq!(pool.worker_count(), 5);
        pool.thread_count(1);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn close_drops_every_worker() {
        let mut pool = ThreadPool::new(4);
        pool.close();
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.state(), PoolState::Closed);
    }
}
