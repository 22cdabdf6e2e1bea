//! A lightweight, user-level thread-and-task runtime.
//!
//! A [`Worker`] is a managed OS thread with its own priority-ordered task
//! queue; a [`ThreadPool`] is a collection of workers sharing load-aware
//! task placement. Both accept raw `(Callable, *mut u8)` task pairs
//! directly, or arbitrary `FnOnce` closures through the [`Scheduler`]
//! trait's [`Scheduler::spawn`].
//!
//! Suspension, resumption, and termination are all cooperative: a worker
//! only observes and acts on a state change between tasks, never mid-task.
//! There is no analogue of `SuspendThread`/`TerminateThread` here.

mod error;
mod pool;
mod queue;
mod spawn;
pub mod sync;
mod task;
mod time;
mod utils;
mod worker;

pub use error::SpawnError;
pub use pool::{PoolConfig, PoolState, PoolStatistics, ThreadPool};
pub use spawn::Scheduler;
pub use sync::{Event, Flag, Resource, SharedLock, INFINITE_TIMEOUT};
pub use task::{Callable, CancellationResult, Task, TaskId, TaskPriority, TaskState};
pub use time::{current_thread_id, hardware_concurrency, sleep_for, yield_now};
pub use worker::{ThreadState, Worker, WorkerConfig};
