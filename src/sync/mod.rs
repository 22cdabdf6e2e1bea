//! Synchronization primitives consumed by the scheduler core.
//!
//! These are the collaborators spec'd at the interface level only: a
//! reader/writer lock, a waitable event, an atomic flag, and a generic
//! shared-resource wrapper. None of them know anything about tasks,
//! threads, or priorities; the scheduler core in [`crate::queue`],
//! [`crate::worker`], and [`crate::pool`] is built on top of them.

mod event;
mod flag;
mod resource;
mod rwlock;

pub use event::{Event, INFINITE_TIMEOUT};
pub use flag::Flag;
pub use resource::Resource;
pub use rwlock::{ExclusiveGuard, SharedGuard, SharedLock};
