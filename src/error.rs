//! Error taxonomy.
//!
//! The scheduler core never raises across its API boundary (see the crate's
//! design notes): `suspend`/`resume`/`terminate`/`schedule_task` report
//! state-precondition failures as `bool` or an unregistered [`crate::Task`]
//! handle, and cancellation reports its own three-way result. The one
//! exception is [`crate::spawn`], whose boxed-callable adapter allocates a
//! heap cell before it can even attempt to schedule — a caller may want to
//! distinguish "couldn't allocate" from "scheduler is closed", so that path
//! alone returns a typed [`SpawnError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpawnError {
    /// The target worker was `Terminated`, or the target pool was `Closed`.
    #[error("the scheduler is no longer accepting tasks")]
    SchedulerClosed,

    /// The heap cell backing the boxed closure could not be allocated.
    #[error("failed to allocate the task's boxed closure")]
    AllocationFailed,
}
