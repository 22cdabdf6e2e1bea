//! A reader/writer lock over a protected value, with RAII scope guards.
//!
//! Modeled after the source's slim reader/writer lock (`shared_lock` /
//! `lock_guard` / `shared_lock_guard`): exclusive access for writers, shared
//! access for readers, guaranteed release on every exit path including
//! unwinding. Built on [`std::sync::RwLock`] rather than a raw OS primitive,
//! since this crate targets portable, memory-safe locking rather than a
//! specific platform's SRWLOCK.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reader/writer lock guarding `T`.
///
/// `lock()` acquires exclusive access, `lock_shared()` acquires shared
/// access. Both return RAII guards that release the lock on drop.
pub struct SharedLock<T> {
    inner: RwLock<T>,
}

/// RAII guard holding the lock in exclusive mode.
pub type ExclusiveGuard<'a, T> = RwLockWriteGuard<'a, T>;

/// RAII guard holding the lock in shared mode.
pub type SharedGuard<'a, T> = RwLockReadGuard<'a, T>;

impl<T> SharedLock<T> {
    pub fn new(value: T) -> Self {
        SharedLock {
            inner: RwLock::new(value),
        }
    }

    /// Acquires the lock in exclusive mode.
    ///
    /// Poisoning is treated as impossible to recover from meaningfully here:
    /// a panic while holding the queue lock would leave queue invariants in
    /// an unknown state, so we propagate the poison panic rather than paper
    /// over it.
    pub fn lock(&self) -> ExclusiveGuard<'_, T> {
        self.inner.write().expect("rwlock poisoned")
    }

    /// Acquires the lock in shared mode.
    pub fn lock_shared(&self) -> SharedGuard<'_, T> {
        self.inner.read().expect("rwlock poisoned")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exclusive_guard_mutates_the_value() {
        let lock = SharedLock::new(0);
        *lock.lock() += 1;
        assert_eq!(*lock.lock_shared(), 1);
    }

    #[test]
    fn multiple_shared_guards_coexist() {
        let lock = SharedLock::new(String::from("hi"));
        let a = lock.lock_shared();
        let b = lock.lock_shared();
        assert_eq!(*a, "hi");
        assert_eq!(*b, "hi");
    }
}
