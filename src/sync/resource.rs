//! A generic shared-resource wrapper with exclusive and shared visitation.
//!
//! Mirrors the source's `shared_resource<T>`: callers never get a reference
//! that outlives the guard protecting it, so `visit`/`visit_shared` pass the
//! reference into a closure instead of returning it.

use super::rwlock::{ExclusiveGuard, SharedGuard, SharedLock};

pub struct Resource<T> {
    lock: SharedLock<T>,
}

impl<T> Resource<T> {
    pub fn new(value: T) -> Self {
        Resource {
            lock: SharedLock::new(value),
        }
    }

    /// Visits the resource with exclusive access.
    pub fn visit_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.lock.lock();
        f(&mut guard)
    }

    /// Visits the resource with shared, read-only access.
    pub fn visit<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.lock.lock_shared();
        f(&guard)
    }

    /// Acquires the resource with exclusive access, returning the guard
    /// directly rather than through a closure. For callers that need to
    /// hold the guard across several operations instead of one visitation.
    pub fn get_mut(&self) -> ExclusiveGuard<'_, T> {
        self.lock.lock()
    }

    /// Acquires the resource with shared, read-only access, returning the
    /// guard directly rather than through a closure.
    pub fn get(&self) -> SharedGuard<'_, T> {
        self.lock.lock_shared()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn visit_mut_updates_the_value() {
        let resource = Resource::new(0);
        resource.visit_mut(|v| *v += 1);
        assert_eq!(resource.visit(|v| *v), 1);
    }

    #[test]
    fn visit_returns_the_closures_result() {
        let resource = Resource::new(vec![1, 2, 3]);
        let sum: i32 = resource.visit(|v| v.iter().sum());
        assert_eq!(sum, 6);
    }

    #[test]
    fn get_mut_guard_mutates_in_place() {
        let resource = Resource::new(0);
        *resource.get_mut() += 1;
        assert_eq!(*resource.get(), 1);
    }

    #[test]
    fn get_guard_coexists_with_another_shared_guard() {
        let resource = Resource::new(String::from("hi"));
        let a = resource.get();
        let b = resource.get();
        assert_eq!(*a, "hi");
        assert_eq!(*b, "hi");
    }
}
