//! A single atomic boolean flag, relaxed-by-default.
//!
//! Mirrors the source's `sync_flag`: `is_set`/`set`/`clear` each come in a
//! plain form (relaxed ordering, the common case for a flag nobody
//! synchronizes other memory through) and an overload taking an explicit
//! [`Ordering`] for call sites that need stronger guarantees.

use std::sync::atomic::{AtomicBool, Ordering};

pub struct Flag {
    value: AtomicBool,
}

impl Flag {
    pub fn new(initial: bool) -> Self {
        Flag {
            value: AtomicBool::new(initial),
        }
    }

    pub fn is_set(&self) -> bool {
        self.is_set_with(Ordering::Relaxed)
    }

    pub fn is_set_with(&self, order: Ordering) -> bool {
        self.value.load(order)
    }

    pub fn set(&self) {
        self.set_with(Ordering::Relaxed)
    }

    pub fn set_with(&self, order: Ordering) {
        self.value.store(true, order)
    }

    pub fn clear(&self) {
        self.clear_with(Ordering::Relaxed)
    }

    pub fn clear_with(&self, order: Ordering) {
        self.value.store(false, order)
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_to_clear() {
        let flag = Flag::default();
        assert!(!flag.is_set());
    }

    #[test]
    fn set_and_clear_round_trip() {
        let flag = Flag::new(false);
        flag.set();
        assert!(flag.is_set());
        flag.clear();
        assert!(!flag.is_set());
    }

    #[test]
    fn explicit_ordering_overloads_agree_with_defaults() {
        let flag = Flag::new(false);
        flag.set_with(Ordering::SeqCst);
        assert!(flag.is_set_with(Ordering::SeqCst));
    }
}
