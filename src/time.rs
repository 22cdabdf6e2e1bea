//! Thin wrappers over OS thread/time primitives, kept in one place so the
//! rest of the crate never reaches for `std::thread`/`std::time` directly.

use std::sync::OnceLock;
use std::thread::ThreadId;
use std::time::Duration;

pub fn current_thread_id() -> ThreadId {
    std::thread::current().id()
}

pub fn yield_now() {
    std::thread::yield_now();
}

pub fn sleep_for(millis: u64) {
    std::thread::sleep(Duration::from_millis(millis));
}

static HARDWARE_CONCURRENCY: OnceLock<usize> = OnceLock::new();

/// Number of available hardware threads, queried once and cached for the
/// lifetime of the process — matching the source's static caching of
/// `std::thread::hardware_concurrency`.
pub fn hardware_concurrency() -> usize {
    *HARDWARE_CONCURRENCY.get_or_init(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}
