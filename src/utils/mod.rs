//! Small test-only helpers, not part of the public API.

#[cfg(test)]
pub mod sync;
