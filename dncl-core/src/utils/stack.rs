//! Stack growth for the recursive parse and eval entry points.
//!
//! DNCL programs recurse through user functions, and every DNCL call walks several
//! Rust frames. Instead of a fixed stack budget we grow the stack on demand.

/// Grow when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
