//! Stack headroom for the recursive passes.
//!
//! The parser, resolver and interpreter all recurse once per nesting level of
//! the program.  Their recursive entry points run through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated stack
//! segment when the current one runs low, so deeply nested source cannot
//! overflow the thread's stack.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
