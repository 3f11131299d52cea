//! Stack growth for the recursive parser and evaluator.
//!
//! Deeply nested source (or deeply recursive Koshur programs) would otherwise
//! overflow the host stack. Recursive entry points wrap their bodies in
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment
//! when the remaining space drops below the red zone.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
