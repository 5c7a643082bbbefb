//! Fractional ordering keys for lists and cards.
//!
//! Siblings are ordered by an `f64` position. Inserting between two
//! neighbours picks a value strictly between them, so no sibling ever has to
//! be renumbered. Positions need not be unique or integral; only their
//! relative order inside one parent collection is meaningful.

/// Step used when the midpoint of two neighbours collapses onto one of them.
pub const POSITION_EPSILON: f64 = 0.0001;

/// Position of the first element of an empty collection.
pub const FIRST_POSITION: f64 = 0.0;

/// Gap left between an appended element and the current last one.
pub const APPEND_STEP: f64 = 1.0;

/// Position for an element appended after `last`, or `1` for an empty
/// collection.
pub fn position_after(last: Option<f64>) -> f64 {
    match last {
        Some(last) => last + APPEND_STEP,
        None => APPEND_STEP,
    }
}

/// Position for an element inserted between `prev` and `next`.
///
/// - neither neighbour: `0`
/// - only `next`: `next - 1` (head insert)
/// - only `prev`: `prev + 1` (tail insert)
/// - both: the midpoint, or `prev + ε` once the neighbours are closer than
///   `ε` or the midpoint rounds onto one of them. The fallback keeps the
///   result strictly above `prev` but may land past `next`.
pub fn position_between(prev: Option<f64>, next: Option<f64>) -> f64 {
    match (prev, next) {
        (None, None) => FIRST_POSITION,
        (None, Some(next)) => next - APPEND_STEP,
        (Some(prev), None) => prev + APPEND_STEP,
        (Some(prev), Some(next)) => {
            let mid = (prev + next) / 2.0;
            let exhausted = (next - prev).abs() < POSITION_EPSILON
                || mid == prev
                || mid == next
                || !mid.is_finite();
            if exhausted {
                prev + POSITION_EPSILON
            } else {
                mid
            }
        }
    }
}
