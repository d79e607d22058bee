//! Simulation time units.
//!
//! All timestamps are monotonic simulation time in nanoseconds. Intervals are
//! signed so that a measurement taken against a stale reference point shows
//! up as negative instead of wrapping.

/// Monotonic simulation timestamp in nanoseconds.
pub type Nanos = u64;

/// Signed interval between two timestamps in nanoseconds.
pub type Elapsed = i64;

/// Interval from `from` to `to`.
///
/// Negative when `to` precedes `from`.
#[inline]
pub fn elapsed(from: Nanos, to: Nanos) -> Elapsed {
    to as i64 - from as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_forward() {
        assert_eq!(elapsed(1_000, 2_500), 1_500);
    }

    #[test]
    fn elapsed_backward_is_negative() {
        assert_eq!(elapsed(2_500, 1_000), -1_500);
    }
}
