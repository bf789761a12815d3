//! Per-second rate computation from counter pairs.
//!
//! This module is the single source of truth for turning two cumulative
//! counter readings and an elapsed interval into a rate.

/// Computes a non-negative per-second rate between two counter readings.
///
/// The delta is taken in signed arithmetic wide enough for the full u64
/// range. A negative delta (counter reset on device reattachment, or true
/// wraparound) contributes its magnitude. Note that this is a known
/// approximation: a wrapped unsigned counter's true distance would need
/// modulo arithmetic over the counter width, not a sign flip. The
/// magnitude behavior is kept for compatibility with existing consumers.
///
/// A non-positive interval yields 0.0 rather than dividing by zero.
pub fn compute_rate(current: u64, previous: u64, interval_secs: f64) -> f64 {
    if interval_secs <= 0.0 {
        return 0.0;
    }
    let delta = current as i128 - previous as i128;
    delta.unsigned_abs() as f64 / interval_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_delta_over_interval() {
        assert!((compute_rate(150, 100, 10.0) - 5.0).abs() < 1e-9);
        assert!((compute_rate(100, 100, 10.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn regression_uses_magnitude() {
        // Counter reset: 100 -> 40 reads as |delta| = 60.
        assert!((compute_rate(40, 100, 10.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn full_range_does_not_overflow() {
        let rate = compute_rate(0, u64::MAX, 1.0);
        assert!((rate - u64::MAX as f64).abs() < 1e-9 * u64::MAX as f64);
    }

    #[test]
    fn non_positive_interval_is_zero() {
        assert_eq!(compute_rate(150, 100, 0.0), 0.0);
        assert_eq!(compute_rate(150, 100, -1.0), 0.0);
    }

    #[test]
    fn result_is_never_negative() {
        for (curr, prev) in [(0u64, 10u64), (10, 0), (5, 5), (u64::MAX, 0)] {
            assert!(compute_rate(curr, prev, 2.5) >= 0.0);
        }
    }
}
