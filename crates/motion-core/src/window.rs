//! Trailing time-window selection over a sample sequence.

use inkstream_sample_model::{Sample, TimestampMs};

/// Selects the trailing slice of a sample sequence relative to "now".
///
/// `show_all` (or a non-positive window) passes the input through
/// unchanged; consumers use it as the "all data" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFilter {
    /// Trailing window in milliseconds.
    pub window_ms: i64,

    /// Ignore the window and keep everything.
    pub show_all: bool,
}

impl WindowFilter {
    /// Keep all data.
    pub fn all() -> Self {
        Self {
            window_ms: 0,
            show_all: true,
        }
    }

    /// Keep the trailing `window_ms` of data.
    pub fn trailing(window_ms: i64) -> Self {
        Self {
            window_ms,
            show_all: false,
        }
    }

    /// Select the samples within the window, preserving order. The input
    /// is never mutated; the result is a copy.
    pub fn apply(&self, samples: &[Sample], now_ms: TimestampMs) -> Vec<Sample> {
        if self.show_all || self.window_ms <= 0 {
            return samples.to_vec();
        }

        samples
            .iter()
            .filter(|s| now_ms - s.timestamp_ms <= self.window_ms)
            .copied()
            .collect()
    }
}

impl Default for WindowFilter {
    /// The reference configuration: a 30-second trailing window.
    fn default() -> Self {
        Self::trailing(30_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(sequence: u64, timestamp_ms: i64) -> Sample {
        Sample::new(sequence, timestamp_ms, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_show_all_is_identity() {
        let samples: Vec<Sample> = (0..10).map(|i| sample(i, i as i64 * 100)).collect();
        let filtered = WindowFilter::all().apply(&samples, 10_000);
        assert_eq!(filtered, samples);
    }

    #[test]
    fn test_nonpositive_window_is_identity() {
        let samples: Vec<Sample> = (0..5).map(|i| sample(i, i as i64)).collect();
        assert_eq!(WindowFilter::trailing(0).apply(&samples, 100), samples);
        assert_eq!(WindowFilter::trailing(-5).apply(&samples, 100), samples);
    }

    #[test]
    fn test_trailing_window_selects_recent() {
        let samples: Vec<Sample> = (0..10).map(|i| sample(i, i as i64 * 1000)).collect();

        // now = 9s, window = 3s: keep t in [6s, 9s]
        let filtered = WindowFilter::trailing(3_000).apply(&samples, 9_000);
        let seqs: Vec<u64> = filtered.iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let samples = vec![sample(0, 0), sample(1, 500), sample(2, 1000)];
        let filtered = WindowFilter::trailing(1000).apply(&samples, 1000);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_empty_input_empty_output() {
        let filtered = WindowFilter::trailing(1000).apply(&[], 0);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_input_not_mutated_and_order_preserved() {
        let samples: Vec<Sample> = (0..6).map(|i| sample(i, i as i64 * 10)).collect();
        let before = samples.clone();
        let filtered = WindowFilter::trailing(30).apply(&samples, 50);
        assert_eq!(samples, before);
        assert!(filtered.windows(2).all(|w| w[0].sequence < w[1].sequence));
    }

    proptest! {
        /// Identity law: show_all returns any input unchanged.
        #[test]
        fn prop_show_all_is_identity(
            timestamps in proptest::collection::vec(0i64..1_000_000, 0..64),
            now_ms in 0i64..2_000_000,
        ) {
            let mut sorted = timestamps;
            sorted.sort_unstable();
            let samples: Vec<Sample> = sorted
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as u64, *t))
                .collect();

            prop_assert_eq!(WindowFilter::all().apply(&samples, now_ms), samples);
        }

        /// The trailing filter output is exactly the samples inside the
        /// window, in their original order.
        #[test]
        fn prop_trailing_selects_exactly_in_window(
            timestamps in proptest::collection::vec(0i64..10_000, 0..64),
            window_ms in 1i64..5_000,
            now_ms in 0i64..20_000,
        ) {
            let mut sorted = timestamps;
            sorted.sort_unstable();
            let samples: Vec<Sample> = sorted
                .iter()
                .enumerate()
                .map(|(i, t)| sample(i as u64, *t))
                .collect();

            let filtered = WindowFilter::trailing(window_ms).apply(&samples, now_ms);
            let expected: Vec<Sample> = samples
                .iter()
                .filter(|s| now_ms - s.timestamp_ms <= window_ms)
                .copied()
                .collect();
            prop_assert_eq!(filtered, expected);
        }
    }
}
