//! Fixed-capacity retention buffer for position samples.
//!
//! The buffer holds the most recent `capacity` samples in arrival order,
//! evicting the oldest when full. Ordering is validated on append:
//! downstream derivative math assumes monotonic time, so a sample whose
//! sequence or timestamp regresses behind the stored history is rejected
//! and the buffer left untouched.

use std::collections::VecDeque;

use inkstream_common::error::{InkstreamError, InkstreamResult};
use inkstream_sample_model::Sample;

/// Fixed-capacity, time-ordered ring of samples.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a buffer retaining at most `capacity` samples (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when at capacity.
    ///
    /// Rejects out-of-order input: a sequence number at or behind the last
    /// stored sample, or a timestamp behind it. Equal timestamps are
    /// allowed, since multiple samples can share a millisecond.
    pub fn append(&mut self, sample: Sample) -> InkstreamResult<()> {
        if let Some(last) = self.samples.back() {
            if sample.sequence <= last.sequence {
                return Err(InkstreamError::out_of_order(format!(
                    "sequence {} after {}",
                    sample.sequence, last.sequence
                )));
            }
            if sample.timestamp_ms < last.timestamp_ms {
                return Err(InkstreamError::out_of_order(format!(
                    "timestamp {}ms after {}ms (sequence {})",
                    sample.timestamp_ms, last.timestamp_ms, sample.sequence
                )));
            }
        }

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        Ok(())
    }

    /// Point-in-time copy of the buffered samples, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Newest buffered sample.
    pub fn last(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retention capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples and reset the ordering watermark (session reset).
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(sequence: u64, timestamp_ms: i64) -> Sample {
        Sample::new(sequence, timestamp_ms, sequence as f64, 0.0, 0.0)
    }

    #[test]
    fn test_append_and_snapshot_order() {
        let mut buffer = SampleBuffer::new(10);
        for i in 0..5u64 {
            buffer.append(sample(i, i as i64 * 10)).unwrap();
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 5);
        for (i, s) in snapshot.iter().enumerate() {
            assert_eq!(s.sequence, i as u64);
        }
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let mut buffer = SampleBuffer::new(3);
        for i in 0..10u64 {
            buffer.append(sample(i, i as i64)).unwrap();
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.iter().map(|s| s.sequence).collect::<Vec<_>>(),
            vec![7, 8, 9]
        );
    }

    #[test]
    fn test_rejects_sequence_regression() {
        let mut buffer = SampleBuffer::new(10);
        buffer.append(sample(5, 100)).unwrap();

        let err = buffer.append(sample(5, 110)).unwrap_err();
        assert!(matches!(err, InkstreamError::OutOfOrderSample { .. }));
        let err = buffer.append(sample(3, 120)).unwrap_err();
        assert!(matches!(err, InkstreamError::OutOfOrderSample { .. }));

        // Buffer unaffected by rejected input
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last().unwrap().sequence, 5);
    }

    #[test]
    fn test_rejects_timestamp_regression_allows_ties() {
        let mut buffer = SampleBuffer::new(10);
        buffer.append(sample(0, 100)).unwrap();

        // Same millisecond is fine
        buffer.append(sample(1, 100)).unwrap();

        let err = buffer.append(sample(2, 99)).unwrap_err();
        assert!(matches!(err, InkstreamError::OutOfOrderSample { .. }));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_clear_resets_watermark() {
        let mut buffer = SampleBuffer::new(10);
        buffer.append(sample(50, 1000)).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());

        // A fresh session may restart its counter from zero
        buffer.append(sample(0, 0)).unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        let mut buffer = SampleBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.append(sample(0, 0)).unwrap();
        buffer.append(sample(1, 1)).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.last().unwrap().sequence, 1);
    }

    proptest! {
        /// For any n increasing appends into capacity c, the snapshot holds
        /// exactly the min(n, c) most recent samples in order.
        #[test]
        fn prop_snapshot_is_min_n_c_most_recent(n in 0usize..500, c in 1usize..300) {
            let mut buffer = SampleBuffer::new(c);
            for i in 0..n as u64 {
                buffer.append(sample(i, i as i64)).unwrap();
            }

            let snapshot = buffer.snapshot();
            prop_assert_eq!(snapshot.len(), n.min(c));

            let first = n.saturating_sub(c) as u64;
            for (offset, s) in snapshot.iter().enumerate() {
                prop_assert_eq!(s.sequence, first + offset as u64);
            }
        }
    }
}
