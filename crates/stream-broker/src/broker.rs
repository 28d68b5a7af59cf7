//! The sample broker: ingestion, retention, and fan-out.
//!
//! One producer feeds `ingest` serially; any number of consumer threads may
//! subscribe and unsubscribe while it runs. A single mutex guards the
//! buffer and the subscriber registry as one unit, held only for the O(1)
//! append plus the O(subscribers) fan-out loop. Every queue operation made
//! under the lock is non-blocking, so producer throughput never depends on
//! consumer speed.

use parking_lot::Mutex;

use inkstream_common::config::BrokerDefaults;
use inkstream_common::error::{InkstreamError, InkstreamResult};
use inkstream_sample_model::Sample;

use crate::buffer::SampleBuffer;
use crate::subscriber::{SubscriberEntry, SubscriberId, SubscriberState, Subscription};

/// Broker tuning parameters.
#[derive(Debug, Clone, Copy)]
pub struct BrokerConfig {
    /// Retention capacity of the sample buffer.
    pub capacity: usize,

    /// Per-subscriber queue depth. 0 means "match capacity".
    pub queue_depth: usize,

    /// Consecutive drops before a subscriber is detached as failed.
    pub drop_threshold: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            queue_depth: 0,
            drop_threshold: 32,
        }
    }
}

impl BrokerConfig {
    fn effective_queue_depth(&self) -> usize {
        let depth = if self.queue_depth == 0 {
            self.capacity
        } else {
            self.queue_depth
        };
        depth.max(1)
    }
}

impl From<&BrokerDefaults> for BrokerConfig {
    fn from(defaults: &BrokerDefaults) -> Self {
        Self {
            capacity: defaults.capacity,
            queue_depth: defaults.queue_depth,
            drop_threshold: defaults.drop_threshold,
        }
    }
}

/// Counters describing a broker's lifetime activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    /// Samples accepted into the buffer.
    pub ingested: u64,
    /// Samples rejected as out-of-order.
    pub rejected: u64,
    /// Queued samples displaced by drop-oldest backpressure.
    pub dropped: u64,
    /// Currently registered subscribers.
    pub active_subscribers: usize,
    /// Subscribers detached after repeated overflow.
    pub failed_subscribers: u64,
}

struct BrokerInner {
    buffer: SampleBuffer,
    subscribers: Vec<SubscriberEntry>,
    next_subscriber_id: SubscriberId,
    ingested: u64,
    rejected: u64,
    dropped: u64,
    failed_subscribers: u64,
}

/// Accepts samples from the producer, retains recent history, and fans the
/// stream out to registered subscribers.
pub struct SampleBroker {
    config: BrokerConfig,
    inner: Mutex<BrokerInner>,
}

impl SampleBroker {
    /// Create a broker with the given configuration.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BrokerInner {
                buffer: SampleBuffer::new(config.capacity),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
                ingested: 0,
                rejected: 0,
                dropped: 0,
                failed_subscribers: 0,
            }),
        }
    }

    /// Create a broker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BrokerConfig::default())
    }

    /// The broker's configuration.
    pub fn config(&self) -> BrokerConfig {
        self.config
    }

    /// Register a new subscriber.
    ///
    /// The subscriber's queue is immediately backfilled with the current
    /// buffer snapshot (the most recent `queue_depth` samples if the
    /// snapshot is larger), so late joiners see recent history before live
    /// samples.
    pub fn subscribe(&self) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_subscriber_id;
        inner.next_subscriber_id += 1;

        let depth = self.config.effective_queue_depth();
        let (tx, rx) = crossbeam_channel::bounded(depth);
        let entry = SubscriberEntry::new(id, tx, rx.clone());

        let snapshot = inner.buffer.snapshot();
        let skip = snapshot.len().saturating_sub(depth);
        for sample in &snapshot[skip..] {
            entry.backfill(*sample);
        }

        tracing::debug!(
            subscriber = id,
            backfilled = snapshot.len() - skip,
            "Subscriber registered"
        );
        inner.subscribers.push(entry);
        Subscription::new(id, rx)
    }

    /// Remove a subscriber and release its queue. Idempotent: unsubscribing
    /// an unknown or already-removed id returns false.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|entry| entry.id != id);
        let removed = inner.subscribers.len() < before;
        if removed {
            tracing::debug!(subscriber = id, "Subscriber unsubscribed");
        }
        removed
    }

    /// Ingest one sample: append to the buffer, then offer it to every
    /// active subscriber queue without blocking.
    ///
    /// Out-of-order input is rejected before fan-out and the buffer left
    /// unchanged. A subscriber that accumulates `drop_threshold`
    /// consecutive drops is detached as failed, reported once.
    pub fn ingest(&self, sample: Sample) -> InkstreamResult<()> {
        let mut overflowed = Vec::new();
        {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            if let Err(e) = inner.buffer.append(sample) {
                inner.rejected += 1;
                return Err(e);
            }
            inner.ingested += 1;

            let mut dropped_now = 0u64;
            for entry in inner.subscribers.iter_mut() {
                if !entry.offer(sample) {
                    dropped_now += 1;
                }
            }
            inner.dropped += dropped_now;

            let threshold = self.config.drop_threshold;
            inner.subscribers.retain_mut(|entry| {
                if entry.consecutive_drops >= threshold {
                    entry.state = SubscriberState::Failed;
                    overflowed.push((entry.id, entry.total_drops));
                    false
                } else {
                    true
                }
            });
            inner.failed_subscribers += overflowed.len() as u64;
        }

        for (id, drops) in overflowed {
            let event = InkstreamError::subscriber_overflow(format!(
                "subscriber {id} detached after {drops} dropped samples"
            ));
            tracing::warn!(subscriber = id, drops, "{event}");
        }
        Ok(())
    }

    /// Point-in-time copy of the retained samples, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.inner.lock().buffer.snapshot()
    }

    /// Drop all retained samples and reset ordering watermarks
    /// (mode/session reset). Subscriber queues are not touched.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.buffer.clear();
        tracing::debug!("Sample buffer cleared");
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.inner.lock().buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffer.is_empty()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Lifecycle state of an active subscriber, if still registered.
    pub fn subscriber_state(&self, id: SubscriberId) -> Option<SubscriberState> {
        self.inner
            .lock()
            .subscribers
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.state)
    }

    /// Lifetime activity counters.
    pub fn stats(&self) -> BrokerStats {
        let inner = self.inner.lock();
        BrokerStats {
            ingested: inner.ingested,
            rejected: inner.rejected,
            dropped: inner.dropped,
            active_subscribers: inner.subscribers.len(),
            failed_subscribers: inner.failed_subscribers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstream_common::error::InkstreamError;

    fn sample(sequence: u64) -> Sample {
        Sample::new(sequence, sequence as i64 * 10, sequence as f64, 0.0, 0.0)
    }

    fn broker(capacity: usize, queue_depth: usize, drop_threshold: u32) -> SampleBroker {
        SampleBroker::new(BrokerConfig {
            capacity,
            queue_depth,
            drop_threshold,
        })
    }

    #[test]
    fn test_backfill_for_early_and_late_subscribers() {
        let broker = broker(100, 0, 32);
        let early = broker.subscribe();

        for i in 0..50 {
            broker.ingest(sample(i)).unwrap();
        }
        let late = broker.subscribe();

        // Late joiner sees min(50, capacity) backfilled immediately
        assert_eq!(late.queued(), 50);

        broker.ingest(sample(50)).unwrap();

        let early_seqs: Vec<u64> = early.drain().iter().map(|s| s.sequence).collect();
        let late_seqs: Vec<u64> = late.drain().iter().map(|s| s.sequence).collect();
        assert_eq!(early_seqs, (0..=50).collect::<Vec<_>>());
        assert_eq!(late_seqs, (0..=50).collect::<Vec<_>>());
    }

    #[test]
    fn test_backfill_clipped_to_queue_depth() {
        let broker = broker(100, 10, 32);
        for i in 0..50 {
            broker.ingest(sample(i)).unwrap();
        }

        let subscription = broker.subscribe();
        let seqs: Vec<u64> = subscription.drain().iter().map(|s| s.sequence).collect();
        assert_eq!(seqs, (40..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_per_subscriber_order_no_duplicates() {
        let broker = broker(200, 0, 32);
        let a = broker.subscribe();
        let b = broker.subscribe();

        for i in 0..100 {
            broker.ingest(sample(i)).unwrap();
        }

        for subscription in [&a, &b] {
            let seqs: Vec<u64> = subscription.drain().iter().map(|s| s.sequence).collect();
            assert_eq!(seqs, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_out_of_order_rejected_without_fanout() {
        let broker = broker(10, 0, 32);
        let subscription = broker.subscribe();

        broker.ingest(sample(5)).unwrap();
        let err = broker.ingest(sample(5)).unwrap_err();
        assert!(matches!(err, InkstreamError::OutOfOrderSample { .. }));

        assert_eq!(subscription.drain().len(), 1);
        let stats = broker.stats();
        assert_eq!(stats.ingested, 1);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let broker = broker(10, 0, 32);
        let subscription = broker.subscribe();
        let id = subscription.id();

        assert!(broker.unsubscribe(id));
        assert!(!broker.unsubscribe(id));
        assert_eq!(broker.subscriber_count(), 0);

        // Unsubscribed consumers receive nothing further
        broker.ingest(sample(0)).unwrap();
        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn test_slow_subscriber_fails_after_threshold() {
        let depth = 4;
        let threshold = 5;
        let broker = broker(100, depth, threshold);
        let stalled = broker.subscribe();
        let healthy = broker.subscribe();

        let mut seq = 0u64;
        let mut fed = Vec::new();
        // Fill the stalled queue, then keep going until the broker detaches it
        while broker.subscriber_state(stalled.id()).is_some() {
            broker.ingest(sample(seq)).unwrap();
            fed.push(seq);
            healthy.drain();
            seq += 1;
            assert!(seq < 1000, "stalled subscriber never failed");
        }

        // Detached exactly after depth accepted + threshold consecutive drops
        assert_eq!(seq, depth as u64 + threshold as u64);
        let stats = broker.stats();
        assert_eq!(stats.failed_subscribers, 1);
        assert_eq!(stats.active_subscribers, 1);

        // The stalled queue kept the newest samples before detachment...
        let leftover: Vec<u64> = stalled.drain().iter().map(|s| s.sequence).collect();
        assert_eq!(leftover.len(), depth);
        assert_eq!(leftover, fed[fed.len() - depth..]);

        // ...and receives nothing after it
        broker.ingest(sample(seq)).unwrap();
        assert_eq!(stalled.try_recv(), None);
    }

    #[test]
    fn test_subscriber_state_transitions() {
        let broker = broker(10, 0, 32);
        let subscription = broker.subscribe();
        assert_eq!(
            broker.subscriber_state(subscription.id()),
            Some(SubscriberState::Registered)
        );

        broker.ingest(sample(0)).unwrap();
        assert_eq!(
            broker.subscriber_state(subscription.id()),
            Some(SubscriberState::Delivering)
        );

        broker.unsubscribe(subscription.id());
        assert_eq!(broker.subscriber_state(subscription.id()), None);
    }

    #[test]
    fn test_clear_resets_retention_and_watermark() {
        let broker = broker(10, 0, 32);
        for i in 0..5 {
            broker.ingest(sample(i)).unwrap();
        }
        broker.clear();
        assert!(broker.is_empty());

        // New session restarts its counter
        broker.ingest(sample(0)).unwrap();
        assert_eq!(broker.len(), 1);

        // Late joiners see only the new session
        let subscription = broker.subscribe();
        assert_eq!(subscription.queued(), 1);
    }

    #[test]
    fn test_subscribe_races_with_ingest() {
        use std::sync::Arc;

        // Threshold high enough that non-draining subscribers survive the
        // whole run; drop-oldest still keeps their queues bounded.
        let broker = Arc::new(broker(200, 0, 10_000));
        let producer = {
            let broker = Arc::clone(&broker);
            std::thread::spawn(move || {
                for i in 0..500 {
                    broker.ingest(sample(i)).unwrap();
                }
            })
        };

        let mut subscriptions = Vec::new();
        for _ in 0..20 {
            subscriptions.push(broker.subscribe());
        }
        for subscription in subscriptions.iter().take(10) {
            broker.unsubscribe(subscription.id());
        }
        producer.join().unwrap();

        // Every surviving subscriber observed a strictly increasing sequence
        for subscription in subscriptions.iter().skip(10) {
            let seqs: Vec<u64> = subscription.drain().iter().map(|s| s.sequence).collect();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(*seqs.last().unwrap(), 499);
        }
    }
}
