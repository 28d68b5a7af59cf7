//! Subscriber handles and delivery-queue lifecycle.
//!
//! Each subscriber owns a bounded queue fed by the broker. The broker keeps
//! the sending end plus a draining receiver clone: when a queue is full the
//! broker evicts that subscriber's oldest unread sample to make room for the
//! newest, so a slow consumer loses history rather than stalling the
//! producer.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use inkstream_sample_model::Sample;

/// Opaque subscriber handle, unique within a broker.
pub type SubscriberId = u64;

/// Lifecycle state of a subscriber entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Registered and backfilled; no live sample delivered yet.
    Registered,
    /// At least one live sample delivered.
    Delivering,
    /// Detached after repeated queue overflow.
    Failed,
}

/// A consumer's end of the stream: the subscriber id plus the receiving
/// half of its bounded queue. Dropping the subscription does not detach the
/// broker entry; call `SampleBroker::unsubscribe` for that.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriberId,
    rx: Receiver<Sample>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, rx: Receiver<Sample>) -> Self {
        Self { id, rx }
    }

    /// The broker-assigned handle for this subscription.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Take the next queued sample without blocking.
    pub fn try_recv(&self) -> Option<Sample> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next sample.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Sample> {
        match self.rx.recv_timeout(timeout) {
            Ok(sample) => Some(sample),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<Sample> {
        let mut samples = Vec::new();
        while let Ok(sample) = self.rx.try_recv() {
            samples.push(sample);
        }
        samples
    }

    /// Number of samples currently queued.
    pub fn queued(&self) -> usize {
        self.rx.len()
    }
}

/// Broker-side state for one subscriber.
#[derive(Debug)]
pub(crate) struct SubscriberEntry {
    pub id: SubscriberId,
    pub state: SubscriberState,
    pub consecutive_drops: u32,
    pub total_drops: u64,
    tx: Sender<Sample>,
    drain: Receiver<Sample>,
}

impl SubscriberEntry {
    pub fn new(id: SubscriberId, tx: Sender<Sample>, drain: Receiver<Sample>) -> Self {
        Self {
            id,
            state: SubscriberState::Registered,
            consecutive_drops: 0,
            total_drops: 0,
            tx,
            drain,
        }
    }

    /// Queue a backfill sample during registration. Returns false if the
    /// queue is already full (depth smaller than the backfill).
    pub fn backfill(&self, sample: Sample) -> bool {
        self.tx.try_send(sample).is_ok()
    }

    /// Offer a live sample without blocking. A full queue evicts this
    /// subscriber's oldest unread sample to admit the newest; that counts
    /// as one drop. Returns true when nothing was displaced.
    pub fn offer(&mut self, sample: Sample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => {
                self.state = SubscriberState::Delivering;
                self.consecutive_drops = 0;
                true
            }
            Err(TrySendError::Full(sample)) => {
                let _ = self.drain.try_recv();
                let _ = self.tx.try_send(sample);
                self.state = SubscriberState::Delivering;
                self.consecutive_drops += 1;
                self.total_drops += 1;
                false
            }
            // Unreachable while the entry holds its drain clone, but a
            // closed channel is a drop, not a panic.
            Err(TrySendError::Disconnected(_)) => {
                self.consecutive_drops += 1;
                self.total_drops += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn sample(sequence: u64) -> Sample {
        Sample::new(sequence, sequence as i64, sequence as f64, 0.0, 0.0)
    }

    fn entry_with_depth(depth: usize) -> (SubscriberEntry, Receiver<Sample>) {
        let (tx, rx) = bounded(depth);
        (SubscriberEntry::new(0, tx, rx.clone()), rx)
    }

    #[test]
    fn test_offer_delivers_in_order() {
        let (mut entry, rx) = entry_with_depth(4);
        for i in 0..3 {
            assert!(entry.offer(sample(i)));
        }
        let got: Vec<u64> = rx.try_iter().map(|s| s.sequence).collect();
        assert_eq!(got, vec![0, 1, 2]);
        assert_eq!(entry.state, SubscriberState::Delivering);
    }

    #[test]
    fn test_full_queue_drops_oldest_never_newest() {
        let (mut entry, rx) = entry_with_depth(2);
        assert!(entry.offer(sample(0)));
        assert!(entry.offer(sample(1)));
        assert!(!entry.offer(sample(2)));

        let got: Vec<u64> = rx.try_iter().map(|s| s.sequence).collect();
        assert_eq!(got, vec![1, 2]);
        assert_eq!(entry.total_drops, 1);
    }

    #[test]
    fn test_successful_delivery_resets_consecutive_drops() {
        let (mut entry, rx) = entry_with_depth(1);
        assert!(entry.offer(sample(0)));
        assert!(!entry.offer(sample(1)));
        assert!(!entry.offer(sample(2)));
        assert_eq!(entry.consecutive_drops, 2);

        // Consumer catches up
        let _ = rx.try_recv();
        assert!(entry.offer(sample(3)));
        assert_eq!(entry.consecutive_drops, 0);
        assert_eq!(entry.total_drops, 2);
    }

    #[test]
    fn test_subscription_drain() {
        let (entry, rx) = entry_with_depth(8);
        for i in 0..5 {
            assert!(entry.backfill(sample(i)));
        }
        let subscription = Subscription::new(entry.id, rx);
        assert_eq!(subscription.queued(), 5);
        let drained = subscription.drain();
        assert_eq!(drained.len(), 5);
        assert!(subscription.try_recv().is_none());
    }
}
