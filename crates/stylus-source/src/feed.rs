//! The producer loop: paces a sample source into the broker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use inkstream_common::clock::{RateController, StreamClock};
use inkstream_common::error::InkstreamResult;
use inkstream_stream_broker::SampleBroker;

use crate::SampleSource;

/// Drives a [`SampleSource`] into a broker at a target rate.
///
/// This is the single producer context the broker expects: one feed per
/// broker, calling `ingest` serially. Per-sample rejections are logged and
/// skipped; they never abort the stream.
pub struct SampleFeed {
    source: Box<dyn SampleSource>,
    broker: Arc<SampleBroker>,
    rate: RateController,
    clock: StreamClock,
    stop_flag: Arc<AtomicBool>,
    samples_fed: u64,
}

impl SampleFeed {
    /// Create a feed pacing `source` into `broker` at `target_hz`.
    pub fn new(source: Box<dyn SampleSource>, broker: Arc<SampleBroker>, target_hz: u32) -> Self {
        Self {
            source,
            broker,
            rate: RateController::new(target_hz),
            clock: StreamClock::start(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            samples_fed: 0,
        }
    }

    /// Run the feed loop until the stop flag is set or the source ends.
    pub async fn run(&mut self) -> InkstreamResult<u64> {
        tracing::info!(source = %self.source.name(), "Sample feed started");

        while !self.stop_flag.load(Ordering::Relaxed) {
            if !self.rate.should_tick(self.clock.elapsed_ns()) {
                tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
                continue;
            }

            match self.source.next_sample() {
                Ok(Some(sample)) => match self.broker.ingest(sample) {
                    Ok(()) => self.samples_fed += 1,
                    Err(e) => {
                        tracing::warn!(error = %e, sequence = sample.sequence, "Sample rejected")
                    }
                },
                Ok(None) => {
                    tracing::info!(source = %self.source.name(), "Sample source exhausted");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Sample source error");
                }
            }
        }

        tracing::info!(samples = self.samples_fed, "Sample feed stopped");
        Ok(self.samples_fed)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Number of samples fed so far.
    pub fn samples_fed(&self) -> u64 {
        self.samples_fed
    }
}
