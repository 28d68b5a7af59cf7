//! Inkstream Stream Broker
//!
//! The stateful core of the pipeline: accepts position samples from a
//! single producer, retains a bounded history, and fans the stream out to
//! any number of independent subscribers.
//!
//! - **SampleBuffer:** fixed-capacity, time-ordered retention ring
//! - **SampleBroker:** ingest, backfill-on-subscribe, non-blocking fan-out
//! - **Subscription:** a consumer's bounded queue with drop-oldest
//!   backpressure; a slow consumer loses its own history, never stalls
//!   the producer or its peers
//!
//! Consumers only ever see snapshots and queued copies, never a live
//! reference into the buffer.

pub mod broker;
pub mod buffer;
pub mod subscriber;

pub use broker::{BrokerConfig, BrokerStats, SampleBroker};
pub use buffer::SampleBuffer;
pub use subscriber::{SubscriberId, SubscriberState, Subscription};
