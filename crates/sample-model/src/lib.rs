//! Inkstream Sample Model
//!
//! Data types shared by the producer, broker, and consumer sides:
//! - Position samples and derived (velocity/acceleration) samples
//! - Derivation mode selection
//! - JSONL sample-log headers and parse/serialize helpers
//! - The audio-mapping input contract (reference deltas)

pub mod mapping;
pub mod sample;
pub mod stream;

pub use sample::{DeriveMode, DerivedSample, Sample, TimestampMs};
pub use stream::{parse_samples, serialize_samples, SampleStreamHeader};
