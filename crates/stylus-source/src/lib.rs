//! Inkstream Stylus Source
//!
//! Producer-side adapters for the sample pipeline. The broker only needs a
//! stream of ordered samples; where they come from is pluggable:
//!
//! - **Simulated:** a deterministic 3D spiral with optional noise, for
//!   development and tests without a headset
//! - **Replay:** a recorded JSONL sample log played back in order
//!
//! Samples are written in append-only JSONL format for crash safety.

pub mod feed;
pub mod replay;
pub mod sim;
pub mod writer;

use inkstream_common::error::InkstreamResult;
use inkstream_sample_model::Sample;

/// Trait for sample producers.
pub trait SampleSource: Send {
    /// Produce the next sample. Returns `None` when the source is
    /// exhausted (a live source never is).
    fn next_sample(&mut self) -> InkstreamResult<Option<Sample>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

pub use feed::SampleFeed;
pub use replay::JsonlReplaySource;
pub use sim::SimulatedStylus;
pub use writer::SampleWriter;
