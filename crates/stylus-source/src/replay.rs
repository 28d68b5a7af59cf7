//! Replay of recorded sample logs.

use std::path::Path;

use inkstream_common::clock::StreamClock;
use inkstream_common::error::{InkstreamError, InkstreamResult};
use inkstream_sample_model::{parse_samples, Sample};

use crate::SampleSource;

/// Plays a recorded JSONL sample log back in order.
///
/// By default samples keep their recorded timestamps (offline analysis).
/// With [`restamped`](Self::restamped), each sample is given a fresh
/// receipt time on the way out, as a live session would.
#[derive(Debug)]
pub struct JsonlReplaySource {
    samples: Vec<Sample>,
    position: usize,
    restamp: bool,
    clock: StreamClock,
    name: String,
}

impl JsonlReplaySource {
    /// Load a sample log from disk.
    pub fn from_path(path: &Path) -> InkstreamResult<Self> {
        if !path.exists() {
            return Err(InkstreamError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let samples = parse_samples(&content)?;
        Ok(Self {
            samples,
            position: 0,
            restamp: false,
            clock: StreamClock::start(),
            name: format!("replay:{}", path.display()),
        })
    }

    /// Build a replay directly from samples (tests, synthetic streams).
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            position: 0,
            restamp: false,
            clock: StreamClock::start(),
            name: "replay:memory".to_string(),
        }
    }

    /// Reassign receipt timestamps while replaying.
    pub fn restamped(mut self) -> Self {
        self.restamp = true;
        self
    }

    /// Number of samples in the log.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleSource for JsonlReplaySource {
    fn next_sample(&mut self) -> InkstreamResult<Option<Sample>> {
        let Some(mut sample) = self.samples.get(self.position).copied() else {
            return Ok(None);
        };
        self.position += 1;
        if self.restamp {
            sample.timestamp_ms = self.clock.wall_ms();
        }
        Ok(Some(sample))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
