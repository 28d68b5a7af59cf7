//! Position samples and derived motion samples.
//!
//! A `Sample` is one timestamped 3D position reading from the stylus.
//! Coordinates are world-space meters from the tracking session. Timestamps
//! are wall-clock milliseconds at receipt; sequence numbers are assigned by
//! the producer and strictly increase within a session.

use serde::{Deserialize, Serialize};

/// Wall-clock receipt time in milliseconds since the unix epoch.
pub type TimestampMs = i64;

/// A single stylus position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Producer-assigned counter, strictly increasing per session.
    #[serde(rename = "seq")]
    pub sequence: u64,

    /// Wall-clock receipt time in milliseconds.
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    /// World-space X position (meters).
    pub x: f64,
    /// World-space Y position (meters).
    pub y: f64,
    /// World-space Z position (meters).
    pub z: f64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(sequence: u64, timestamp_ms: TimestampMs, x: f64, y: f64, z: f64) -> Self {
        Self {
            sequence,
            timestamp_ms,
            x,
            y,
            z,
        }
    }

    /// Timestamp as fractional seconds since the unix epoch.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ms as f64 / 1000.0
    }

    /// Position as an (x, y, z) tuple.
    pub fn position(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

/// A sample whose axes carry derived motion data.
///
/// Depending on the requested mode, x/y/z represent position, velocity
/// (m/s), or acceleration (m/s²). `index` is the sample's position in the
/// filtered input sequence, not its absolute sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedSample {
    /// Position in the filtered input sequence.
    pub index: usize,

    /// Wall-clock receipt time of the originating sample (milliseconds).
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DerivedSample {
    /// Carry a sample's axes through unchanged (position mode, or any
    /// pass-through case).
    pub fn from_sample(sample: &Sample, index: usize) -> Self {
        Self {
            index,
            timestamp_ms: sample.timestamp_ms,
            x: sample.x,
            y: sample.y,
            z: sample.z,
        }
    }

    /// Zero vector at a sample's timestamp (boundary fallback).
    pub fn zero(sample: &Sample, index: usize) -> Self {
        Self {
            index,
            timestamp_ms: sample.timestamp_ms,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Derivation mode for a consumer's view of the stream.
///
/// Windowed variants carry the derivative window in milliseconds; any
/// non-negative window is accepted. The direct variants difference against
/// the immediate neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveMode {
    /// Pass positions through unchanged.
    Position,
    /// Velocity against the direct neighbor.
    Velocity,
    /// Velocity against the newest sample at least `window_ms` older.
    VelocityWindowed(i64),
    /// Acceleration against the direct neighbor.
    Acceleration,
    /// Acceleration with a windowed velocity baseline.
    AccelerationWindowed(i64),
}

impl DeriveMode {
    /// Derivative window in milliseconds, if this mode differentiates.
    /// Direct modes report a zero window.
    pub fn window_ms(&self) -> Option<i64> {
        match self {
            Self::Position => None,
            Self::Velocity | Self::Acceleration => Some(0),
            Self::VelocityWindowed(w) | Self::AccelerationWindowed(w) => Some(*w),
        }
    }
}

impl Default for DeriveMode {
    fn default() -> Self {
        Self::Position
    }
}

/// Error parsing a derivation mode string.
#[derive(Debug, thiserror::Error)]
#[error("Unknown derivation mode: {input:?}")]
pub struct ParseModeError {
    input: String,
}

impl std::str::FromStr for DeriveMode {
    type Err = ParseModeError;

    /// Accepts `position`, `velocity`, `acceleration`, and windowed forms
    /// with the window in milliseconds appended (`velocity10`,
    /// `acceleration100`, any non-negative integer).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseModeError {
            input: s.to_string(),
        };
        match s {
            "position" => Ok(Self::Position),
            "velocity" => Ok(Self::Velocity),
            "acceleration" => Ok(Self::Acceleration),
            _ => {
                if let Some(rest) = s.strip_prefix("velocity") {
                    rest.parse::<i64>()
                        .ok()
                        .filter(|w| *w >= 0)
                        .map(Self::VelocityWindowed)
                        .ok_or_else(err)
                } else if let Some(rest) = s.strip_prefix("acceleration") {
                    rest.parse::<i64>()
                        .ok()
                        .filter(|w| *w >= 0)
                        .map(Self::AccelerationWindowed)
                        .ok_or_else(err)
                } else {
                    Err(err())
                }
            }
        }
    }
}

impl std::fmt::Display for DeriveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Velocity => write!(f, "velocity"),
            Self::VelocityWindowed(w) => write!(f, "velocity{w}"),
            Self::Acceleration => write!(f, "acceleration"),
            Self::AccelerationWindowed(w) => write!(f, "acceleration{w}"),
        }
    }
}
