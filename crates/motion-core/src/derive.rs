//! Velocity and acceleration series from position samples.
//!
//! The output always has one entry per input sample: boundary samples get a
//! zero-vector fallback instead of being dropped, so derived series stay
//! index-aligned with their input for downstream plotting and mapping.
//!
//! Windowed modes difference each sample against the newest earlier sample
//! at least `window_ms` older; when the window reaches past the start of
//! the sequence, the lookup falls back to the oldest sample, effectively
//! shrinking the window near the boundary.

use inkstream_sample_model::{DeriveMode, DerivedSample, Sample};

/// Floor for derivative time steps, in seconds.
///
/// Samples can share a wall-clock millisecond; dividing by the raw dt would
/// blow the output up. Flooring at 1 ms is a smoothing contract, not an
/// error path, and applies to every derivative division.
pub const MIN_DT_SECS: f64 = 1e-3;

/// Computes derived motion series for a fixed mode.
#[derive(Debug, Clone, Copy)]
pub struct DerivationEngine {
    mode: DeriveMode,
}

impl DerivationEngine {
    /// Create an engine for the given mode.
    pub fn new(mode: DeriveMode) -> Self {
        Self { mode }
    }

    /// The engine's mode.
    pub fn mode(&self) -> DeriveMode {
        self.mode
    }

    /// Derive one output sample per input sample. Empty input yields an
    /// empty series, not an error.
    pub fn derive(&self, samples: &[Sample]) -> Vec<DerivedSample> {
        match self.mode {
            DeriveMode::Position => samples
                .iter()
                .enumerate()
                .map(|(idx, s)| DerivedSample::from_sample(s, idx))
                .collect(),
            DeriveMode::Velocity => derive_velocity(samples, 0),
            DeriveMode::VelocityWindowed(window_ms) => derive_velocity(samples, window_ms),
            DeriveMode::Acceleration => derive_acceleration(samples, 0),
            DeriveMode::AccelerationWindowed(window_ms) => derive_acceleration(samples, window_ms),
        }
    }
}

/// Find the reference index for differencing `samples[idx]` over a window.
///
/// Index 0 has no earlier sample and maps to itself. A zero window means
/// the direct neighbor. Otherwise, scan backward for the first sample at
/// least `window_ms` older; fall back to the oldest available.
pub fn find_prev_index(samples: &[Sample], idx: usize, window_ms: i64) -> usize {
    if idx == 0 {
        return 0;
    }
    if window_ms == 0 {
        return idx - 1;
    }

    let target_ts = samples[idx].timestamp_ms - window_ms;
    for j in (0..idx).rev() {
        if samples[j].timestamp_ms <= target_ts {
            return j;
        }
    }
    0
}

fn dt_secs(samples: &[Sample], idx: usize, prev: usize) -> f64 {
    ((samples[idx].timestamp_ms - samples[prev].timestamp_ms) as f64 / 1000.0).max(MIN_DT_SECS)
}

fn derive_velocity(samples: &[Sample], window_ms: i64) -> Vec<DerivedSample> {
    samples
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let prev_idx = find_prev_index(samples, idx, window_ms);
            if prev_idx == idx {
                return DerivedSample::zero(s, idx);
            }

            let dt = dt_secs(samples, idx, prev_idx);
            let prev = &samples[prev_idx];
            DerivedSample {
                index: idx,
                timestamp_ms: s.timestamp_ms,
                x: (s.x - prev.x) / dt,
                y: (s.y - prev.y) / dt,
                z: (s.z - prev.z) / dt,
            }
        })
        .collect()
}

fn derive_acceleration(samples: &[Sample], window_ms: i64) -> Vec<DerivedSample> {
    samples
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let prev_idx = find_prev_index(samples, idx, window_ms);
            // No reference segment, or no segment before it to difference
            // against: the series starts at rest.
            if prev_idx == idx || prev_idx == 0 {
                return DerivedSample::zero(s, idx);
            }

            let prev = &samples[prev_idx];
            let dt_now = dt_secs(samples, idx, prev_idx);
            let vx_now = (s.x - prev.x) / dt_now;
            let vy_now = (s.y - prev.y) / dt_now;
            let vz_now = (s.z - prev.z) / dt_now;

            let prev_prev_idx = find_prev_index(samples, prev_idx, window_ms);
            let prev_prev = &samples[prev_prev_idx];
            let dt_prev = dt_secs(samples, prev_idx, prev_prev_idx);
            let vx_prev = (prev.x - prev_prev.x) / dt_prev;
            let vy_prev = (prev.y - prev_prev.y) / dt_prev;
            let vz_prev = (prev.z - prev_prev.z) / dt_prev;

            let dt_acc = dt_now;
            DerivedSample {
                index: idx,
                timestamp_ms: s.timestamp_ms,
                x: (vx_now - vx_prev) / dt_acc,
                y: (vy_now - vy_prev) / dt_acc,
                z: (vz_now - vz_prev) / dt_acc,
            }
        })
        .collect()
}
