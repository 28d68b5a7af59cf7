//! Record a simulated session to a JSONL sample log.

use std::path::PathBuf;

use inkstream_common::clock::{RateController, StreamClock};
use inkstream_sample_model::stream::{CoordinateSpace, SampleStreamHeader};
use inkstream_stylus_source::{SampleSource, SampleWriter, SimulatedStylus};

pub async fn run(
    output: PathBuf,
    rate: u32,
    duration: u64,
    noise: f64,
    seed: u64,
) -> anyhow::Result<()> {
    println!("Recording simulated stylus at {rate} Hz for {duration}s");
    println!("  Output: {}", output.display());
    println!();

    let clock = StreamClock::start();
    let header = SampleStreamHeader {
        schema_version: "1.0".to_string(),
        epoch_wall: clock.epoch_wall().to_string(),
        sample_rate_hz: rate,
        coordinate_space: CoordinateSpace::WorldMeters,
    };

    let mut writer = SampleWriter::new(output.clone(), header)
        .map_err(|e| anyhow::anyhow!("Failed to create sample log: {e}"))?;
    let mut stylus = SimulatedStylus::new(noise, seed);
    let mut controller = RateController::new(rate);

    while clock.elapsed_secs() < duration as f64 {
        if controller.should_tick(clock.elapsed_ns()) {
            if let Some(sample) = stylus
                .next_sample()
                .map_err(|e| anyhow::anyhow!("Sample source failed: {e}"))?
            {
                writer
                    .write_sample(&sample)
                    .map_err(|e| anyhow::anyhow!("Failed to write sample: {e}"))?;
            }
        } else {
            tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        }
    }

    writer
        .flush()
        .map_err(|e| anyhow::anyhow!("Failed to flush sample log: {e}"))?;
    println!(
        "Recorded {} samples to {}",
        writer.samples_written(),
        output.display()
    );

    Ok(())
}
