//! Show sample log information.

use std::path::PathBuf;

use inkstream_sample_model::stream::parse_header;
use inkstream_sample_model::parse_samples;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;

    println!("Sample log: {}", path.display());

    match parse_header(&content) {
        Ok(Some(header)) => {
            println!("  Schema: {}", header.schema_version);
            println!("  Recorded: {}", header.epoch_wall);
            println!("  Nominal rate: {} Hz", header.sample_rate_hz);
            println!("  Coordinate space: {:?}", header.coordinate_space);
        }
        Ok(None) => println!("  No header line"),
        Err(e) => println!("  Unreadable header: {e}"),
    }
    println!();

    let samples = parse_samples(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse sample log: {e}"))?;
    println!("Samples: {}", samples.len());

    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Ok(());
    };

    let duration_secs = (last.timestamp_ms - first.timestamp_ms) as f64 / 1000.0;
    println!("  Sequences: {} .. {}", first.sequence, last.sequence);
    println!("  Duration: {duration_secs:.1}s");
    if duration_secs > 0.0 {
        println!(
            "  Measured rate: {:.1} Hz",
            (samples.len() as f64 - 1.0) / duration_secs
        );
    }

    let gaps: u64 = samples
        .windows(2)
        .map(|w| w[1].sequence.saturating_sub(w[0].sequence + 1))
        .sum();
    println!("  Missing sequences: {gaps}");

    let regressions = samples
        .windows(2)
        .filter(|w| w[1].sequence <= w[0].sequence || w[1].timestamp_ms < w[0].timestamp_ms)
        .count();
    if regressions > 0 {
        println!("  Ordering regressions: {regressions} (log was not produced by one session)");
    }

    Ok(())
}
