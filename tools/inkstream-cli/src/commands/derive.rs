//! Derive motion series from a recorded sample log.

use std::io::Write;
use std::path::PathBuf;

use inkstream_motion_core::{DerivationEngine, WindowFilter};
use inkstream_sample_model::{parse_samples, DeriveMode};

pub fn run(
    path: PathBuf,
    mode: String,
    window_secs: i64,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mode: DeriveMode = mode
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid mode: {e}"))?;

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let samples = parse_samples(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse sample log: {e}"))?;

    // "Now" for an offline log is the moment it ended
    let filter = if window_secs > 0 {
        WindowFilter::trailing(window_secs.saturating_mul(1000))
    } else {
        WindowFilter::all()
    };
    let now_ms = samples.last().map(|s| s.timestamp_ms).unwrap_or(0);
    let recent = filter.apply(&samples, now_ms);

    let derived = DerivationEngine::new(mode).derive(&recent);
    tracing::info!(
        total = samples.len(),
        windowed = recent.len(),
        mode = %mode,
        "Derived motion series"
    );

    let mut lines = String::new();
    for d in &derived {
        lines.push_str(&serde_json::to_string(d)?);
        lines.push('\n');
    }

    match output {
        Some(out) => {
            std::fs::write(&out, lines)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out.display()))?;
            println!(
                "Derived {} samples ({mode}) to {}",
                derived.len(),
                out.display()
            );
        }
        None => {
            std::io::stdout().write_all(lines.as_bytes())?;
        }
    }

    Ok(())
}
