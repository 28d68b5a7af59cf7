//! Run a live simulated session through the broker.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use inkstream_common::clock::StreamClock;
use inkstream_common::config::AppConfig;
use inkstream_motion_core::{DerivationEngine, WindowFilter};
use inkstream_sample_model::{DeriveMode, Sample};
use inkstream_stream_broker::{BrokerConfig, SampleBroker};
use inkstream_stylus_source::{SampleFeed, SimulatedStylus};

pub async fn run(
    rate: u32,
    duration: u64,
    mode: Option<String>,
    window_secs: Option<i64>,
    all: bool,
    capacity: Option<usize>,
    queue_depth: Option<usize>,
    drop_threshold: Option<u32>,
) -> anyhow::Result<()> {
    // CLI flags layer over the saved configuration
    let app = AppConfig::load();
    let mut config = BrokerConfig::from(&app.broker);
    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }
    if let Some(queue_depth) = queue_depth {
        config.queue_depth = queue_depth;
    }
    if let Some(drop_threshold) = drop_threshold {
        config.drop_threshold = drop_threshold;
    }

    let mode: DeriveMode = mode
        .unwrap_or(app.derivation.mode)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid mode: {e}"))?;
    let window_secs = window_secs.unwrap_or(app.derivation.window_secs);
    let show_all = all || window_secs <= 0;
    let filter = if show_all {
        WindowFilter::all()
    } else {
        WindowFilter::trailing(window_secs.saturating_mul(1000))
    };
    let engine = DerivationEngine::new(mode);

    println!("Streaming simulated stylus at {rate} Hz");
    println!("  Mode: {mode}");
    println!(
        "  Window: {}",
        if show_all {
            "all data".to_string()
        } else {
            format!("{window_secs}s")
        }
    );
    println!("  Retention: {} samples", config.capacity);
    println!();

    let broker = Arc::new(SampleBroker::new(config));
    let subscription = broker.subscribe();

    let mut feed = SampleFeed::new(
        Box::new(SimulatedStylus::with_defaults()),
        Arc::clone(&broker),
        rate,
    );
    let stop_flag = feed.stop_flag();
    let feed_task = tokio::spawn(async move { feed.run().await });

    if duration == 0 {
        println!("Press Ctrl+C to stop streaming...");
        println!();
    }

    let clock = StreamClock::start();
    let mut view: Vec<Sample> = Vec::new();
    let mut report = tokio::time::interval(Duration::from_millis(500));
    report.tick().await; // first tick completes immediately

    loop {
        tokio::select! {
            _ = report.tick() => {
                view.extend(subscription.drain());
                let overflow = view.len().saturating_sub(config.capacity);
                if overflow > 0 {
                    view.drain(..overflow);
                }

                let recent = filter.apply(&view, clock.wall_ms());
                let derived = engine.derive(&recent);
                if let Some(latest) = derived.last() {
                    println!(
                        "[{:6.1}s] {:3} in window | x: {:+.3}  y: {:+.3}  z: {:+.3}",
                        clock.elapsed_secs(),
                        recent.len(),
                        latest.x,
                        latest.y,
                        latest.z
                    );
                }

                if duration > 0 && clock.elapsed_secs() >= duration as f64 {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    stop_flag.store(true, Ordering::SeqCst);
    let fed = feed_task
        .await?
        .map_err(|e| anyhow::anyhow!("Feed failed: {e}"))?;
    broker.unsubscribe(subscription.id());

    let stats = broker.stats();
    println!();
    println!("Session finished: {fed} samples fed");
    println!("  Ingested: {}", stats.ingested);
    println!("  Rejected: {}", stats.rejected);
    println!("  Dropped (backpressure): {}", stats.dropped);
    println!("  Failed subscribers: {}", stats.failed_subscribers);

    Ok(())
}
