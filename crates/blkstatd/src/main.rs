//! blkstatd - Disk I/O statistics collector daemon.
//!
//! Samples per-device block I/O counters from /proc/diskstats on a fixed
//! cadence, converts them to per-second rates, and writes one JSON metric
//! record per line to stdout.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, sync_channel};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use blkstat_core::collector::{DiskStatsCollector, RealFs};
use blkstat_core::filter::DeviceFilter;
use blkstat_core::metric::Metric;
use blkstat_core::trigger::Ticker;

/// Disk I/O statistics collector daemon.
#[derive(Parser)]
#[command(name = "blkstatd", about = "Disk I/O statistics collector daemon", version)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Devices to report (comma-separated). Empty means all devices.
    #[arg(long, value_delimiter = ',')]
    include: Vec<String>,

    /// Devices to always omit (comma-separated).
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Metric queue capacity. A full queue stalls emission, not sampling
    /// triggers.
    #[arg(long, default_value = "1024")]
    queue_capacity: usize,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("blkstatd={}", level).parse().unwrap())
        .add_directive(format!("blkstat_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds a device-name set from CLI values, dropping empty entries.
fn name_set(names: &[String]) -> HashSet<String> {
    names
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drains the metric queue, writing one JSON object per line to stdout.
///
/// Runs until every producer has dropped its sender.
fn consume_metrics(rx: Receiver<Metric>) {
    let stdout = std::io::stdout();
    let mut emitted: u64 = 0;

    for metric in rx.iter() {
        match serde_json::to_string(&metric) {
            Ok(line) => {
                if writeln!(stdout.lock(), "{}", line).is_err() {
                    // stdout closed; nothing left to emit to.
                    break;
                }
            }
            Err(e) => {
                warn!("failed to serialize metric: {}", e);
                continue;
            }
        }
        emitted += 1;
        if emitted.is_multiple_of(1000) {
            debug!("{} metrics emitted", emitted);
        }
    }

    info!("Metric consumer drained ({} metrics total)", emitted);
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("blkstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, queue_capacity={}",
        args.interval, args.proc_path, args.queue_capacity
    );

    let include = name_set(&args.include);
    let exclude = name_set(&args.exclude);
    if !include.is_empty() {
        info!("Device allow-list: {:?}", include);
    }
    if !exclude.is_empty() {
        info!("Device exclusions: {:?}", exclude);
    }

    let filter = DeviceFilter::new(include, exclude);
    let collector = DiskStatsCollector::new(RealFs::new(), &args.proc_path, filter);

    let mut ticker = Ticker::new();
    let ticks = ticker.subscribe();
    let (queue_tx, queue_rx) = sync_channel(args.queue_capacity);

    let collector_handle = std::thread::spawn(move || collector.run(queue_tx, ticks));
    let consumer_handle = std::thread::spawn(move || consume_metrics(queue_rx));

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_secs(args.interval);
    info!("Starting sampling loop");

    while running.load(Ordering::SeqCst) {
        if ticker.tick() == 0 {
            debug!("tick missed all subscribers");
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    // Graceful shutdown: closing the ticker unblocks the collector, which
    // drops its queue sender and lets the consumer drain.
    info!("Shutting down...");
    drop(ticker);

    if collector_handle.join().is_err() {
        error!("Collector thread panicked");
    }
    if consumer_handle.join().is_err() {
        error!("Consumer thread panicked");
    }

    info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::name_set;
    use blkstat_core::metric::Metric;

    #[test]
    fn name_set_drops_empty_entries() {
        let names = vec!["sda".to_string(), "".to_string(), " sdb ".to_string()];
        let set = name_set(&names);
        assert_eq!(set.len(), 2);
        assert!(set.contains("sda"));
        assert!(set.contains("sdb"));
    }

    #[test]
    fn metric_serializes_to_flat_json() {
        let metric = Metric::new("diskstats sda reads reqs", 5.0);
        let json = serde_json::to_string(&metric).unwrap();
        assert!(json.contains("\"service\":\"diskstats sda reads reqs\""));
        assert!(json.contains("\"value\":5.0"));
        assert!(json.contains("\"time\":"));
    }
}
