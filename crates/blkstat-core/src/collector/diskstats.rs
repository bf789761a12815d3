//! The disk statistics collection loop.
//!
//! Driven by the shared trigger signal: each tick refreshes the snapshot
//! store and, once a previous snapshot exists, emits one metric per
//! (device, counter kind) pair for every device the filter selects.

use std::sync::mpsc::{SendError, SyncSender};

use tracing::{debug, warn};

use crate::collector::procfs::DiskCounters;
use crate::collector::source::DiskStatsSource;
use crate::collector::traits::FileSystem;
use crate::filter::DeviceFilter;
use crate::metric::Metric;
use crate::rates::compute_rate;
use crate::snapshot::SnapshotStore;
use crate::trigger::TickReceiver;

/// Counter kind labels, in emission order.
///
/// Ten rates plus the `io reqs` in-flight gauge. The order is fixed;
/// consumers rely on it.
pub const COUNTER_KINDS: [&str; 11] = [
    "reads reqs",
    "reads merged",
    "reads sector",
    "reads time",
    "writes reqs",
    "writes merged",
    "writes sector",
    "writes time",
    "io reqs",
    "io time",
    "io weighted",
];

/// Builds the eleven metrics for one device, in the fixed label order.
///
/// `io reqs` is the instantaneous in-flight value from the current
/// snapshot; every other kind is a rate over the elapsed interval.
pub fn device_metrics(
    device: &str,
    curr: &DiskCounters,
    prev: &DiskCounters,
    interval_secs: f64,
) -> Vec<Metric> {
    let rate = |c: u64, p: u64| compute_rate(c, p, interval_secs);
    let values = [
        rate(curr.reads, prev.reads),
        rate(curr.reads_merged, prev.reads_merged),
        rate(curr.read_sectors, prev.read_sectors),
        rate(curr.read_time_ms, prev.read_time_ms),
        rate(curr.writes, prev.writes),
        rate(curr.writes_merged, prev.writes_merged),
        rate(curr.write_sectors, prev.write_sectors),
        rate(curr.write_time_ms, prev.write_time_ms),
        curr.in_flight as f64,
        rate(curr.io_time_ms, prev.io_time_ms),
        rate(curr.time_in_queue_ms, prev.time_in_queue_ms),
    ];

    COUNTER_KINDS
        .iter()
        .zip(values)
        .map(|(kind, value)| Metric::new(format!("diskstats {device} {kind}"), value))
        .collect()
}

/// Disk I/O statistics collector.
///
/// Owns its snapshot store and filter exclusively; all state is touched
/// from the single thread running [`DiskStatsCollector::run`], so no
/// locking is involved.
pub struct DiskStatsCollector<F: FileSystem> {
    source: DiskStatsSource<F>,
    store: SnapshotStore,
    filter: DeviceFilter,
}

impl<F: FileSystem> DiskStatsCollector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `filter` - Device selection policy
    pub fn new(fs: F, proc_path: impl Into<String>, filter: DeviceFilter) -> Self {
        Self {
            source: DiskStatsSource::new(fs, proc_path),
            store: SnapshotStore::new(),
            filter,
        }
    }

    /// Runs the collection loop until the ticker is dropped or the metric
    /// queue has no consumer left.
    ///
    /// Blocks between ticks; one full sampling cycle runs to completion
    /// per tick. Sending on a bounded queue blocks when the consumer
    /// lags, which stalls the next cycle's emission, not tick delivery.
    pub fn run(mut self, queue: SyncSender<Metric>, ticks: TickReceiver) {
        debug!("diskstats collector started");
        while ticks.recv().is_some() {
            if self.cycle(&queue).is_err() {
                debug!("metric queue disconnected");
                break;
            }
        }
        debug!("diskstats collector stopped");
    }

    /// One sampling cycle: refresh, then emit unless unprimed.
    ///
    /// A failed counter read is logged and skips the emission pass for
    /// this cycle; the error does not stop the loop. `Err` here only
    /// signals a disconnected metric queue.
    fn cycle(&mut self, queue: &SyncSender<Metric>) -> Result<(), SendError<Metric>> {
        if let Err(e) = self.store.refresh(self.source.read()) {
            warn!("diskstats read failed, skipping cycle: {}", e);
            return Ok(());
        }

        if !self.store.is_primed() {
            debug!("no previous snapshot yet, nothing to emit");
            return Ok(());
        }

        let interval_secs = self.store.interval_secs().unwrap_or(0.0);
        let baseline = DiskCounters::default();

        for device in self.filter.select(self.store.device_names()) {
            let Some(curr) = self.store.current(device) else {
                continue;
            };
            // A device that appeared this cycle has no previous counters;
            // rates are computed against zero, as if it had just reset.
            let prev = self.store.previous(device).unwrap_or(&baseline);

            for metric in device_metrics(device, curr, prev, interval_secs) {
                queue.send(metric)?;
            }
        }
        Ok(())
    }
}
