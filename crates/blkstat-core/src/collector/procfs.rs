//! Parser for `/proc/diskstats`.
//!
//! A pure function over the file content, designed to be easily testable
//! with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Device-name prefixes that mark virtual block devices (RAM disks, loop
/// devices). These never represent physical disks and are dropped before
/// any filtering is applied.
pub const PSEUDO_DEVICE_PREFIXES: [&str; 2] = ["ram", "loop"];

/// Returns true if the device is a pseudo device (e.g. "ram0", "loop3").
pub fn is_pseudo_device(device: &str) -> bool {
    PSEUDO_DEVICE_PREFIXES
        .iter()
        .any(|prefix| device.starts_with(prefix))
}

/// One device's raw counters from `/proc/diskstats`.
///
/// All fields except `in_flight` are cumulative counters since boot;
/// `in_flight` is an instantaneous gauge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskCounters {
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of reads completed
    pub reads: u64,
    /// Number of read requests merged
    pub reads_merged: u64,
    /// Number of sectors read
    pub read_sectors: u64,
    /// Time spent reading (ms)
    pub read_time_ms: u64,
    /// Number of writes completed
    pub writes: u64,
    /// Number of write requests merged
    pub writes_merged: u64,
    /// Number of sectors written
    pub write_sectors: u64,
    /// Time spent writing (ms)
    pub write_time_ms: u64,
    /// Number of I/Os currently in progress (gauge, not a counter)
    pub in_flight: u64,
    /// Time spent doing I/Os (ms)
    pub io_time_ms: u64,
    /// Weighted time spent doing I/Os (ms)
    pub time_in_queue_ms: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors r_time writes
/// w_merged w_sectors w_time io_pending io_time w_io_time [discards ...]
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskCounters>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        disks.push(DiskCounters {
            device: parts[2].to_string(),
            reads: get_val(3),
            reads_merged: get_val(4),
            read_sectors: get_val(5),
            read_time_ms: get_val(6),
            writes: get_val(7),
            writes_merged: get_val(8),
            write_sectors: get_val(9),
            write_time_ms: get_val(10),
            in_flight: get_val(11),
            io_time_ms: get_val(12),
            time_in_queue_ms: get_val(13),
        });
    }

    Ok(disks)
}
