//! Counter source reading `/proc/diskstats` through the `FileSystem` trait.

use std::path::Path;

use crate::collector::procfs::{DiskCounters, parse_diskstats};
use crate::collector::traits::FileSystem;

/// Errors from reading the counter source.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading the diskstats file.
    Io(std::io::Error),
    /// Parse error in the diskstats content.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Reads per-device block I/O counters from `<proc_path>/diskstats`.
pub struct DiskStatsSource<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> DiskStatsSource<F> {
    /// Creates a new source.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Performs one full read of the counter source.
    pub fn read(&self) -> Result<Vec<DiskCounters>, CollectError> {
        let path = format!("{}/diskstats", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_diskstats(&content).map_err(|e| CollectError::Parse(e.message))
    }
}
