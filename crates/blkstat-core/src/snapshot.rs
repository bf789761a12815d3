//! Previous/current counter snapshot rotation.
//!
//! The store keeps exactly two time-stamped snapshots of the device
//! counters. On each refresh the current snapshot is moved into the
//! previous slot (an ownership transfer, no copying) and a fresh current
//! snapshot is installed from a new read of the counter source.
//!
//! Capture instants are monotonic (`std::time::Instant`), so the interval
//! between two successful refreshes can never go negative, whatever the
//! wall clock does.

use std::collections::HashMap;
use std::mem;
use std::time::Instant;

use crate::collector::CollectError;
use crate::collector::procfs::{DiskCounters, is_pseudo_device};

/// Holds the previous and current per-device counter snapshots.
///
/// All state is touched from a single sequential execution context (the
/// collection loop), so no internal locking is needed.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    previous: HashMap<String, DiskCounters>,
    current: HashMap<String, DiskCounters>,
    previous_at: Option<Instant>,
    current_at: Option<Instant>,
}

impl SnapshotStore {
    /// Creates an empty store. The first refresh establishes a baseline
    /// only; no rates can be computed until the second.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates snapshots and installs the outcome of one counter read.
    ///
    /// The current snapshot always moves into the previous slot first.
    /// On `Ok`, every record that is not a pseudo device is inserted into
    /// the fresh current snapshot and the capture instant is stamped. On
    /// `Err`, the current snapshot is left empty and the error propagates;
    /// the following cycle then starts from an empty previous snapshot,
    /// exactly like a first run.
    pub fn refresh(
        &mut self,
        read: Result<Vec<DiskCounters>, CollectError>,
    ) -> Result<(), CollectError> {
        self.refresh_at(read, Instant::now())
    }

    pub(crate) fn refresh_at(
        &mut self,
        read: Result<Vec<DiskCounters>, CollectError>,
        at: Instant,
    ) -> Result<(), CollectError> {
        self.previous = mem::take(&mut self.current);
        self.previous_at = self.current_at.take();

        let records = read?;
        for record in records {
            if is_pseudo_device(&record.device) {
                continue;
            }
            self.current.insert(record.device.clone(), record);
        }
        self.current_at = Some(at);
        Ok(())
    }

    /// Returns true once both snapshots are populated, i.e. a valid
    /// interval exists and rates may be computed.
    pub fn is_primed(&self) -> bool {
        !self.previous.is_empty() && self.previous_at.is_some() && self.current_at.is_some()
    }

    /// Elapsed seconds between the two capture instants, if both exist.
    pub fn interval_secs(&self) -> Option<f64> {
        let (prev, curr) = (self.previous_at?, self.current_at?);
        Some(curr.duration_since(prev).as_secs_f64())
    }

    /// Device names present in the current snapshot.
    pub fn device_names(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    /// Looks up a device in the current snapshot.
    pub fn current(&self, device: &str) -> Option<&DiskCounters> {
        self.current.get(device)
    }

    /// Looks up a device in the previous snapshot.
    pub fn previous(&self, device: &str) -> Option<&DiskCounters> {
        self.previous.get(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn counters(device: &str, reads: u64) -> DiskCounters {
        DiskCounters {
            device: device.to_string(),
            reads,
            ..Default::default()
        }
    }

    fn io_err() -> CollectError {
        CollectError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
    }

    #[test]
    fn first_refresh_is_not_primed() {
        let mut store = SnapshotStore::new();
        store.refresh(Ok(vec![counters("sda", 100)])).unwrap();

        assert!(!store.is_primed());
        assert!(store.interval_secs().is_none());
        assert!(store.current("sda").is_some());
        assert!(store.previous("sda").is_none());
    }

    #[test]
    fn second_refresh_rotates_ownership() {
        let mut store = SnapshotStore::new();
        let base = Instant::now();
        store
            .refresh_at(Ok(vec![counters("sda", 100)]), base)
            .unwrap();
        store
            .refresh_at(
                Ok(vec![counters("sda", 150)]),
                base + Duration::from_secs(10),
            )
            .unwrap();

        assert!(store.is_primed());
        assert_eq!(store.previous("sda").unwrap().reads, 100);
        assert_eq!(store.current("sda").unwrap().reads, 150);
        assert!((store.interval_secs().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn pseudo_devices_never_enter_snapshot() {
        let mut store = SnapshotStore::new();
        store
            .refresh(Ok(vec![
                counters("sda", 1),
                counters("ram0", 2),
                counters("loop3", 3),
            ]))
            .unwrap();

        let names: Vec<&str> = store.device_names().collect();
        assert_eq!(names, vec!["sda"]);
    }

    #[test]
    fn failed_read_leaves_current_empty() {
        let mut store = SnapshotStore::new();
        store.refresh(Ok(vec![counters("sda", 100)])).unwrap();

        assert!(store.refresh(Err(io_err())).is_err());
        assert!(!store.is_primed());
        assert!(store.current("sda").is_none());
        // The failed cycle's data still moved into previous.
        assert_eq!(store.previous("sda").unwrap().reads, 100);
    }

    #[test]
    fn refresh_after_failure_starts_fresh_baseline() {
        let mut store = SnapshotStore::new();
        store.refresh(Ok(vec![counters("sda", 100)])).unwrap();
        let _ = store.refresh(Err(io_err()));
        store.refresh(Ok(vec![counters("sda", 200)])).unwrap();

        // previous is the empty post-failure snapshot: still not primed.
        assert!(!store.is_primed());
        assert_eq!(store.current("sda").unwrap().reads, 200);
    }

    #[test]
    fn vanished_device_drops_out_of_current() {
        let mut store = SnapshotStore::new();
        store
            .refresh(Ok(vec![counters("sda", 1), counters("sdb", 1)]))
            .unwrap();
        store.refresh(Ok(vec![counters("sda", 2)])).unwrap();

        assert!(store.current("sdb").is_none());
        assert!(store.previous("sdb").is_some());
    }
}
