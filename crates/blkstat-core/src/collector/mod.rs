//! Disk I/O statistics collector for Linux.
//!
//! This module reads per-device block I/O counters from the `/proc`
//! filesystem and turns them into per-second metric records, with support
//! for mocking so tests run without a real kernel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 DiskStatsCollector                   │
//! │  ┌────────────────┐  ┌───────────────┐  ┌─────────┐  │
//! │  │ DiskStatsSource│─▶│ SnapshotStore │─▶│ Device  │  │
//! │  │ /proc/diskstats│  │ prev/current  │  │ Filter  │  │
//! │  └───────┬────────┘  └───────────────┘  └─────────┘  │
//! │          │                                           │
//! │   ┌──────▼──────┐                                    │
//! │   │  FileSystem │ (trait)                            │
//! │   └──────┬──────┘                                    │
//! └──────────┼───────────────────────────────────────────┘
//!            │
//!     ┌──────┴──────┐
//!     │             │
//! ┌───▼────┐   ┌────▼───┐
//! │ RealFs │   │ MockFs │
//! │ (Linux)│   │ (tests)│
//! └────────┘   └────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use blkstat_core::collector::{DiskStatsCollector, MockFs};
//! use blkstat_core::filter::DeviceFilter;
//!
//! let mut fs = MockFs::new();
//! fs.set_file(
//!     "/proc/diskstats",
//!     "   8       0 sda 100 0 800 40 50 0 400 30 0 60 70 0 0 0 0\n",
//! );
//! let collector = DiskStatsCollector::new(fs, "/proc", DeviceFilter::default());
//! ```

mod diskstats;
pub mod mock;
pub mod procfs;
mod source;
pub mod traits;

pub use diskstats::{COUNTER_KINDS, DiskStatsCollector, device_metrics};
pub use mock::MockFs;
pub use procfs::{DiskCounters, PSEUDO_DEVICE_PREFIXES, is_pseudo_device, parse_diskstats};
pub use source::{CollectError, DiskStatsSource};
pub use traits::{FileSystem, RealFs};
