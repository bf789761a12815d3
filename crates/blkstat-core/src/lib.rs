//! blkstat-core — shared library for the blkstat collector daemon.
//!
//! Provides:
//! - `collector` — disk I/O counter collection from `/proc/diskstats`
//! - `snapshot` — previous/current counter snapshot rotation
//! - `filter` — include/exclude device selection policy
//! - `rates` — per-second rate computation from counter pairs
//! - `trigger` — shared tick fan-out that synchronizes sampling
//! - `metric` — the emitted metric record

pub mod collector;
pub mod filter;
pub mod metric;
pub mod rates;
pub mod snapshot;
pub mod trigger;
