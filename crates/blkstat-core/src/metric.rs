//! The emitted metric record.

use chrono::Utc;
use serde::Serialize;

/// One metric record, created fresh per emission.
///
/// Ownership transfers to the consumer when the record is sent on the
/// output queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Human-readable label, e.g. `"diskstats sda reads reqs"`.
    pub service: String,
    /// Rate or gauge value.
    pub value: f64,
    /// Unix timestamp of emission (seconds).
    pub time: i64,
}

impl Metric {
    /// Creates a metric stamped with the current time.
    pub fn new(service: impl Into<String>, value: f64) -> Self {
        Self {
            service: service.into(),
            value,
            time: Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_current_time() {
        let before = Utc::now().timestamp();
        let metric = Metric::new("diskstats sda reads reqs", 5.0);
        let after = Utc::now().timestamp();

        assert_eq!(metric.service, "diskstats sda reads reqs");
        assert_eq!(metric.value, 5.0);
        assert!(metric.time >= before && metric.time <= after);
    }
}
