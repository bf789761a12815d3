//! Include/exclude device selection policy.

use std::collections::HashSet;

/// Decides which devices from the current snapshot get metrics emitted.
///
/// Two-mode policy:
/// - non-empty include set: a device is selected iff it is in the include
///   set and not in the exclude set (a strict allow-list that still
///   honors exclusions);
/// - empty include set: a device is selected iff it is not excluded.
///
/// Both sets are supplied at construction and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl DeviceFilter {
    /// Creates a filter from include and exclude device-name sets.
    pub fn new(include: HashSet<String>, exclude: HashSet<String>) -> Self {
        Self { include, exclude }
    }

    /// Selects the eligible devices among the candidates.
    ///
    /// Candidates come from the current snapshot, so a configured device
    /// that is not present on the system is never selected. Order follows
    /// candidate iteration order and carries no meaning.
    pub fn select<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        candidates
            .into_iter()
            .filter(|device| {
                if self.include.is_empty() {
                    !self.exclude.contains(*device)
                } else {
                    self.include.contains(*device) && !self.exclude.contains(*device)
                }
            })
            .collect()
    }
}
