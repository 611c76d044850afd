//! Delta-based CPU load from cumulative tick counters.
//!
//! `/proc/stat` reports ticks spent in each state since boot. Load over an
//! interval is the busy share of the ticks that elapsed between two reads,
//! so the previous read of every CPU identifier has to be kept around. That
//! state lives in a [`LoadTracker`] owned by the sampler.

use std::collections::HashMap;

/// Cumulative ticks for one CPU identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
}

impl CpuCounters {
    pub fn total(&self) -> u64 {
        self.user
            .saturating_add(self.nice)
            .saturating_add(self.system)
            .saturating_add(self.idle)
    }
}

/// `(total, idle)` as stored between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CounterPair {
    total: u64,
    idle: u64,
}

/// Load percentage between two reads, or `None` if no delta is available.
///
/// No delta means either no ticks elapsed or a counter went backwards
/// (reset, hotplug); neither may produce a load value.
pub fn delta_load(prev_total: u64, prev_idle: u64, total: u64, idle: u64) -> Option<f64> {
    if total < prev_total || idle < prev_idle {
        return None;
    }
    let total_diff = total - prev_total;
    let idle_diff = idle - prev_idle;
    if total_diff == 0 {
        return None;
    }
    let busy = total_diff.saturating_sub(idle_diff) as f64;
    Some((100.0 * busy / total_diff as f64).clamp(0.0, 100.0))
}

/// Previous-cycle counters per CPU identifier.
#[derive(Debug, Default)]
pub struct LoadTracker {
    previous: HashMap<String, CounterPair>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `counters` for `id` and return the rounded load since the
    /// previous read of the same identifier.
    ///
    /// Returns `None` on the first read of an identifier and whenever
    /// [`delta_load`] has no delta; the caller keeps its previous value. The
    /// stored pair is overwritten in every case.
    pub fn update(&mut self, id: &str, counters: CpuCounters) -> Option<u8> {
        let now = CounterPair {
            total: counters.total(),
            idle: counters.idle,
        };
        let load = self
            .previous
            .insert(id.to_string(), now)
            .and_then(|prev| delta_load(prev.total, prev.idle, now.total, now.idle));
        load.map(|l| l.round() as u8)
    }

    /// Number of identifiers seen so far.
    pub fn tracked(&self) -> usize {
        self.previous.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(total: u64, idle: u64) -> CpuCounters {
        CpuCounters {
            user: total - idle,
            nice: 0,
            system: 0,
            idle,
        }
    }

    #[test]
    fn first_read_has_no_load() {
        let mut t = LoadTracker::new();
        assert_eq!(t.update("cpu", counters(100, 80)), None);
        assert_eq!(t.tracked(), 1);
    }

    #[test]
    fn eighty_percent_busy() {
        let mut t = LoadTracker::new();
        t.update("cpu", counters(100, 80));
        assert_eq!(t.update("cpu", counters(200, 100)), Some(80));
    }

    #[test]
    fn unchanged_total_yields_no_delta() {
        let mut t = LoadTracker::new();
        t.update("cpu0", counters(100, 80));
        assert_eq!(t.update("cpu0", counters(100, 80)), None);
        // The next real delta is measured from the latest stored pair.
        assert_eq!(t.update("cpu0", counters(150, 90)), Some(80));
    }

    #[test]
    fn counter_reset_is_not_negative_load() {
        let mut t = LoadTracker::new();
        t.update("cpu1", counters(1_000, 900));
        assert_eq!(t.update("cpu1", counters(50, 40)), None);
        // Stored pair was replaced by the post-reset values.
        assert_eq!(t.update("cpu1", counters(150, 90)), Some(50));
    }

    #[test]
    fn identifiers_are_independent() {
        let mut t = LoadTracker::new();
        t.update("cpu0", counters(100, 100));
        t.update("cpu1", counters(100, 0));
        assert_eq!(t.update("cpu0", counters(200, 200)), Some(0));
        assert_eq!(t.update("cpu1", counters(200, 0)), Some(100));
    }

    #[test]
    fn rounds_to_nearest_percent() {
        // 2 busy of 3 ticks = 66.67%
        assert_eq!(
            delta_load(0, 0, 3, 1).map(|l| l.round() as u8),
            Some(67)
        );
        // 1 busy of 8 ticks = 12.5% rounds half away from zero
        assert_eq!(
            delta_load(0, 0, 8, 7).map(|l| l.round() as u8),
            Some(13)
        );
    }

    #[test]
    fn total_includes_all_four_states() {
        let c = CpuCounters {
            user: 1,
            nice: 2,
            system: 3,
            idle: 4,
        };
        assert_eq!(c.total(), 10);
    }
}
