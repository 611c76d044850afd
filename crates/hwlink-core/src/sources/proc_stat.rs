//! ProcStatCounters — cumulative CPU ticks from `/proc/stat`.
//!
//! ```text
//! cpu  10132153 290696 3084719 46828483 16683 0 25195 0 0 0
//! cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0
//! cpu1 1335012 29846 524138 13584733 3457 0 2426 0 0 0
//! intr 199292 ...
//! ```
//!
//! Only the first four columns (user, nice, system, idle) are used.

use std::path::PathBuf;

use log::debug;

use crate::counters::CpuCounters;
use crate::source::CounterSource;

/// Default path of the kernel tick counter file.
pub const PROC_STAT: &str = "/proc/stat";

pub struct ProcStatCounters {
    path: PathBuf,
}

impl ProcStatCounters {
    pub fn new() -> Self {
        Self::with_path(PROC_STAT)
    }

    /// Read counters from `path` instead of `/proc/stat`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcStatCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for ProcStatCounters {
    fn read_counters(&self) -> Option<Vec<(String, CpuCounters)>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Some(parse_proc_stat(&raw)),
            Err(e) => {
                debug!("{}: {e}", self.path.display());
                None
            }
        }
    }
}

/// Parse every `cpu`/`cpuN` line, in file order.
///
/// Lines with fewer than four numeric columns are skipped.
pub fn parse_proc_stat(raw: &str) -> Vec<(String, CpuCounters)> {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let suffix = name.strip_prefix("cpu")?;
            if !suffix.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let values: Vec<u64> = fields.take(4).map_while(|v| v.parse().ok()).collect();
            let [user, nice, system, idle] = values[..] else {
                return None;
            };
            Some((
                name.to_string(),
                CpuCounters {
                    user,
                    nice,
                    system,
                    idle,
                },
            ))
        })
        .collect()
}
