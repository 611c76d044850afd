//! CpuFreqSource — per-core current frequency from cpufreq sysfs.
//!
//! `/sys/devices/system/cpu/cpuN/cpufreq/scaling_cur_freq` holds the current
//! frequency in kHz.

use std::path::PathBuf;

use crate::source::{FrequencySource, RawReading, SourceKind};

use super::helpers::read_u64;

/// Default sysfs root for CPU devices.
pub const CPU_ROOT: &str = "/sys/devices/system/cpu";

const KHZ_PER_GHZ: f64 = 1_000_000.0;

pub struct CpuFreqSource {
    root: PathBuf,
}

impl CpuFreqSource {
    pub fn new() -> Self {
        Self::with_root(CPU_ROOT)
    }

    /// Read cores under `root` instead of `/sys/devices/system/cpu`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for CpuFreqSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencySource for CpuFreqSource {
    fn read_core_ghz(&self, core: usize) -> RawReading {
        let path = self
            .root
            .join(format!("cpu{core}"))
            .join("cpufreq")
            .join("scaling_cur_freq");
        let ghz = read_u64(&path).map(|khz| khz as f64 / KHZ_PER_GHZ);
        RawReading::from_option(SourceKind::FrequencyFile, ghz)
    }
}
