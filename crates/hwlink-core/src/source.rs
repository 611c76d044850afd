//! Metric source traits and the raw readings they produce.
//!
//! Every adapter under [`crate::sources`] implements one of the traits here.
//! Adapters are queries with a bounded failure mode: a missing file, a
//! missing tool, a timeout or a malformed value all come back as an absent
//! reading. Nothing an adapter does can abort a sampling cycle.

use crate::counters::CpuCounters;

/// Where a raw reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The lm-sensors `sensors` tool.
    Sensors,
    /// `/sys/class/thermal/thermal_zone*`.
    ThermalZone,
    /// A vendor GPU diagnostic tool (`nvidia-smi`).
    VendorTool,
    /// The kernel tick counters in `/proc/stat`.
    CounterFile,
    /// Per-core `cpufreq/scaling_cur_freq` files.
    FrequencyFile,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sensors => write!(f, "sensors"),
            Self::ThermalZone => write!(f, "thermal_zone"),
            Self::VendorTool => write!(f, "vendor_tool"),
            Self::CounterFile => write!(f, "counter_file"),
            Self::FrequencyFile => write!(f, "frequency_file"),
        }
    }
}

/// A single adapter's output for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub value: Option<f64>,
    pub source: SourceKind,
}

impl RawReading {
    pub fn present(source: SourceKind, value: f64) -> Self {
        Self {
            value: Some(value),
            source,
        }
    }

    pub fn unavailable(source: SourceKind) -> Self {
        Self {
            value: None,
            source,
        }
    }

    pub fn from_option(source: SourceKind, value: Option<f64>) -> Self {
        Self { value, source }
    }

    /// The value, if it is present, finite and strictly positive.
    ///
    /// This is the acceptance predicate shared by every fallback chain.
    pub fn accepted(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// One parsed `nvidia-smi` record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpuReading {
    pub temp_c: f64,
    pub load_pct: f64,
    pub mem_util_pct: f64,
    pub vram_used_mib: f64,
    pub vram_total_mib: f64,
    pub core_clock_mhz: u32,
    pub mem_clock_mhz: u32,
}

/// A CPU temperature adapter. Several are chained in fallback order.
pub trait TemperatureSource: Send {
    fn kind(&self) -> SourceKind;

    /// Degrees Celsius, or absent.
    fn read(&self) -> RawReading;
}

/// Per-core current CPU frequency.
pub trait FrequencySource: Send {
    /// Current frequency of `core` in GHz, or absent.
    fn read_core_ghz(&self, core: usize) -> RawReading;
}

/// Cumulative CPU tick counters.
pub trait CounterSource: Send {
    /// `(identifier, counters)` pairs in the order the OS lists them, the
    /// aggregate `"cpu"` entry first. `None` when the counter file is
    /// unreadable.
    fn read_counters(&self) -> Option<Vec<(String, CpuCounters)>>;
}

/// GPU statistics from a vendor tool.
pub trait GpuSource: Send {
    /// `None` when the tool is missing, fails, times out or prints garbage.
    fn read_gpu(&self) -> Option<GpuReading>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_requires_strictly_positive() {
        assert_eq!(RawReading::present(SourceKind::Sensors, 45.5).accepted(), Some(45.5));
        assert_eq!(RawReading::present(SourceKind::Sensors, 0.0).accepted(), None);
        assert_eq!(RawReading::present(SourceKind::Sensors, -3.0).accepted(), None);
        assert_eq!(RawReading::present(SourceKind::Sensors, f64::NAN).accepted(), None);
        assert_eq!(RawReading::unavailable(SourceKind::ThermalZone).accepted(), None);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(SourceKind::ThermalZone.to_string(), "thermal_zone");
        assert_eq!(SourceKind::VendorTool.to_string(), "vendor_tool");
    }
}
