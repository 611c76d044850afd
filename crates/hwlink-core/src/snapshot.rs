//! Per-tick telemetry snapshot.
//!
//! A [`TelemetrySnapshot`] is produced once per tick by the
//! [`Sampler`](crate::Sampler) and consumed by the frame encoder. It is a
//! plain value: nothing in it changes after it is returned.

use serde::Serialize;

/// Number of per-core load slots carried by a frame.
pub const CORE_SLOTS: usize = 16;
/// Number of per-core frequency slots sampled.
pub const FREQ_SLOTS: usize = 8;

/// GPU block of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GpuStats {
    pub temp_c: f64,
    pub core_clock_mhz: u32,
    pub mem_clock_mhz: u32,
    pub load_pct: f64,
    /// Memory controller utilisation as reported by the driver.
    pub mem_util_pct: f64,
    pub vram_used_mib: f64,
    pub vram_total_mib: f64,
    /// `floor(used * 100 / total)`.
    pub vram_percent: u32,
}

/// Complete set of metric values for one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TelemetrySnapshot {
    /// Per-core load in percent, in counter-file discovery order.
    pub core_loads: [u8; CORE_SLOTS],
    /// Per-core frequency in GHz, one decimal.
    pub core_ghz: [f64; FREQ_SLOTS],
    /// CPU package temperature in degrees Celsius (0 when unknown).
    pub cpu_temp_c: f64,
    /// Aggregate CPU load in percent.
    pub cpu_load: u8,
    /// Mean of the non-zero per-core frequencies, one decimal.
    pub avg_ghz: f64,
    pub gpu: GpuStats,
}

impl TelemetrySnapshot {
    /// One-line summary for logs and the CLI.
    ///
    /// ```text
    /// CPU 48°C 23% @ 3.4 GHz | GPU 41°C 7% 1410/5001 MHz, VRAM 12%
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "CPU {:.0}°C {}% @ {:.1} GHz | GPU {:.0}°C {:.0}% {}/{} MHz, VRAM {}%",
            self.cpu_temp_c,
            self.cpu_load,
            self.avg_ghz,
            self.gpu.temp_c,
            self.gpu.load_pct,
            self.gpu.core_clock_mhz,
            self.gpu.mem_clock_mhz,
            self.gpu.vram_percent,
        )
    }
}
