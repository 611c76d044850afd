//! ThermalZoneTemperature — CPU temperature via `/sys/class/thermal/`.
//!
//! Each `thermal_zoneN` directory has a `type` label (`x86_pkg_temp`,
//! `cpu-thermal`, `acpitz`, ...) and a `temp` file in millidegrees Celsius.
//! Only zones whose label looks CPU-related are considered; the hottest one
//! is reported.

use std::path::{Path, PathBuf};

use log::trace;

use crate::source::{RawReading, SourceKind, TemperatureSource};

use super::helpers::{read_i64, read_trimmed};

/// Default sysfs root for thermal zones.
pub const THERMAL_ROOT: &str = "/sys/class/thermal";

/// Zones `thermal_zone0` through `thermal_zone19` are inspected.
const MAX_ZONES: usize = 20;

/// Case-insensitive substrings of a CPU-related zone type.
const CPU_KEYWORDS: &[&str] = &["cpu", "package", "core"];

pub struct ThermalZoneTemperature {
    root: PathBuf,
}

impl ThermalZoneTemperature {
    pub fn new() -> Self {
        Self::with_root(THERMAL_ROOT)
    }

    /// Read zones under `root` instead of `/sys/class/thermal`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Hottest CPU-related zone in degrees Celsius.
    pub fn max_cpu_zone_celsius(&self) -> Option<f64> {
        (0..MAX_ZONES)
            .filter_map(|i| read_cpu_zone(&self.root.join(format!("thermal_zone{i}"))))
            .filter(|t| *t > 0.0)
            .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
    }
}

impl Default for ThermalZoneTemperature {
    fn default() -> Self {
        Self::new()
    }
}

/// Temperature of one zone directory, if its type is CPU-related.
fn read_cpu_zone(dir: &Path) -> Option<f64> {
    let zone_type = read_trimmed(&dir.join("type"))?;
    if !is_cpu_zone(&zone_type) {
        return None;
    }
    let millidegrees = read_i64(&dir.join("temp"))?;
    let celsius = millidegrees as f64 / 1000.0;
    trace!("{}: {zone_type} = {celsius:.1} C", dir.display());
    Some(celsius)
}

fn is_cpu_zone(zone_type: &str) -> bool {
    let lower = zone_type.to_lowercase();
    CPU_KEYWORDS.iter().any(|k| lower.contains(k))
}

impl TemperatureSource for ThermalZoneTemperature {
    fn kind(&self) -> SourceKind {
        SourceKind::ThermalZone
    }

    fn read(&self) -> RawReading {
        RawReading::from_option(SourceKind::ThermalZone, self.max_cpu_zone_celsius())
    }
}
