//! Metric source adapters for the Linux telemetry surface.

pub mod helpers;

pub mod cpufreq;
pub mod nvidia;
pub mod proc_stat;
pub mod sensors;
pub mod thermal_zone;

use crate::config::LinkConfig;
use crate::source::{CounterSource, FrequencySource, GpuSource, TemperatureSource};

/// Everything the sampler queries in one cycle.
pub struct SourceSet {
    /// CPU temperature adapters, most precise first.
    pub temperature: Vec<Box<dyn TemperatureSource>>,
    pub frequency: Box<dyn FrequencySource>,
    pub counters: Box<dyn CounterSource>,
    pub gpu: Box<dyn GpuSource>,
}

impl SourceSet {
    /// The host's real adapters.
    ///
    /// `sensors` is preferred over thermal zones: when lm-sensors is
    /// installed it reports the die temperature, while zones often only
    /// expose a board or ACPI sensor.
    pub fn system(config: &LinkConfig) -> Self {
        Self {
            temperature: vec![
                Box::new(sensors::SensorsTemperature::new(config.sensors_timeout())),
                Box::new(thermal_zone::ThermalZoneTemperature::new()),
            ],
            frequency: Box::new(cpufreq::CpuFreqSource::new()),
            counters: Box::new(proc_stat::ProcStatCounters::new()),
            gpu: Box::new(nvidia::NvidiaSmi::new(config.gpu_timeout())),
        }
    }
}
