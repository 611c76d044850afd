//! Sampling engine: one [`TelemetrySnapshot`] per tick.
//!
//! Each call to [`Sampler::sample`] queries every adapter once. Metrics are
//! isolated from each other: an adapter that comes back empty only affects
//! its own fields, which keep their previous value (or a defined default).
//!
//! - **Temperature**: adapters are tried in order; the first strictly
//!   positive reading wins, later adapters are not queried. None → 0.
//! - **Frequency**: slots 0..8 keep their last value when a core is
//!   unreadable. The average covers non-zero slots only.
//! - **Load**: deltas of `/proc/stat` counters against the previous tick.
//! - **GPU**: the whole block keeps its previous values when the vendor tool
//!   is unavailable.

use log::{debug, trace};

use crate::config::LinkConfig;
use crate::counters::LoadTracker;
use crate::snapshot::{CORE_SLOTS, FREQ_SLOTS, GpuStats, TelemetrySnapshot};
use crate::source::{GpuReading, RawReading, TemperatureSource};
use crate::sources::SourceSet;

/// Identifier of the aggregate line in the counter file.
const AGGREGATE_CPU: &str = "cpu";

pub struct Sampler {
    sources: SourceSet,
    loads: LoadTracker,
    /// Unrounded per-core frequencies, retained across ticks.
    core_ghz: [f64; FREQ_SLOTS],
    /// Previous snapshot; source of retained values.
    last: TelemetrySnapshot,
}

impl Sampler {
    pub fn new(sources: SourceSet) -> Self {
        Self {
            sources,
            loads: LoadTracker::new(),
            core_ghz: [0.0; FREQ_SLOTS],
            last: TelemetrySnapshot::default(),
        }
    }

    /// Sampler over the host's real adapters.
    pub fn system(config: &LinkConfig) -> Self {
        Self::new(SourceSet::system(config))
    }

    /// Take one snapshot. Never fails; `&mut self` keeps ticks sequential.
    pub fn sample(&mut self) -> TelemetrySnapshot {
        let mut snap = self.last.clone();

        snap.cpu_temp_c = first_accepted(&self.sources.temperature)
            .and_then(|r| r.value)
            .unwrap_or(0.0);

        self.sample_frequencies(&mut snap);
        self.sample_loads(&mut snap);

        match self.sources.gpu.read_gpu() {
            Some(reading) => apply_gpu(&mut snap.gpu, &reading),
            None => debug!("gpu: unavailable, keeping previous values"),
        }

        trace!("sampled: {}", snap.summary());
        self.last = snap.clone();
        snap
    }

    fn sample_frequencies(&mut self, snap: &mut TelemetrySnapshot) {
        for (core, slot) in self.core_ghz.iter_mut().enumerate() {
            match self.sources.frequency.read_core_ghz(core).value {
                Some(ghz) if ghz.is_finite() && ghz >= 0.0 => *slot = ghz,
                _ => trace!("cpu{core}: frequency unavailable"),
            }
        }
        for (out, ghz) in snap.core_ghz.iter_mut().zip(self.core_ghz) {
            *out = round_tenths(ghz);
        }
        snap.avg_ghz = average_ghz(&self.core_ghz);
    }

    fn sample_loads(&mut self, snap: &mut TelemetrySnapshot) {
        let Some(counters) = self.sources.counters.read_counters() else {
            debug!("cpu load: counter file unavailable, keeping previous values");
            return;
        };

        let mut core_index = 0;
        for (id, c) in &counters {
            if id == AGGREGATE_CPU {
                if let Some(load) = self.loads.update(id, *c) {
                    snap.cpu_load = load;
                }
            } else if core_index < CORE_SLOTS {
                if let Some(load) = self.loads.update(id, *c) {
                    snap.core_loads[core_index] = load;
                }
                core_index += 1;
            }
        }
    }
}

/// First reading in `sources` that passes the acceptance predicate.
///
/// Short-circuits: adapters after the accepted one are never queried.
pub fn first_accepted(sources: &[Box<dyn TemperatureSource>]) -> Option<RawReading> {
    sources.iter().find_map(|s| {
        let reading = s.read();
        if reading.accepted().is_some() {
            Some(reading)
        } else {
            debug!("temperature: {} gave no usable reading", s.kind());
            None
        }
    })
}

/// Mean of the non-zero frequencies, rounded to one decimal; 0 if none.
pub fn average_ghz(freqs: &[f64]) -> f64 {
    let (sum, count) = freqs
        .iter()
        .filter(|f| **f > 0.0)
        .fold((0.0, 0usize), |(s, n), f| (s + f, n + 1));
    if count == 0 {
        0.0
    } else {
        round_tenths(sum / count as f64)
    }
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn apply_gpu(gpu: &mut GpuStats, r: &GpuReading) {
    gpu.temp_c = r.temp_c;
    gpu.load_pct = r.load_pct;
    gpu.mem_util_pct = r.mem_util_pct;
    gpu.vram_used_mib = r.vram_used_mib;
    gpu.vram_total_mib = r.vram_total_mib;
    gpu.core_clock_mhz = r.core_clock_mhz;
    gpu.mem_clock_mhz = r.mem_clock_mhz;
    if r.vram_total_mib > 0.0 {
        gpu.vram_percent = (r.vram_used_mib * 100.0 / r.vram_total_mib) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CpuCounters;
    use crate::source::{CounterSource, FrequencySource, GpuSource, SourceKind};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FixedTemp {
        kind: SourceKind,
        value: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl TemperatureSource for FixedTemp {
        fn kind(&self) -> SourceKind {
            self.kind
        }
        fn read(&self) -> RawReading {
            self.calls.fetch_add(1, Ordering::SeqCst);
            RawReading::from_option(self.kind, self.value)
        }
    }

    struct FixedFreq(Vec<Option<f64>>);

    impl FrequencySource for FixedFreq {
        fn read_core_ghz(&self, core: usize) -> RawReading {
            RawReading::from_option(
                SourceKind::FrequencyFile,
                self.0.get(core).copied().flatten(),
            )
        }
    }

    /// Hands out one scripted counter read per call.
    struct ScriptedCounters(Mutex<VecDeque<Option<Vec<(String, CpuCounters)>>>>);

    impl CounterSource for ScriptedCounters {
        fn read_counters(&self) -> Option<Vec<(String, CpuCounters)>> {
            self.0.lock().unwrap().pop_front().flatten()
        }
    }

    struct ScriptedGpu(Mutex<VecDeque<Option<GpuReading>>>);

    impl GpuSource for ScriptedGpu {
        fn read_gpu(&self) -> Option<GpuReading> {
            self.0.lock().unwrap().pop_front().flatten()
        }
    }

    fn temp(kind: SourceKind, value: Option<f64>) -> (Box<dyn TemperatureSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let src = FixedTemp {
            kind,
            value,
            calls: calls.clone(),
        };
        (Box::new(src), calls)
    }

    fn line(id: &str, total: u64, idle: u64) -> (String, CpuCounters) {
        (
            id.to_string(),
            CpuCounters {
                user: total - idle,
                nice: 0,
                system: 0,
                idle,
            },
        )
    }

    fn sampler(
        temperature: Vec<Box<dyn TemperatureSource>>,
        freqs: Vec<Option<f64>>,
        counters: Vec<Option<Vec<(String, CpuCounters)>>>,
        gpu: Vec<Option<GpuReading>>,
    ) -> Sampler {
        Sampler::new(SourceSet {
            temperature,
            frequency: Box::new(FixedFreq(freqs)),
            counters: Box::new(ScriptedCounters(Mutex::new(counters.into()))),
            gpu: Box::new(ScriptedGpu(Mutex::new(gpu.into()))),
        })
    }

    #[test]
    fn average_skips_zero_cores() {
        assert_eq!(average_ghz(&[1.2, 0.0, 1.4, 0.0]), 1.3);
        assert_eq!(average_ghz(&[0.0; 8]), 0.0);
        assert_eq!(average_ghz(&[]), 0.0);
        assert_eq!(average_ghz(&[2.0, 3.0]), 2.5);
    }

    #[test]
    fn positive_sensors_reading_skips_thermal_zone() {
        let (sensors, sensors_calls) = temp(SourceKind::Sensors, Some(48.6));
        let (zones, zone_calls) = temp(SourceKind::ThermalZone, Some(60.0));
        let mut s = sampler(vec![sensors, zones], vec![], vec![], vec![]);
        let snap = s.sample();
        assert_eq!(snap.cpu_temp_c, 48.6);
        assert_eq!(sensors_calls.load(Ordering::SeqCst), 1);
        assert_eq!(zone_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_positive_sensors_reading_falls_back() {
        let (sensors, _) = temp(SourceKind::Sensors, Some(0.0));
        let (zones, zone_calls) = temp(SourceKind::ThermalZone, Some(55.0));
        let mut s = sampler(vec![sensors, zones], vec![], vec![], vec![]);
        assert_eq!(s.sample().cpu_temp_c, 55.0);
        assert_eq!(zone_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_temperature_is_zero() {
        let (sensors, _) = temp(SourceKind::Sensors, None);
        let (zones, _) = temp(SourceKind::ThermalZone, Some(-1.0));
        let mut s = sampler(vec![sensors, zones], vec![], vec![], vec![]);
        assert_eq!(s.sample().cpu_temp_c, 0.0);
    }

    #[test]
    fn loads_from_counter_deltas() {
        let first = vec![line("cpu", 100, 80), line("cpu0", 100, 50), line("cpu1", 100, 100)];
        let second = vec![line("cpu", 200, 100), line("cpu0", 200, 60), line("cpu1", 100, 100)];
        let mut s = sampler(vec![], vec![], vec![Some(first), Some(second)], vec![]);

        let snap = s.sample();
        assert_eq!(snap.cpu_load, 0);
        assert_eq!(snap.core_loads, [0; CORE_SLOTS]);

        let snap = s.sample();
        assert_eq!(snap.cpu_load, 80);
        assert_eq!(snap.core_loads[0], 90);
        // cpu1 saw no ticks: previous load retained.
        assert_eq!(snap.core_loads[1], 0);
    }

    #[test]
    fn unchanged_counters_keep_previous_load() {
        let reads = vec![
            Some(vec![line("cpu", 100, 80)]),
            Some(vec![line("cpu", 200, 100)]),
            Some(vec![line("cpu", 200, 100)]),
            None,
        ];
        let mut s = sampler(vec![], vec![], reads, vec![]);
        s.sample();
        assert_eq!(s.sample().cpu_load, 80);
        assert_eq!(s.sample().cpu_load, 80);
        // Counter file unreadable: still 80.
        assert_eq!(s.sample().cpu_load, 80);
    }

    #[test]
    fn cores_beyond_sixteen_are_ignored() {
        let mut first = vec![line("cpu", 100, 100)];
        let mut second = vec![line("cpu", 200, 100)];
        for i in 0..20 {
            first.push(line(&format!("cpu{i}"), 100, 100));
            second.push(line(&format!("cpu{i}"), 200, 200 - i as u64));
        }
        let mut s = sampler(vec![], vec![], vec![Some(first), Some(second)], vec![]);
        s.sample();
        let snap = s.sample();
        assert_eq!(snap.core_loads[0], 0);
        assert_eq!(snap.core_loads[15], 15);
        assert_eq!(snap.cpu_load, 100);
    }

    #[test]
    fn cores_follow_discovery_order() {
        // Offline cpu1: cpu2 takes slot 1.
        let first = vec![line("cpu0", 100, 100), line("cpu2", 100, 100)];
        let second = vec![line("cpu0", 200, 200), line("cpu2", 200, 150)];
        let mut s = sampler(vec![], vec![], vec![Some(first), Some(second)], vec![]);
        s.sample();
        let snap = s.sample();
        assert_eq!(snap.core_loads[0], 0);
        assert_eq!(snap.core_loads[1], 50);
    }

    #[test]
    fn frequencies_round_and_retain() {
        let freqs = vec![Some(3.44), Some(0.0), Some(1.16), None];
        let mut s = sampler(vec![], freqs, vec![], vec![]);
        let snap = s.sample();
        assert_eq!(snap.core_ghz[0], 3.4);
        assert_eq!(snap.core_ghz[2], 1.2);
        assert_eq!(snap.core_ghz[3], 0.0);
        assert_eq!(snap.avg_ghz, 2.3);
    }

    #[test]
    fn gpu_block_retained_when_tool_missing() {
        let reading = GpuReading {
            temp_c: 47.0,
            load_pct: 12.0,
            mem_util_pct: 5.0,
            vram_used_mib: 1024.0,
            vram_total_mib: 8192.0,
            core_clock_mhz: 1410,
            mem_clock_mhz: 5001,
        };
        let mut s = sampler(vec![], vec![], vec![], vec![Some(reading), None]);
        let first = s.sample();
        assert_eq!(first.gpu.vram_percent, 12);
        assert_eq!(first.gpu.core_clock_mhz, 1410);
        let second = s.sample();
        assert_eq!(second.gpu, first.gpu);
    }

    #[test]
    fn vram_percent_truncates() {
        let mut gpu = GpuStats::default();
        apply_gpu(
            &mut gpu,
            &GpuReading {
                vram_used_mib: 2047.0,
                vram_total_mib: 4096.0,
                ..GpuReading::default()
            },
        );
        assert_eq!(gpu.vram_percent, 49);

        // Zero total leaves the percentage untouched.
        apply_gpu(&mut gpu, &GpuReading::default());
        assert_eq!(gpu.vram_percent, 49);
    }
}
