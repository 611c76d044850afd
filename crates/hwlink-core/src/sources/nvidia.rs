//! NvidiaSmi — GPU statistics from `nvidia-smi`.
//!
//! One structured query returns a single CSV record:
//!
//! ```text
//! 47, 12, 5, 1034, 8192, 1410, 5001
//! ```
//!
//! temperature (C), GPU utilisation (%), memory utilisation (%), memory used
//! (MiB), memory total (MiB), graphics clock (MHz), memory clock (MHz).

use std::time::Duration;

use log::debug;

use crate::source::{GpuReading, GpuSource};

use super::helpers::run_command;

const NVIDIA_SMI: &str = "nvidia-smi";

/// Field order is part of the parsing contract in [`parse_record`].
const QUERY_ARGS: &[&str] = &[
    "--query-gpu=temperature.gpu,utilization.gpu,utilization.memory,memory.used,memory.total,clocks.gr,clocks.mem",
    "--format=csv,noheader,nounits",
];

const FIELD_COUNT: usize = 7;

pub struct NvidiaSmi {
    timeout: Duration,
}

impl NvidiaSmi {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl GpuSource for NvidiaSmi {
    fn read_gpu(&self) -> Option<GpuReading> {
        let out = run_command(NVIDIA_SMI, QUERY_ARGS, self.timeout)?;
        let reading = out.lines().next().and_then(parse_record);
        if reading.is_none() {
            debug!("{NVIDIA_SMI}: unparsable record: {out:?}");
        }
        reading
    }
}

/// Parse one `nvidia-smi` CSV record.
///
/// Any non-numeric field (e.g. `[N/A]`) rejects the whole record.
pub fn parse_record(line: &str) -> Option<GpuReading> {
    let fields: Vec<f64> = line
        .split(',')
        .map(|f| f.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() < FIELD_COUNT {
        return None;
    }
    Some(GpuReading {
        temp_c: fields[0],
        load_pct: fields[1],
        mem_util_pct: fields[2],
        vram_used_mib: fields[3],
        vram_total_mib: fields[4],
        core_clock_mhz: fields[5] as u32,
        mem_clock_mhz: fields[6] as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record() {
        let r = parse_record("47, 12, 5, 1034, 8192, 1410, 5001").unwrap();
        assert_eq!(r.temp_c, 47.0);
        assert_eq!(r.load_pct, 12.0);
        assert_eq!(r.mem_util_pct, 5.0);
        assert_eq!(r.vram_used_mib, 1034.0);
        assert_eq!(r.vram_total_mib, 8192.0);
        assert_eq!(r.core_clock_mhz, 1410);
        assert_eq!(r.mem_clock_mhz, 5001);
    }

    #[test]
    fn clocks_truncate() {
        let r = parse_record("40,0,0,0,0,1410.9,405.2").unwrap();
        assert_eq!(r.core_clock_mhz, 1410);
        assert_eq!(r.mem_clock_mhz, 405);
    }

    #[test]
    fn rejects_short_or_unavailable() {
        assert_eq!(parse_record("47, 12, 5"), None);
        assert_eq!(parse_record("47, [N/A], 5, 1034, 8192, 1410, 5001"), None);
        assert_eq!(parse_record(""), None);
    }
}
