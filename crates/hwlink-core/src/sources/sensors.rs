//! SensorsTemperature — CPU temperature from the lm-sensors `sensors` tool.
//!
//! `sensors` prints one line per sensor, e.g.
//!
//! ```text
//! k10temp-pci-00c3
//! Adapter: PCI adapter
//! Tctl:         +48.6°C
//!
//! coretemp-isa-0000
//! Package id 0:  +45.0°C  (high = +80.0°C, crit = +100.0°C)
//! Core 0:        +42.0°C  (high = +80.0°C, crit = +100.0°C)
//! ```
//!
//! AMD `Tctl` is the control temperature and wins outright when present.
//! Otherwise every line matching one of the secondary markers contributes its
//! current reading and the hottest one is reported.

use std::time::Duration;

use log::debug;

use crate::source::{RawReading, SourceKind, TemperatureSource};

use super::helpers::run_command;

const SENSORS_PROGRAM: &str = "sensors";

/// AMD control temperature.
const PRIMARY_MARKER: &str = "Tctl:";

/// How a secondary marker is recognised on a line.
#[derive(Debug, Clone, Copy)]
enum Marker {
    /// `label` appears on the line, followed somewhere by a colon.
    Label(&'static str),
    /// `Core <digits>:`
    CoreIndex,
}

/// Secondary markers, in priority order.
const SECONDARY_MARKERS: &[Marker] = &[
    Marker::Label("Package"),
    Marker::CoreIndex,
    Marker::Label("CPU Temp"),
    Marker::Label("cpu_thermal"),
    Marker::Label("acpi"),
    Marker::Label("CPUTIN:"),
    Marker::Label("TSI0_TEMP:"),
    Marker::Label("TSI1_TEMP:"),
];

pub struct SensorsTemperature {
    timeout: Duration,
}

impl SensorsTemperature {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl TemperatureSource for SensorsTemperature {
    fn kind(&self) -> SourceKind {
        SourceKind::Sensors
    }

    fn read(&self) -> RawReading {
        let value = run_command(SENSORS_PROGRAM, &[], self.timeout)
            .and_then(|out| parse_sensors_output(&out));
        if value.is_none() {
            debug!("sensors: no CPU temperature marker found");
        }
        RawReading::from_option(SourceKind::Sensors, value)
    }
}

/// Extract the CPU temperature from `sensors` output.
pub fn parse_sensors_output(output: &str) -> Option<f64> {
    let primary = output.lines().find_map(|line| {
        let idx = line.find(PRIMARY_MARKER)?;
        first_signed_value(&line[idx + PRIMARY_MARKER.len()..])
    });
    if primary.is_some() {
        return primary;
    }

    SECONDARY_MARKERS
        .iter()
        .flat_map(|marker| {
            output
                .lines()
                .filter_map(move |line| marker_tail(line, *marker))
                .filter_map(first_signed_value)
        })
        .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
}

/// The part of `line` after `marker` and its colon, if the marker matches.
fn marker_tail(line: &str, marker: Marker) -> Option<&str> {
    match marker {
        Marker::Label(label) => {
            let idx = line.find(label)?;
            let rest = &line[idx + label.len()..];
            if label.ends_with(':') {
                Some(rest)
            } else {
                rest.find(':').map(|c| &rest[c + 1..])
            }
        }
        Marker::CoreIndex => {
            let mut search = line;
            while let Some(idx) = search.find("Core ") {
                let rest = &search[idx + "Core ".len()..];
                let digits = rest.chars().take_while(char::is_ascii_digit).count();
                if digits > 0 && rest[digits..].starts_with(':') {
                    return Some(&rest[digits + 1..]);
                }
                search = rest;
            }
            None
        }
    }
}

/// First `+NN.N` value in `s`. Threshold values (`high = +80.0`) come after
/// the current reading on every `sensors` line, so the first one is current.
fn first_signed_value(s: &str) -> Option<f64> {
    s.match_indices('+').find_map(|(idx, _)| {
        let tail = &s[idx + 1..];
        let int_len = tail.chars().take_while(char::is_ascii_digit).count();
        if int_len == 0 || !tail[int_len..].starts_with('.') {
            return None;
        }
        let frac_len = tail[int_len + 1..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count();
        if frac_len == 0 {
            return None;
        }
        tail[..int_len + 1 + frac_len].parse().ok()
    })
}
