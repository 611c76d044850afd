//! Wire encoding of a [`TelemetrySnapshot`].
//!
//! The display firmware reads a stream of `value` + `delimiter` tokens. A
//! frame for an idle machine with no GPU looks like:
//!
//! ```text
//! 0a0b0c0d0e0f0g0h0k0j0l0m0n0o0p0q0r0s0t0u0.0v0w0x0y0z
//! ```
//!
//! The sixteen per-core loads come first, then the scalar metrics. There is
//! no terminator beyond the final `z`.

use std::fmt::Write;

use crate::snapshot::{CORE_SLOTS, TelemetrySnapshot};

/// Delimiters after each per-core load. `k` precedes `j`: the firmware
/// expects this order.
pub const CORE_DELIMITERS: [char; CORE_SLOTS] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'k', 'j', 'l', 'm', 'n', 'o', 'p', 'q',
];

/// Sent where the firmware expects a frame rate; hwlink has none to report.
pub const FPS_PLACEHOLDER: u32 = 0;

/// Goodbye frame written once on graceful shutdown.
pub const DISCONNECT_FRAME: &[u8] = b"DISa";

/// Encode one snapshot. Pure and total: every snapshot yields a frame.
pub fn encode(snap: &TelemetrySnapshot) -> Vec<u8> {
    let mut out = String::with_capacity(96);

    for (load, delim) in snap.core_loads.iter().zip(CORE_DELIMITERS) {
        let _ = write!(out, "{load}{delim}");
    }

    let gpu = &snap.gpu;
    let _ = write!(
        out,
        "{FPS_PLACEHOLDER}r{}s{}t{}u{}v{}w{}x{}y{}z",
        fixed(snap.cpu_temp_c, 0),
        fixed(gpu.temp_c, 0),
        snap.cpu_load,
        fixed(snap.avg_ghz, 1),
        gpu.core_clock_mhz,
        gpu.mem_clock_mhz,
        fixed(gpu.load_pct, 0),
        gpu.vram_percent,
    );

    out.into_bytes()
}

/// Fixed-point rendering the firmware can parse: no `NaN`/`inf`, no `-0`.
fn fixed(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let s = format!("{value:.decimals$}");
    match s.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => s,
    }
}
