//! # hwlink-core
//!
//! **Feed a serial hardware-monitor display from this machine.**
//!
//! `hwlink-core` samples host telemetry (CPU temperature, per-core load, CPU
//! frequency, GPU temperature/load/clocks/memory) and streams it as a compact
//! fixed-schema text frame to a microcontroller over a serial port.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hwlink_core::{LinkConfig, Sampler, encode};
//!
//! let config = LinkConfig::default();
//! let mut sampler = Sampler::system(&config);
//!
//! // The first sample has no load deltas yet; the second one does.
//! let _ = sampler.sample();
//! std::thread::sleep(config.interval());
//! let frame = encode(&sampler.sample());
//! println!("{}", String::from_utf8_lossy(&frame));
//! ```
//!
//! ## Architecture
//!
//! Sources → Sampler (fallbacks + deltas) → Frame encoder → Transport
//!
//! - [`sources`]: narrow adapters over `sensors`, thermal zones, cpufreq,
//!   `/proc/stat` and `nvidia-smi`. An adapter never fails a cycle; it
//!   reports an absent reading instead.
//! - [`Sampler`]: runs the adapters once per tick, applies the temperature
//!   fallback order, computes per-CPU load deltas and produces an immutable
//!   [`TelemetrySnapshot`].
//! - [`encode`]: turns a snapshot into the byte-exact frame the display
//!   firmware parses.
//! - [`Transport`]: owns the serial link lifecycle, including discovery,
//!   reconnect with a two-tier backoff and the `DISa` goodbye frame.

pub mod config;
pub mod counters;
pub mod error;
pub mod frame;
pub mod port;
pub mod sampler;
pub mod snapshot;
pub mod source;
pub mod sources;
pub mod transport;

pub use config::LinkConfig;
pub use counters::{CpuCounters, LoadTracker};
pub use error::{ConfigError, TransportError};
pub use frame::{DISCONNECT_FRAME, encode};
pub use port::{DEFAULT_PORT, Link, PortOpener, SystemPorts, discover_port};
pub use sampler::Sampler;
pub use snapshot::{GpuStats, TelemetrySnapshot};
pub use source::{
    CounterSource, FrequencySource, GpuReading, GpuSource, RawReading, SourceKind,
    TemperatureSource,
};
pub use sources::SourceSet;
pub use transport::{LinkState, ShutdownAwareSleeper, Sleeper, Transport};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
